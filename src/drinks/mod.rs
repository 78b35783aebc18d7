mod dto;
pub mod handlers;
mod memory;
mod repo;
pub(crate) mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryDrinkStore;
pub use repo::{DrinkStore, PgDrinkStore};

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::drink_routes(state)
}
