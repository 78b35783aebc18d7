use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        gate::{gated, DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
        Claims,
    },
    error::ApiError,
    state::AppState,
};

use super::dto::{DeletedResponse, DrinkPayload, DrinkShort, DrinksResponse};
use super::repo_types::Drink;

pub fn drink_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/drinks",
            get(list_drinks).merge(gated(post(create_drink), state, POST_DRINKS)),
        )
        .route(
            "/drinks-detail",
            gated(get(list_drinks_detail), state, GET_DRINKS_DETAIL),
        )
        .route(
            "/drinks/:id",
            gated(patch(update_drink), state, PATCH_DRINKS)
                .merge(gated(delete(delete_drink), state, DELETE_DRINKS)),
        )
}

/// GET /drinks — public menu, ingredient names hidden.
#[instrument(skip(state))]
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, ApiError> {
    let drinks = state.store.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::short).collect(),
    )))
}

/// GET /drinks-detail
#[instrument(skip(state, claims), fields(sub = ?claims.sub))]
pub async fn list_drinks_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DrinksResponse<Drink>>, ApiError> {
    let drinks = state.store.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(DrinksResponse::new(drinks)))
}

/// POST /drinks
#[instrument(skip(state, claims, body), fields(sub = ?claims.sub))]
pub async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<DrinksResponse<Drink>>, ApiError> {
    let payload = DrinkPayload::from_body(&body)?.ok_or(ApiError::NotFound)?;
    let (title, recipe) = payload.into_parts();

    let drink = state.store.insert(&title, &recipe).await?;
    info!(drink_id = drink.id, title = %drink.title, "drink created");
    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// PATCH /drinks/:id — overwrites title and recipe wholesale.
#[instrument(skip(state, claims, body), fields(sub = ?claims.sub))]
pub async fn update_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DrinksResponse<Drink>>, ApiError> {
    let mut drink = find_drink(&state, &id).await?;
    let payload = DrinkPayload::from_body(&body)?.ok_or(ApiError::BadRequest)?;
    let (title, recipe) = payload.into_parts();
    drink.title = title;
    drink.recipe = recipe;

    state.store.update(&drink).await?;
    info!(drink_id = drink.id, "drink updated");
    Ok(Json(DrinksResponse::new(vec![drink])))
}

/// DELETE /drinks/:id
#[instrument(skip(state, claims), fields(sub = ?claims.sub))]
pub async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let drink = find_drink(&state, &id).await?;
    state.store.delete(&drink).await?;
    info!(drink_id = drink.id, "drink deleted");
    Ok(Json(DeletedResponse {
        success: true,
        delete: drink.id,
    }))
}

/// Ids that do not parse cannot name a drink, so they are just not found.
async fn find_drink(state: &AppState, raw_id: &str) -> Result<Drink, ApiError> {
    let id: i32 = raw_id.parse().map_err(|_| ApiError::NotFound)?;
    state.store.find(id).await?.ok_or(ApiError::NotFound)
}
