mod claims;
mod error;
pub(crate) mod extractors;
pub mod gate;
pub mod jwt;

pub use claims::Claims;
pub use error::AuthError;
pub use jwt::TokenValidator;
