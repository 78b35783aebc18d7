use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;

/// Errors a handler can return. Each renders as
/// `{"success": false, "error": <status>, "message": <text>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("bad request")]
    BadRequest,
    #[error("unprocessable")]
    Unprocessable,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(e) => e.status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Internal(e) => {
                error!(error = ?e, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
