use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication or authorization failure, rendered with its own status and code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub status: StatusCode,
    pub code: &'static str,
    pub description: &'static str,
}

impl AuthError {
    const fn new(status: StatusCode, code: &'static str, description: &'static str) -> Self {
        Self {
            status,
            code,
            description,
        }
    }

    pub const fn header_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "authorization_header_missing",
            "Authorization header is expected.",
        )
    }

    pub const fn not_bearer() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_header",
            "Authorization header must start with \"Bearer\".",
        )
    }

    pub const fn token_not_found() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_header", "Token not found.")
    }

    pub const fn not_bearer_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_header",
            "Authorization header must be bearer token.",
        )
    }

    pub const fn malformed() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_header", "Authorization malformed.")
    }

    pub const fn key_not_found() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Unable to find the appropriate key.",
        )
    }

    pub const fn expired() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "token_expired", "Token expired.")
    }

    pub const fn bad_claims() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_claims",
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    pub const fn unparseable() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Unable to parse authentication token.",
        )
    }

    pub const fn permissions_missing() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_claims",
            "Permissions not included in JWT.",
        )
    }

    pub const fn permission_denied() -> Self {
        Self::new(StatusCode::FORBIDDEN, "unauthorized", "Permission not found.")
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.status.as_u16(),
            "message": self.code,
            "code": self.code,
            "description": self.description,
        });
        (self.status, Json(body)).into_response()
    }
}
