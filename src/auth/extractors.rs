use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::error::AuthError;

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AuthError::header_missing)?;

    let parts: Vec<&str> = auth.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::header_missing()),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::not_bearer()),
        [_] => Err(AuthError::token_not_found()),
        [_, token] => Ok(*token),
        _ => Err(AuthError::not_bearer_token()),
    }
}
