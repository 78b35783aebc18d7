use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::warn;

use super::{claims::Claims, error::AuthError, extractors::bearer_token, jwt::TokenValidator};
use crate::state::AppState;

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or_else(AuthError::permissions_missing)?;
    if !granted.iter().any(|p| p == permission) {
        return Err(AuthError::permission_denied());
    }
    Ok(())
}

async fn authorize(
    validator: &TokenValidator,
    permission: &str,
    headers: &HeaderMap,
) -> Result<Claims, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validator.verify(token).await?;
    check_permission(&claims, permission)?;
    Ok(claims)
}

/// Middleware stage: validate the bearer token, check `permission`, then hand the
/// claims to the rest of the chain as a request extension.
pub async fn require_permission(
    validator: Arc<TokenValidator>,
    permission: &'static str,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let headers = req.headers();
    let claims = authorize(&validator, permission, headers)
        .await
        .map_err(|e| {
            warn!(permission, code = e.code, reason = e.description, "request rejected");
            e
        })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Puts the methods of `route` behind `permission`; unmatched methods still get 405.
pub fn gated(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        state.validator.clone(),
        move |State(validator): State<Arc<TokenValidator>>, req: Request, next: Next| {
            require_permission(validator, permission, req, next)
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::testing::claims;

    #[test]
    fn granted_permission_passes() {
        let c = claims(&[POST_DRINKS, PATCH_DRINKS]);
        assert!(check_permission(&c, PATCH_DRINKS).is_ok());
    }

    #[test]
    fn absent_permission_is_forbidden() {
        let c = claims(&[POST_DRINKS]);
        let err = check_permission(&c, DELETE_DRINKS).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.code, "unauthorized");
    }

    #[test]
    fn missing_permissions_claim_is_bad_request() {
        let mut c = claims(&[]);
        c.permissions = None;
        let err = check_permission(&c, GET_DRINKS_DETAIL).unwrap_err();
        assert_eq!(err, AuthError::permissions_missing());
        assert_eq!(err.status.as_u16(), 400);
    }
}
