//! Authentication middleware
//!
//! `require_auth` guards a group of routes via `route_layer`. It validates
//! the bearer token once and stores the caller's id in the request
//! extensions, where the `AuthUser` extractor picks it up.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use storefront_shared::errors::AuthError;
use tracing::debug;
use uuid::Uuid;

/// Authenticated caller, available to handlers behind `require_auth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Reject requests without a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = bearer_token(request.headers())
        .and_then(|token| state.jwt().verify(token))
        .map_err(|e| {
            debug!(reason = %e, path = %request.uri().path(), "rejected unauthenticated request");
            ApiError::from(e)
        })?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
