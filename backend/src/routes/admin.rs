//! User administration routes
//!
//! Guarded by the same bearer-token check as every other protected route;
//! there is no separate admin role.

use super::upload::parse_id;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use storefront_shared::types::{MessageResponse, UserEnvelope, UserListResponse};

const INVALID_USER_ID: &str = "Invalid user ID";

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(delete_user))
}

/// GET /admin/users
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users = UserService::list(state.users.as_ref()).await?;
    Ok(Json(UserListResponse { users }))
}

/// GET /admin/users/:id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserEnvelope>> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let user = UserService::get(state.users.as_ref(), id).await?;
    Ok(Json(UserEnvelope { user }))
}

/// DELETE /admin/users/:id
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    UserService::delete(state.users.as_ref(), state.files.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
