//! Current-user routes
//!
//! Everything here sits behind `require_auth` and acts on the caller's own
//! record.

use super::upload::read_image;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        State,
    },
    routing::{get, post},
    Json, Router,
};
use storefront_shared::types::{UpdateUserRequest, UserEnvelope};

/// Create current-user routes
pub fn user_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route(
            "/me/image",
            post(upload_my_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// GET /users/me
async fn get_me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserEnvelope>> {
    let user = UserService::get(state.users.as_ref(), auth.user_id).await?;
    Ok(Json(UserEnvelope { user }))
}

/// PUT /users/me
async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserEnvelope>> {
    let Json(req) = payload?;
    let user = UserService::update_profile(state.users.as_ref(), auth.user_id, req).await?;
    Ok(Json(UserEnvelope { user }))
}

/// POST /users/me/image (multipart field `image`)
async fn upload_my_image(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UserEnvelope>> {
    let upload = read_image(multipart).await?;
    let user = UserService::upload_image(
        state.users.as_ref(),
        state.files.as_ref(),
        &state.config().uploads.allowed_types,
        auth.user_id,
        upload,
    )
    .await?;
    Ok(Json(UserEnvelope { user }))
}
