//! Route definitions for the Storefront API
//!
//! This module organizes all API routes and applies middleware.

use crate::auth::require_auth;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod admin;
mod auth;
mod health;
mod products;
mod upload;
mod users;


pub use admin::admin_routes;
pub use auth::auth_routes;
pub use products::{protected_product_routes, public_product_routes};
pub use users::user_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let uploads = state.config().uploads.clone();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/auth", auth::auth_routes())
        .nest("/products", public_product_routes())
        .merge(protected_routes(&state, uploads.max_bytes))
        .nest_service(&uploads.public_path, ServeDir::new(&uploads.dir))
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes that need a valid bearer token
fn protected_routes(state: &AppState, max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes(max_upload_bytes))
        .nest("/admin", admin_routes())
        .nest("/products", protected_product_routes(max_upload_bytes))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
