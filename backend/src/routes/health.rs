//! Health check endpoints
//!
//! - /health - process is up
//! - /health/ready - database reachable and upload directory present
//! - /health/live - liveness probe

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub uploads: CheckStatus,
}

#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                healthy: true,
                message: None,
            },
            Err(e) => Self {
                healthy: false,
                message: Some(e.to_string()),
            },
        }
    }
}

fn simple(status: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: None,
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    simple("healthy")
}

/// Readiness probe, 503 when a dependency is unavailable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = CheckStatus::from_result(db::health_check(state.db()).await);
    let uploads = CheckStatus::from_result(upload_dir_present(&state.config().uploads.dir).await);

    let ready = database.healthy && uploads.healthy;
    let response = Json(HealthResponse {
        status: if ready { "ready" } else { "not_ready" },
        version: env!("CARGO_PKG_VERSION"),
        checks: Some(HealthChecks { database, uploads }),
    });

    if ready {
        Ok(response)
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, response))
    }
}

async fn upload_dir_present(dir: &str) -> Result<(), String> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!("{} is not a directory", dir)),
        Err(e) => Err(e.to_string()),
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    simple("alive")
}
