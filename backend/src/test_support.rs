//! Helpers for router-level unit tests

use crate::config::AppConfig;
use crate::repositories::memory::{MemoryProductRepository, MemoryUserRepository};
use crate::state::AppState;
use crate::storage::LocalFileStore;
use axum::body::Body;
use axum::http::Response;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// State backed by in-memory repositories and a temporary upload root.
///
/// The pool is lazy and gives up quickly when asked to connect. Keep the
/// `TempDir` alive for as long as the state is used.
pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUserRepository>,
    pub products: Arc<MemoryProductRepository>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(mut config: AppConfig) -> Self {
        let upload_dir = TempDir::new().unwrap();
        config.uploads.dir = upload_dir.path().to_string_lossy().into_owned();

        let files = LocalFileStore::open(upload_dir.path(), &config.uploads.public_path)
            .await
            .unwrap();
        let users = Arc::new(MemoryUserRepository::new());
        let products = Arc::new(MemoryProductRepository::new());
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(&config.database.url)
            .unwrap();

        let state = AppState::from_parts(
            pool,
            config,
            users.clone(),
            products.clone(),
            Arc::new(files),
        );

        Self {
            state,
            users,
            products,
            upload_dir,
        }
    }

    pub fn router(&self) -> axum::Router {
        crate::routes::create_router(self.state.clone())
    }

    /// A valid bearer header for the given user id
    pub fn bearer(&self, user_id: uuid::Uuid) -> String {
        format!("Bearer {}", self.state.jwt().issue(user_id).unwrap())
    }

    /// Location on disk of a stored public path
    pub fn file_on_disk(&self, public_path: &str) -> std::path::PathBuf {
        let prefix = format!("{}/", self.state.config().uploads.public_path);
        self.upload_dir
            .path()
            .join(public_path.trim_start_matches(prefix.as_str()))
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Hand-built `multipart/form-data` body with a single file field
pub fn multipart_body(
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> (String, Vec<u8>) {
    let boundary = "storefront-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}
