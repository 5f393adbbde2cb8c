//! Image storage
//!
//! Uploaded images are kept outside the database. Records only hold the
//! public path returned by [`FileStore::store`], which is also the key used
//! to delete the file later.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;
use tracing::warn;

mod local;

pub use local::LocalFileStore;

/// Folder an image belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Users,
    Products,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Users, Namespace::Products];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Users => "users",
            Namespace::Products => "products",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == value)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Backend that persists uploaded images
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist the upload under a fresh unique name and return its public path
    async fn store(&self, namespace: Namespace, upload: ImageUpload) -> anyhow::Result<String>;

    /// Remove a previously stored file. Deleting a file that is already gone
    /// succeeds.
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}

/// Declared content type is missing or not on the allow-list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid file type: {0}")]
pub struct UnsupportedContentType(pub String);

/// Check the client-declared content type against the allow-list.
///
/// Parameters such as `; charset=...` are ignored and the comparison is
/// case-insensitive. The file contents are not sniffed.
pub fn validate_content_type(
    declared: Option<&str>,
    allowed: &[String],
) -> Result<(), UnsupportedContentType> {
    let declared = declared.unwrap_or_default();
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.is_empty() {
        return Err(UnsupportedContentType("missing".to_string()));
    }

    if allowed.iter().any(|t| t.eq_ignore_ascii_case(&essence)) {
        Ok(())
    } else {
        Err(UnsupportedContentType(essence))
    }
}

/// Best-effort removal of a stored file; failures are logged, never returned
pub async fn discard(store: &dyn FileStore, path: &str) {
    if let Err(e) = store.delete(path).await {
        warn!(path = %path, error = %e, "failed to remove stored image");
    }
}

/// Pick the extension for a stored file: the client's file name wins,
/// otherwise it is derived from the content type.
pub(crate) fn file_extension(file_name: Option<&str>, content_type: Option<&str>) -> String {
    file_name
        .and_then(ext_from_file_name)
        .or_else(|| content_type.and_then(ext_from_mime).map(str::to_string))
        .unwrap_or_else(|| "bin".to_string())
}

fn ext_from_file_name(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct.split(';').next().unwrap_or_default().trim() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
