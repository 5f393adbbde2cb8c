//! Image replacement shared by the user and product services

use crate::error::ApiError;
use crate::repositories::{ImageSwap, RepoError};
use crate::storage::{self, FileStore, ImageUpload, Namespace};
use std::future::Future;
use tracing::info;

/// Swap the image attached to a record.
///
/// The new file is stored first and `persist` records its path. Only when
/// that succeeds is the file it displaced removed; if it fails (or the record
/// vanished in the meantime) the freshly stored file is removed instead and
/// the old image stays in place. The displaced path comes from the write
/// itself, so concurrent uploads each clean up the file they overwrote.
pub(crate) async fn replace_image<T, F, Fut>(
    files: &dyn FileStore,
    namespace: Namespace,
    allowed_types: &[String],
    upload: ImageUpload,
    not_found: &str,
    persist: F,
) -> Result<T, ApiError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Option<ImageSwap<T>>, RepoError>>,
{
    storage::validate_content_type(upload.content_type.as_deref(), allowed_types)?;

    let new_path = files.store(namespace, upload).await?;

    match persist(new_path.clone()).await {
        Ok(Some(ImageSwap { record, replaced })) => {
            if let Some(old) = replaced.as_deref().filter(|old| *old != new_path) {
                storage::discard(files, old).await;
            }
            info!(%namespace, path = %new_path, "Image replaced");
            Ok(record)
        }
        Ok(None) => {
            storage::discard(files, &new_path).await;
            Err(ApiError::NotFound(not_found.to_string()))
        }
        Err(e) => {
            storage::discard(files, &new_path).await;
            Err(e.into())
        }
    }
}
