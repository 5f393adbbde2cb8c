//! Multipart and path helpers shared by the handlers

use crate::error::{ApiError, ApiResult};
use crate::storage::ImageUpload;
use axum::extract::{multipart::MultipartRejection, Multipart};
use uuid::Uuid;

/// Form field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Read the `image` field out of a multipart request
pub async fn read_image(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ImageUpload> {
    let mut multipart =
        multipart.map_err(|_| ApiError::BadRequest("No file uploaded".to_string()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// Parse a path id, reporting malformed values as a validation error
pub fn parse_id(raw: &str, message: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation(message.to_string()))
}
