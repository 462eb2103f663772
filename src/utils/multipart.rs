//! Helpers for reading `multipart/form-data` bodies.

use axum::extract::multipart::{Field, MultipartError};
use serde_json::json;

use crate::error::AppError;
use crate::infrastructure::image_host::ImageUpload;

/// Reads a file part into an [`ImageUpload`].
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the body cannot be read, e.g. when it
/// exceeds the route's body limit.
pub async fn image_from_field(field: Field<'_>) -> Result<ImageUpload, AppError> {
    let file_name = field.file_name().unwrap_or("thumbnail").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(ImageUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

pub fn multipart_error(e: MultipartError) -> AppError {
    AppError::bad_request(
        "Invalid multipart body",
        json!({ "reason": e.body_text() }),
    )
}
