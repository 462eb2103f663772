//! DTO for thumbnail uploads.

use serde::Serialize;

/// Response for `POST /api/thumbnails`.
#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    /// Public URL of the uploaded image, usable as `advanced.thumbnail`.
    pub url: String,
}
