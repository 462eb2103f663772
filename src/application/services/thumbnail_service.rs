//! Thumbnail uploads to the external image host.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::infrastructure::image_host::{ImageHost, ImageHostError, ImageUpload};

/// Largest accepted thumbnail.
pub const MAX_THUMBNAIL_BYTES: usize = 5 * 1024 * 1024;

pub struct ThumbnailService {
    host: Arc<dyn ImageHost>,
}

impl ThumbnailService {
    pub fn new(host: Arc<dyn ImageHost>) -> Self {
        Self { host }
    }

    pub fn is_enabled(&self) -> bool {
        self.host.is_enabled()
    }

    /// Checks and uploads a thumbnail, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty, oversized or non-image files.
    /// Returns [`AppError::Unavailable`] if no image host is configured.
    /// Returns [`AppError::Upstream`] if the image host fails.
    pub async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        if !self.host.is_enabled() {
            return Err(unavailable());
        }

        if image.bytes.is_empty() {
            return Err(AppError::bad_request("Thumbnail file is empty", json!({})));
        }

        if image.bytes.len() > MAX_THUMBNAIL_BYTES {
            return Err(AppError::bad_request(
                "Thumbnail is too large",
                json!({ "size": image.bytes.len(), "max": MAX_THUMBNAIL_BYTES }),
            ));
        }

        if !image.content_type.starts_with("image/") {
            return Err(AppError::bad_request(
                "Thumbnail must be an image",
                json!({ "content_type": image.content_type }),
            ));
        }

        let size = image.bytes.len();
        match self.host.upload(image).await {
            Ok(url) => {
                metrics::counter!("thumbnail_uploads_total").increment(1);
                info!(size, "Thumbnail uploaded");
                Ok(url)
            }
            Err(ImageHostError::Disabled) => Err(unavailable()),
            Err(e) => {
                warn!(error = %e, "Thumbnail upload failed");
                Err(AppError::upstream(
                    "Image upload failed",
                    json!({ "reason": e.to_string() }),
                ))
            }
        }
    }
}

fn unavailable() -> AppError {
    AppError::unavailable(
        "Thumbnail uploads are not configured",
        json!({ "hint": "set IMGBB_API_KEY" }),
    )
}
