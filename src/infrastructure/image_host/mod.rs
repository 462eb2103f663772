//! Image hosting for link thumbnails.
//!
//! Thumbnails are not stored by this service. They are uploaded to an
//! external image host and only the returned URL is kept on the record.
//!
//! - [`ImgbbHost`] - imgbb.com upload API
//! - [`DisabledImageHost`] - used when no API key is configured

mod disabled;
mod imgbb;

pub use disabled::DisabledImageHost;
pub use imgbb::{IMGBB_UPLOAD_URL, ImgbbHost};

use async_trait::async_trait;

/// An image file received from a creator.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("image uploads are not configured")]
    Disabled,

    #[error("image host request failed: {0}")]
    Request(String),

    #[error("image host rejected the upload: {0}")]
    Rejected(String),
}

/// External service that stores an image and returns a public URL for it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads the image and returns its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError>;

    fn is_enabled(&self) -> bool;
}
