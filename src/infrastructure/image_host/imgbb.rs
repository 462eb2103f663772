//! Client for the imgbb.com upload API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ImageHost, ImageHostError, ImageUpload};

pub const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// Uploads images to imgbb. Images are kept forever unless an expiration
/// is configured.
pub struct ImgbbHost {
    client: Client,
    upload_url: String,
    api_key: String,
    expiration_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl ImgbbHost {
    /// # Errors
    ///
    /// Returns [`ImageHostError::Request`] if the HTTP client cannot be built.
    pub fn new(api_key: String, expiration_seconds: Option<u64>) -> Result<Self, ImageHostError> {
        Self::with_upload_url(IMGBB_UPLOAD_URL.to_string(), api_key, expiration_seconds)
    }

    /// Same as [`ImgbbHost::new`] against a different endpoint.
    pub fn with_upload_url(
        upload_url: String,
        api_key: String,
        expiration_seconds: Option<u64>,
    ) -> Result<Self, ImageHostError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ImageHostError::Request(e.to_string()))?;

        Ok(Self {
            client,
            upload_url,
            api_key,
            expiration_seconds,
        })
    }

    /// Query string of an upload request.
    fn upload_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("key", self.api_key.clone())];
        if let Some(seconds) = self.expiration_seconds {
            query.push(("expiration", seconds.to_string()));
        }
        query
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError> {
        let size = image.bytes.len();
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ImageHostError::Request(e.to_string()))?;

        let form = reqwest::multipart::Form::new().part("image", part);

        let resp = self
            .client
            .post(&self.upload_url)
            .query(&self.upload_query())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageHostError::Request(e.to_string()))?;

        let status = resp.status();
        let body: UploadResponse = resp.json().await.map_err(|e| {
            ImageHostError::Request(format!("unreadable response ({status}): {e}"))
        })?;

        match body {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } if status.is_success() => {
                debug!(size, url = %data.url, "Thumbnail uploaded");
                Ok(data.url)
            }
            UploadResponse { error, .. } => {
                let message = error
                    .map(|e| e.message)
                    .unwrap_or_else(|| format!("HTTP {status}"));
                warn!(%status, %message, "Image host rejected upload");
                Err(ImageHostError::Rejected(message))
            }
        }
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
