use async_trait::async_trait;

use super::{ImageHost, ImageHostError, ImageUpload};

/// Image host that refuses every upload.
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<String, ImageHostError> {
        Err(ImageHostError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
