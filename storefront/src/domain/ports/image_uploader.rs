//! Port for uploading review images.

use async_trait::async_trait;

use crate::domain::LocalImageRef;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image upload adapters.
    pub enum ImageUploadError => UploadFailure {
        /// An image could not be uploaded.
        Upload { image: String, message: String } =>
            "failed to upload image {image}: {message}",
    }
}

/// Turns device-local image references into remote URLs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload `images` in order and return one URL per image.
    async fn upload(&self, images: &[LocalImageRef]) -> Result<Vec<String>, ImageUploadError>;
}

/// Pretends every upload succeeds, deriving URLs from the local reference.
#[derive(Debug, Clone)]
pub struct FixtureImageUploader {
    base: String,
}

impl FixtureImageUploader {
    /// Produce URLs under `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for FixtureImageUploader {
    fn default() -> Self {
        Self::new("https://images.storefront.invalid")
    }
}

#[async_trait]
impl ImageUploader for FixtureImageUploader {
    async fn upload(&self, images: &[LocalImageRef]) -> Result<Vec<String>, ImageUploadError> {
        let base = self.base.trim_end_matches('/');
        Ok(images
            .iter()
            .map(|image| {
                let name = image.as_str().rsplit('/').next().unwrap_or(image.as_str());
                format!("{base}/{name}")
            })
            .collect())
    }
}
