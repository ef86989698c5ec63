//! Port abstraction for hosted images.
use async_trait::async_trait;

use crate::domain::{ImageRef, ImageUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The store refused the upload.
        Rejected { message: String } => "image store rejected the upload: {message}",
        /// Reading or writing the backing storage failed.
        Io { message: String } => "image store I/O failed: {message}",
    }
}

/// External image hosting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return its public reference.
    async fn upload(&self, image: &ImageUpload) -> Result<ImageRef, ImageStoreError>;

    /// Release a previously stored image.
    async fn delete(&self, image_id: &str) -> Result<(), ImageStoreError>;
}
