//! Image references and validated uploads.

use serde::{Deserialize, Serialize};

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_CONTENT_TYPES: [(&str, &str); 4] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Handle to an image held by the external image store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Store-specific identifier used to release the image.
    pub id: String,
    /// Public URL clients can fetch.
    pub url: String,
}

/// Reasons an upload is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    /// No bytes were supplied.
    #[error("image must not be empty")]
    Empty,
    /// The payload exceeds [`MAX_IMAGE_BYTES`].
    #[error("image must be at most {max} bytes")]
    TooLarge {
        /// Upper bound in bytes.
        max: usize,
    },
    /// The declared content type is not an accepted image format.
    #[error("unsupported image type {content_type}; expected png, jpeg, webp, or gif")]
    UnsupportedType {
        /// Declared content type.
        content_type: String,
    },
}

/// Image bytes accepted for upload.
///
/// # Examples
/// ```
/// use resto_backend::domain::ImageUpload;
///
/// let upload = ImageUpload::new("logo.png", "image/png", vec![1, 2, 3]).unwrap();
/// assert_eq!(upload.extension(), "png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an upload's size and content type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageValidationError> {
        let content_type = content_type.into().trim().to_ascii_lowercase();
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageValidationError::TooLarge {
                max: MAX_IMAGE_BYTES,
            });
        }
        if !ACCEPTED_CONTENT_TYPES
            .iter()
            .any(|(accepted, _)| *accepted == content_type)
        {
            return Err(ImageValidationError::UnsupportedType { content_type });
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    /// Original file name supplied by the client.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Normalised content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Canonical file extension for the content type.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        ACCEPTED_CONTENT_TYPES
            .iter()
            .find(|(accepted, _)| *accepted == self.content_type)
            .map_or("bin", |(_, ext)| *ext)
    }
}
