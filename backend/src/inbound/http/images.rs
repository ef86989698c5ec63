//! Base64 image payloads embedded in JSON request bodies.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, ImageUpload, MAX_IMAGE_BYTES};
use crate::inbound::http::validation::{FieldName, invalid_field_error};

/// Largest JSON body accepted: one encoded image plus the other fields.
pub const JSON_BODY_LIMIT: usize = MAX_IMAGE_BYTES / 3 * 4 + 64 * 1024;

/// An image file as sent by clients.
///
/// Example JSON:
/// `{"fileName":"logo.png","contentType":"image/png","data":"iVBORw0KGgo="}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Original file name.
    pub file_name: String,
    /// MIME type: png, jpeg, webp, or gif.
    pub content_type: String,
    /// Standard base64 of the file bytes.
    pub data: String,
}

impl ImagePayload {
    /// Decode and validate, blaming `field` on failure.
    pub(crate) fn into_upload(self, field: FieldName) -> Result<ImageUpload, Error> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|err| invalid_field_error(field, format!("image data is not base64: {err}")))?;
        ImageUpload::new(self.file_name, self.content_type, bytes)
            .map_err(|err| invalid_field_error(field, err))
    }
}
