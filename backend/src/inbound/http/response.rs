//! Success envelope shared by every JSON endpoint.
//!
//! ```text
//! {"statusCode": 200, "data": {...}, "message": "Restaurant fetched"}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

/// Body wrapper for successful responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Mirrors the HTTP status.
    pub status_code: u16,
    /// Endpoint payload.
    pub data: T,
    /// Short human-readable summary.
    pub message: &'static str,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap `data` for `status`.
    pub fn new(status: StatusCode, data: T, message: &'static str) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message,
        }
    }
}

/// `200 OK` with the envelope.
pub fn ok<T: Serialize>(data: T, message: &'static str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(StatusCode::OK, data, message))
}

/// `201 Created` with the envelope.
pub fn created<T: Serialize>(data: T, message: &'static str) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::new(StatusCode::CREATED, data, message))
}
