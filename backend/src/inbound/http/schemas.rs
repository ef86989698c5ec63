//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their serialised shape and register under the domain
//! type's path, so the generated document names `crate.domain.User` rather
//! than an adapter type.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The write would break a uniqueness rule.
    #[schema(rename = "conflict")]
    Conflict,
    /// The image host or mail relay failed.
    #[schema(rename = "dependency_failure")]
    DependencyFailure,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`] as rendered in the error envelope.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// HTTP status repeated in the body.
    #[schema(example = 400)]
    status_code: u16,
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "rating must be an integer between 1 and 5, got 6")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "rating"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "USER")]
    User,
    #[schema(rename = "ADMIN")]
    Admin,
    #[schema(rename = "RESTAURANT_OWNER")]
    RestaurantOwner,
}

/// OpenAPI schema for [`crate::domain::ImageRef`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ImageRef)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ImageRefSchema {
    /// Store identifier used to release the image.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    id: String,
    /// Public URL.
    #[schema(example = "https://img.example.com/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    url: String,
}

/// OpenAPI schema for [`crate::domain::User`]. Credential material is never serialised.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ada Lovelace")]
    name: String,
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(example = "447700900123")]
    phone: String,
    address: String,
    avatar: ImageRefSchema,
    role: RoleSchema,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// OpenAPI schema for [`crate::domain::RatingSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RatingSummary)]
pub struct RatingSummarySchema {
    /// Mean rating, 0 when there are no reviews.
    #[schema(example = 3.0)]
    pub average: f64,
    /// Number of reviews behind the mean.
    #[schema(example = 3)]
    pub count: u32,
}
