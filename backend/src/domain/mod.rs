//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: Define strongly typed entities for accounts, restaurant
//! listings, menus, and reviews, plus the services that enforce ownership
//! and keep aggregate ratings consistent. Adapters live in `outbound`; HTTP
//! lives in `inbound`. Nothing here knows about either.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, Restaurant, MenuItem, Review: the four aggregates.
//! - RatingSummary: mean and count written back to review targets.
//! - `*ServiceImpl`: use-case implementations behind the `ports` traits.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod contact;
pub mod error;
pub mod ids;
pub mod image;
pub mod menu_item;
pub mod menu_service;
pub mod ports;
pub mod rating;
pub mod restaurant;
pub mod restaurant_service;
pub mod review;
pub mod review_service;
pub(crate) mod service_support;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountPorts, AccountServiceImpl, RESET_TOKEN_TTL_MINUTES};
pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PasswordPolicyError, ResetToken,
    TokenDigest,
};
pub use self::authorization::{AuthorizationGuard, authorize_owner, authorize_role};
pub use self::contact::{ContactValidationError, EmailAddress, PhoneNumber};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldError, TRACE_ID_HEADER};
pub use self::ids::{IdValidationError, MenuItemId, RestaurantId, ReviewId, UserId};
pub use self::image::{ImageRef, ImageUpload, ImageValidationError, MAX_IMAGE_BYTES};
pub use self::menu_item::{
    MenuItem, MenuItemFields, MenuItemValidationError, MenuQuery, MenuSort, NewMenuItem,
    SearchQuery, distinct_categories,
};
pub use self::menu_service::{MenuPorts, MenuServiceImpl};
pub use self::rating::RatingSummary;
pub use self::restaurant::{
    Categories, Coordinates, NewRestaurant, OperatingHours, Restaurant, RestaurantFields,
    RestaurantFilter, RestaurantStatus, RestaurantValidationError, TOP_RATED_DEFAULT,
    TOP_RATED_MAX,
};
pub use self::restaurant_service::{RestaurantPorts, RestaurantServiceImpl};
pub use self::review::{
    Rating, Review, ReviewTarget, ReviewText, ReviewUpdate, ReviewValidationError,
};
pub use self::review_service::{ReviewPorts, ReviewServiceImpl};
pub use self::trace_id::TraceId;
pub use self::user::{
    PasswordResetToken, PersonName, ProfileUpdate, Role, UnknownRole, User, UserAccount,
    UserValidationError, validate_address,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use resto_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
