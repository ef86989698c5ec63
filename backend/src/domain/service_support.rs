//! Internal helpers shared by the domain services: port error mapping and
//! best-effort image release.

use tracing::warn;

use crate::domain::ports::{
    CredentialError, ImageStore, ImageStoreError, MenuItemPersistenceError, NotificationError,
    PasswordHashError, RestaurantPersistenceError, ReviewPersistenceError, UserPersistenceError,
};
use crate::domain::{Error, ImageRef};

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("a user with this {field} already exists")).with_details(
                serde_json::json!({ "field": field, "code": "duplicate" }),
            )
        }
    }
}

pub(crate) fn map_restaurant_persistence_error(error: RestaurantPersistenceError) -> Error {
    match error {
        RestaurantPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("restaurant repository unavailable: {message}"))
        }
        RestaurantPersistenceError::Query { message } => {
            Error::internal(format!("restaurant repository error: {message}"))
        }
        RestaurantPersistenceError::DuplicateContact { contact } => Error::conflict(format!(
            "a restaurant with contact {contact} already exists"
        ))
        .with_details(serde_json::json!({ "field": "contact", "code": "duplicate" })),
    }
}

pub(crate) fn map_menu_item_persistence_error(error: MenuItemPersistenceError) -> Error {
    match error {
        MenuItemPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("menu item repository unavailable: {message}"))
        }
        MenuItemPersistenceError::Query { message } => {
            Error::internal(format!("menu item repository error: {message}"))
        }
        MenuItemPersistenceError::RestaurantMissing { restaurant_id } => {
            Error::not_found(format!("restaurant {restaurant_id} not found"))
        }
    }
}

pub(crate) fn map_review_persistence_error(error: ReviewPersistenceError) -> Error {
    match error {
        ReviewPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewPersistenceError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewPersistenceError::TargetMissing { target } => {
            Error::not_found(format!("{target} not found"))
        }
    }
}

pub(crate) fn map_image_store_error(error: ImageStoreError) -> Error {
    Error::dependency_failure(format!("image upload failed: {error}"))
}

pub(crate) fn map_notification_error(error: NotificationError) -> Error {
    Error::dependency_failure(format!("email could not be sent: {error}"))
}

pub(crate) fn map_password_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_credential_error(error: CredentialError) -> Error {
    match error {
        CredentialError::Expired => Error::unauthorized("token has expired"),
        CredentialError::Invalid { .. } => Error::unauthorized("invalid token"),
        CredentialError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
    }
}

/// Delete a superseded image, logging rather than surfacing failures.
pub(crate) async fn release_image(store: &dyn ImageStore, image: &ImageRef) {
    if let Err(error) = store.delete(&image.id).await {
        warn!(image_id = %image.id, %error, "failed to release image");
    }
}
