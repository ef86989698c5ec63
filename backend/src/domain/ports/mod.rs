//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, image store, credential issuer, password
//! hasher, notification sender) each expose a typed error enum; driving
//! ports (the `*Service` traits and [`Authenticator`]) speak
//! [`crate::domain::Error`] directly.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod authenticator;
mod credential_issuer;
mod image_store;
mod menu_item_repository;
mod menu_service;
mod notification_sender;
mod password_hasher;
mod restaurant_repository;
mod restaurant_service;
mod review_repository;
mod review_service;
mod user_repository;

#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::{AccountService, Registration, Session};
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::Authenticator;
#[cfg(test)]
pub use credential_issuer::MockCredentialIssuer;
pub use credential_issuer::{CredentialError, CredentialIssuer, TokenPair};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use menu_item_repository::MockMenuItemRepository;
pub use menu_item_repository::{MenuItemPersistenceError, MenuItemRepository};
#[cfg(test)]
pub use menu_service::MockMenuService;
pub use menu_service::MenuService;
#[cfg(test)]
pub use notification_sender::MockNotificationSender;
pub use notification_sender::{NotificationError, NotificationSender, PasswordResetNotice};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
pub use restaurant_repository::{
    RemovedRestaurant, RestaurantPersistenceError, RestaurantRepository,
};
#[cfg(test)]
pub use restaurant_service::MockRestaurantService;
pub use restaurant_service::{RestaurantDetails, RestaurantService};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewPersistenceError, ReviewRepository};
#[cfg(test)]
pub use review_service::MockReviewService;
pub use review_service::{NewReview, ReviewChange, ReviewService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
