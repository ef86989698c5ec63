//! Port abstraction for the listing store.
use async_trait::async_trait;

use crate::domain::{ImageRef, Restaurant, RestaurantFilter, RestaurantId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by restaurant repository adapters.
    pub enum RestaurantPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "restaurant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "restaurant repository query failed: {message}",
        /// Another listing already uses the contact number.
        DuplicateContact { contact: String } => "a restaurant with contact {contact} already exists",
    }
}

/// Outcome of a hard delete: the removed listing and the images of the menu
/// items removed with it, so callers can release them.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedRestaurant {
    /// Listing as it was before removal.
    pub restaurant: Restaurant,
    /// Images of the cascaded menu items.
    pub item_images: Vec<ImageRef>,
}

/// Storage for restaurant listings.
///
/// Rating columns belong to the review repository: `update` never writes them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Insert a new listing.
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError>;

    /// Fetch a listing by id, whatever its status.
    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantPersistenceError>;

    /// Overwrite the details, status, and logo of an existing listing.
    async fn update(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError>;

    /// Remove a listing with its menu items and every review of either, atomically.
    async fn delete_cascade(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<RemovedRestaurant>, RestaurantPersistenceError>;

    /// Listings admitted by `filter`, in the filter's order.
    async fn list(
        &self,
        filter: &RestaurantFilter,
    ) -> Result<Vec<Restaurant>, RestaurantPersistenceError>;
}
