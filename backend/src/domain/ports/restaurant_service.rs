//! Driving port for listing use-cases.

use async_trait::async_trait;

use crate::domain::{
    Error, ImageUpload, MenuItem, Restaurant, RestaurantFields, RestaurantFilter, RestaurantId,
    Review, User,
};

/// A listing expanded with its owner, menu, and reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDetails {
    /// The listing.
    pub restaurant: Restaurant,
    /// Owner profile; absent if the account cannot be loaded.
    pub owner: Option<User>,
    /// Menu items, oldest first.
    pub menu: Vec<MenuItem>,
    /// Reviews of the listing, newest first.
    pub reviews: Vec<Review>,
}

/// Domain use-case port for the listing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantService: Send + Sync {
    /// Create a listing owned by the caller.
    async fn create(
        &self,
        caller: &User,
        fields: RestaurantFields,
        logo: ImageUpload,
    ) -> Result<Restaurant, Error>;

    /// Merge present fields over a listing; owner or admin.
    async fn update_details(
        &self,
        caller: &User,
        id: &RestaurantId,
        fields: RestaurantFields,
    ) -> Result<Restaurant, Error>;

    /// Replace the logo; owner or admin.
    async fn update_logo(
        &self,
        caller: &User,
        id: &RestaurantId,
        logo: ImageUpload,
    ) -> Result<Restaurant, Error>;

    /// Park a listing in `inactive`; owner or admin.
    async fn soft_delete(&self, caller: &User, id: &RestaurantId) -> Result<Restaurant, Error>;

    /// Bring a listing back to `open`; owner or admin.
    async fn restore(&self, caller: &User, id: &RestaurantId) -> Result<Restaurant, Error>;

    /// Remove a listing with its menu and reviews; owner or admin.
    async fn hard_delete(&self, caller: &User, id: &RestaurantId) -> Result<(), Error>;

    /// One listing with its owner, menu, and reviews.
    async fn get(&self, id: &RestaurantId) -> Result<RestaurantDetails, Error>;

    /// Listings admitted by `filter`.
    async fn list(&self, filter: RestaurantFilter) -> Result<Vec<Restaurant>, Error>;
}
