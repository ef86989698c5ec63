//! Driving port for menu use-cases.

use async_trait::async_trait;

use crate::domain::{
    Error, ImageUpload, MenuItem, MenuItemFields, MenuItemId, MenuQuery, RestaurantId,
    SearchQuery, User,
};

/// Domain use-case port for the catalog store.
///
/// Mutations require the caller to own the restaurant whose menu holds the
/// item, or to be an admin.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuService: Send + Sync {
    /// Add an item to a restaurant's menu.
    async fn add_item(
        &self,
        caller: &User,
        restaurant: &RestaurantId,
        fields: MenuItemFields,
        image: ImageUpload,
    ) -> Result<MenuItem, Error>;

    /// Remove an item from a restaurant's menu together with its reviews.
    async fn remove_item(
        &self,
        caller: &User,
        restaurant: &RestaurantId,
        item: &MenuItemId,
    ) -> Result<(), Error>;

    /// Merge present fields over an item.
    async fn update_item(
        &self,
        caller: &User,
        item: &MenuItemId,
        fields: MenuItemFields,
    ) -> Result<MenuItem, Error>;

    /// Replace an item's image.
    async fn update_item_image(
        &self,
        caller: &User,
        item: &MenuItemId,
        image: ImageUpload,
    ) -> Result<MenuItem, Error>;

    /// Flip an item's availability.
    async fn toggle_availability(&self, caller: &User, item: &MenuItemId)
    -> Result<MenuItem, Error>;

    /// One item.
    async fn get_item(&self, item: &MenuItemId) -> Result<MenuItem, Error>;

    /// A restaurant's full menu.
    async fn list_items(&self, restaurant: &RestaurantId) -> Result<Vec<MenuItem>, Error>;

    /// A restaurant's items that are currently available.
    async fn list_available(&self, restaurant: &RestaurantId) -> Result<Vec<MenuItem>, Error>;

    /// Distinct categories on a restaurant's menu, sorted.
    async fn list_categories(&self, restaurant: &RestaurantId) -> Result<Vec<String>, Error>;

    /// Filter and order a restaurant's menu.
    async fn sort_and_filter(
        &self,
        restaurant: &RestaurantId,
        query: MenuQuery,
    ) -> Result<Vec<MenuItem>, Error>;

    /// Items across all menus matching the query.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MenuItem>, Error>;
}
