//! Port abstraction for the catalog store.
use async_trait::async_trait;

use crate::domain::{MenuItem, MenuItemId, RestaurantId, SearchQuery};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by menu item repository adapters.
    pub enum MenuItemPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "menu item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "menu item repository query failed: {message}",
        /// The owning restaurant no longer exists.
        RestaurantMissing { restaurant_id: String } => "restaurant {restaurant_id} does not exist",
    }
}

/// Storage for menu items. A restaurant's menu is the set of items whose
/// `restaurant_id` references it, so adding or removing an item is a single
/// write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    /// Insert a new item.
    async fn insert(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError>;

    /// Fetch an item by id.
    async fn find_by_id(&self, id: &MenuItemId)
    -> Result<Option<MenuItem>, MenuItemPersistenceError>;

    /// Overwrite the details, availability, and image of an item. Rating
    /// columns are left alone.
    async fn update(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError>;

    /// Remove an item and its reviews atomically, returning what was removed.
    async fn delete(&self, id: &MenuItemId) -> Result<Option<MenuItem>, MenuItemPersistenceError>;

    /// Items on a restaurant's menu, oldest first.
    async fn list_for_restaurant(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, MenuItemPersistenceError>;

    /// Items across all menus whose name or category contains the query.
    async fn search(&self, query: &SearchQuery)
    -> Result<Vec<MenuItem>, MenuItemPersistenceError>;
}
