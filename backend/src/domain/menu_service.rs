//! Catalog store use-cases.
//!
//! Menu mutations authorise against the owner of the restaurant that holds
//! the item, so every write path loads the item and then its restaurant.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ImageStore, MenuItemRepository, MenuService, RestaurantRepository,
};
use crate::domain::service_support::{
    map_image_store_error, map_menu_item_persistence_error, map_restaurant_persistence_error,
    release_image,
};
use crate::domain::{
    Error, ImageUpload, MenuItem, MenuItemFields, MenuItemId, MenuQuery, NewMenuItem, Restaurant,
    RestaurantId, SearchQuery, User, authorize_owner, distinct_categories,
};

/// Driven ports the menu service depends on.
#[derive(Clone)]
pub struct MenuPorts {
    /// Catalog store.
    pub menu_items: Arc<dyn MenuItemRepository>,
    /// Listing store, for ownership checks.
    pub restaurants: Arc<dyn RestaurantRepository>,
    /// Dish image hosting.
    pub images: Arc<dyn ImageStore>,
}

/// [`MenuService`] implementation.
#[derive(Clone)]
pub struct MenuServiceImpl {
    ports: MenuPorts,
    clock: Arc<dyn Clock>,
}

impl MenuServiceImpl {
    /// Build the service.
    pub fn new(ports: MenuPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn restaurant(&self, id: &RestaurantId) -> Result<Restaurant, Error> {
        self.ports
            .restaurants
            .find_by_id(id)
            .await
            .map_err(map_restaurant_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("restaurant {id} not found")))
    }

    async fn item(&self, id: &MenuItemId) -> Result<MenuItem, Error> {
        self.ports
            .menu_items
            .find_by_id(id)
            .await
            .map_err(map_menu_item_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("menu item {id} not found")))
    }

    async fn owned_item(&self, caller: &User, id: &MenuItemId) -> Result<MenuItem, Error> {
        let item = self.item(id).await?;
        let restaurant = self.restaurant(&item.restaurant_id).await?;
        authorize_owner(caller, &restaurant.owner_id)?;
        Ok(item)
    }

    async fn save(&self, item: &MenuItem) -> Result<(), Error> {
        self.ports
            .menu_items
            .update(item)
            .await
            .map_err(map_menu_item_persistence_error)
    }

    async fn menu(&self, restaurant: &RestaurantId) -> Result<Vec<MenuItem>, Error> {
        self.restaurant(restaurant).await?;
        self.ports
            .menu_items
            .list_for_restaurant(restaurant)
            .await
            .map_err(map_menu_item_persistence_error)
    }
}

#[async_trait]
impl MenuService for MenuServiceImpl {
    async fn add_item(
        &self,
        caller: &User,
        restaurant: &RestaurantId,
        fields: MenuItemFields,
        image: ImageUpload,
    ) -> Result<MenuItem, Error> {
        let draft = NewMenuItem::try_from(fields).map_err(|err| Error::validation(&err))?;
        let owner = self.restaurant(restaurant).await?.owner_id;
        authorize_owner(caller, &owner)?;
        let image = self
            .ports
            .images
            .upload(&image)
            .await
            .map_err(map_image_store_error)?;
        let item = MenuItem::create(
            MenuItemId::random(),
            *restaurant,
            draft,
            image,
            self.clock.utc(),
        );
        if let Err(error) = self.ports.menu_items.insert(&item).await {
            release_image(self.ports.images.as_ref(), &item.image).await;
            return Err(map_menu_item_persistence_error(error));
        }
        info!(menu_item_id = %item.id, restaurant_id = %restaurant, "menu item added");
        Ok(item)
    }

    async fn remove_item(
        &self,
        caller: &User,
        restaurant: &RestaurantId,
        item: &MenuItemId,
    ) -> Result<(), Error> {
        let current = self.owned_item(caller, item).await?;
        if current.restaurant_id != *restaurant {
            return Err(Error::not_found(format!(
                "menu item {item} is not on the menu of restaurant {restaurant}"
            )));
        }
        let removed = self
            .ports
            .menu_items
            .delete(item)
            .await
            .map_err(map_menu_item_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("menu item {item} not found")))?;
        info!(menu_item_id = %item, restaurant_id = %restaurant, "menu item removed");
        release_image(self.ports.images.as_ref(), &removed.image).await;
        Ok(())
    }

    async fn update_item(
        &self,
        caller: &User,
        item: &MenuItemId,
        fields: MenuItemFields,
    ) -> Result<MenuItem, Error> {
        let current = self.owned_item(caller, item).await?;
        let updated = current
            .apply_update(fields, self.clock.utc())
            .map_err(|err| Error::validation(&err))?;
        self.save(&updated).await?;
        Ok(updated)
    }

    async fn update_item_image(
        &self,
        caller: &User,
        item: &MenuItemId,
        image: ImageUpload,
    ) -> Result<MenuItem, Error> {
        let mut current = self.owned_item(caller, item).await?;
        let uploaded = self
            .ports
            .images
            .upload(&image)
            .await
            .map_err(map_image_store_error)?;
        let previous = std::mem::replace(&mut current.image, uploaded);
        current.updated_at = self.clock.utc();
        if let Err(error) = self.save(&current).await {
            release_image(self.ports.images.as_ref(), &current.image).await;
            return Err(error);
        }
        release_image(self.ports.images.as_ref(), &previous).await;
        Ok(current)
    }

    async fn toggle_availability(
        &self,
        caller: &User,
        item: &MenuItemId,
    ) -> Result<MenuItem, Error> {
        let mut current = self.owned_item(caller, item).await?;
        current.toggle_availability(self.clock.utc());
        self.save(&current).await?;
        Ok(current)
    }

    async fn get_item(&self, item: &MenuItemId) -> Result<MenuItem, Error> {
        self.item(item).await
    }

    async fn list_items(&self, restaurant: &RestaurantId) -> Result<Vec<MenuItem>, Error> {
        self.menu(restaurant).await
    }

    async fn list_available(&self, restaurant: &RestaurantId) -> Result<Vec<MenuItem>, Error> {
        let mut items = self.menu(restaurant).await?;
        items.retain(|item| item.is_available);
        Ok(items)
    }

    async fn list_categories(&self, restaurant: &RestaurantId) -> Result<Vec<String>, Error> {
        let items = self.menu(restaurant).await?;
        Ok(distinct_categories(&items))
    }

    async fn sort_and_filter(
        &self,
        restaurant: &RestaurantId,
        query: MenuQuery,
    ) -> Result<Vec<MenuItem>, Error> {
        let items = self.menu(restaurant).await?;
        Ok(query.apply(items))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<MenuItem>, Error> {
        self.ports
            .menu_items
            .search(query)
            .await
            .map_err(map_menu_item_persistence_error)
    }
}

#[cfg(test)]
#[path = "menu_service_tests.rs"]
mod tests;
