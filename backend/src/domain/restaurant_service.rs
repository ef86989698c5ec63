//! Listing store use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    ImageStore, MenuItemRepository, RestaurantDetails, RestaurantRepository, RestaurantService,
    ReviewRepository, UserRepository,
};
use crate::domain::service_support::{
    map_image_store_error, map_menu_item_persistence_error, map_restaurant_persistence_error,
    map_review_persistence_error, release_image,
};
use crate::domain::{
    Error, ImageUpload, NewRestaurant, Restaurant, RestaurantFields, RestaurantFilter,
    RestaurantId, ReviewTarget, User, authorize_owner,
};

/// Driven ports the listing service depends on.
#[derive(Clone)]
pub struct RestaurantPorts {
    /// Listing store.
    pub restaurants: Arc<dyn RestaurantRepository>,
    /// Catalog store, for the expanded view.
    pub menu_items: Arc<dyn MenuItemRepository>,
    /// Review store, for the expanded view.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Identity store, for the owner profile.
    pub users: Arc<dyn UserRepository>,
    /// Logo hosting.
    pub images: Arc<dyn ImageStore>,
}

/// [`RestaurantService`] implementation.
#[derive(Clone)]
pub struct RestaurantServiceImpl {
    ports: RestaurantPorts,
    clock: Arc<dyn Clock>,
}

impl RestaurantServiceImpl {
    /// Build the service.
    pub fn new(ports: RestaurantPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn load(&self, id: &RestaurantId) -> Result<Restaurant, Error> {
        self.ports
            .restaurants
            .find_by_id(id)
            .await
            .map_err(map_restaurant_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("restaurant {id} not found")))
    }

    async fn load_owned(&self, caller: &User, id: &RestaurantId) -> Result<Restaurant, Error> {
        let restaurant = self.load(id).await?;
        authorize_owner(caller, &restaurant.owner_id)?;
        Ok(restaurant)
    }

    async fn save(&self, restaurant: &Restaurant) -> Result<(), Error> {
        self.ports
            .restaurants
            .update(restaurant)
            .await
            .map_err(map_restaurant_persistence_error)
    }
}

#[async_trait]
impl RestaurantService for RestaurantServiceImpl {
    async fn create(
        &self,
        caller: &User,
        fields: RestaurantFields,
        logo: ImageUpload,
    ) -> Result<Restaurant, Error> {
        let draft = NewRestaurant::try_from(fields).map_err(|err| Error::validation(&err))?;
        let logo = self
            .ports
            .images
            .upload(&logo)
            .await
            .map_err(map_image_store_error)?;
        let restaurant = Restaurant::create(
            RestaurantId::random(),
            caller.id,
            draft,
            logo,
            self.clock.utc(),
        );
        if let Err(error) = self.ports.restaurants.insert(&restaurant).await {
            release_image(self.ports.images.as_ref(), &restaurant.logo).await;
            return Err(map_restaurant_persistence_error(error));
        }
        info!(restaurant_id = %restaurant.id, owner_id = %caller.id, "restaurant created");
        Ok(restaurant)
    }

    async fn update_details(
        &self,
        caller: &User,
        id: &RestaurantId,
        fields: RestaurantFields,
    ) -> Result<Restaurant, Error> {
        let current = self.load_owned(caller, id).await?;
        let updated = current
            .apply_update(fields, self.clock.utc())
            .map_err(|err| Error::validation(&err))?;
        self.save(&updated).await?;
        Ok(updated)
    }

    async fn update_logo(
        &self,
        caller: &User,
        id: &RestaurantId,
        logo: ImageUpload,
    ) -> Result<Restaurant, Error> {
        let mut restaurant = self.load_owned(caller, id).await?;
        let uploaded = self
            .ports
            .images
            .upload(&logo)
            .await
            .map_err(map_image_store_error)?;
        let previous = std::mem::replace(&mut restaurant.logo, uploaded);
        restaurant.updated_at = self.clock.utc();
        if let Err(error) = self.save(&restaurant).await {
            release_image(self.ports.images.as_ref(), &restaurant.logo).await;
            return Err(error);
        }
        release_image(self.ports.images.as_ref(), &previous).await;
        Ok(restaurant)
    }

    async fn soft_delete(&self, caller: &User, id: &RestaurantId) -> Result<Restaurant, Error> {
        let mut restaurant = self.load_owned(caller, id).await?;
        restaurant.soft_delete(self.clock.utc());
        self.save(&restaurant).await?;
        Ok(restaurant)
    }

    async fn restore(&self, caller: &User, id: &RestaurantId) -> Result<Restaurant, Error> {
        let mut restaurant = self.load_owned(caller, id).await?;
        if restaurant.is_listed() {
            return Err(Error::invalid_field(
                Some("status"),
                format!("restaurant {id} is not inactive"),
            ));
        }
        restaurant.restore(self.clock.utc());
        self.save(&restaurant).await?;
        Ok(restaurant)
    }

    async fn hard_delete(&self, caller: &User, id: &RestaurantId) -> Result<(), Error> {
        self.load_owned(caller, id).await?;
        let removed = self
            .ports
            .restaurants
            .delete_cascade(id)
            .await
            .map_err(map_restaurant_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("restaurant {id} not found")))?;
        info!(
            restaurant_id = %id,
            menu_items = removed.item_images.len(),
            "restaurant deleted"
        );
        release_image(self.ports.images.as_ref(), &removed.restaurant.logo).await;
        for image in &removed.item_images {
            release_image(self.ports.images.as_ref(), image).await;
        }
        Ok(())
    }

    async fn get(&self, id: &RestaurantId) -> Result<RestaurantDetails, Error> {
        let restaurant = self.load(id).await?;
        let owner = match self.ports.users.find_by_id(&restaurant.owner_id).await {
            Ok(account) => account.map(|account| account.user),
            Err(error) => {
                warn!(restaurant_id = %id, %error, "owner profile unavailable");
                None
            }
        };
        let menu = self
            .ports
            .menu_items
            .list_for_restaurant(id)
            .await
            .map_err(map_menu_item_persistence_error)?;
        let reviews = self
            .ports
            .reviews
            .list_for_target(&ReviewTarget::Restaurant(*id))
            .await
            .map_err(map_review_persistence_error)?;
        Ok(RestaurantDetails {
            restaurant,
            owner,
            menu,
            reviews,
        })
    }

    async fn list(&self, filter: RestaurantFilter) -> Result<Vec<Restaurant>, Error> {
        self.ports
            .restaurants
            .list(&filter)
            .await
            .map_err(map_restaurant_persistence_error)
    }
}

#[cfg(test)]
#[path = "restaurant_service_tests.rs"]
mod tests;
