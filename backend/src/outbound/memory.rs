//! Process-local implementation of every store port.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. All four tables sit behind one mutex, so a review write and the
//! rating it refreshes are observed together, and cascades are atomic. The
//! lock is never held across an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    MenuItemPersistenceError, MenuItemRepository, RemovedRestaurant, RestaurantPersistenceError,
    RestaurantRepository, ReviewPersistenceError, ReviewRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    EmailAddress, MenuItem, MenuItemId, RatingSummary, Restaurant, RestaurantFilter,
    RestaurantId, Review, ReviewId, ReviewTarget, SearchQuery, TokenDigest, User, UserAccount,
    UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserAccount>,
    restaurants: Vec<Restaurant>,
    menu_items: Vec<MenuItem>,
    reviews: Vec<Review>,
}

impl Tables {
    fn restaurant_listed(&self, id: &RestaurantId) -> bool {
        self.restaurants
            .iter()
            .any(|r| r.id == *id && r.is_listed())
    }

    fn target_exists(&self, target: &ReviewTarget) -> bool {
        match target {
            ReviewTarget::Restaurant(id) => self.restaurants.iter().any(|r| r.id == *id),
            ReviewTarget::MenuItem(id) => self.menu_items.iter().any(|m| m.id == *id),
        }
    }

    /// Recompute the target's summary and store it on the target.
    fn refresh_summary(&mut self, target: &ReviewTarget) -> RatingSummary {
        let summary = RatingSummary::from_ratings(
            self.reviews
                .iter()
                .filter(|review| review.target == *target)
                .map(|review| review.rating),
        );
        match target {
            ReviewTarget::Restaurant(id) => {
                if let Some(restaurant) = self.restaurants.iter_mut().find(|r| r.id == *id) {
                    restaurant.rating = summary.average;
                    restaurant.rating_count = summary.count;
                }
            }
            ReviewTarget::MenuItem(id) => {
                if let Some(item) = self.menu_items.iter_mut().find(|m| m.id == *id) {
                    item.rating = summary.average;
                    item.rating_count = summary.count;
                }
            }
        }
        summary
    }

    fn duplicate_user_field(&self, account: &UserAccount) -> Option<&'static str> {
        let others = self.users.iter().filter(|a| a.user.id != account.user.id);
        for other in others {
            if other.user.email == account.user.email {
                return Some("email");
            }
            if other.user.phone == account.user.phone {
                return Some("phone");
            }
        }
        None
    }

    fn contact_taken(&self, restaurant: &Restaurant) -> bool {
        self.restaurants
            .iter()
            .any(|r| r.id != restaurant.id && r.contact == restaurant.contact)
    }
}

/// In-memory identity, listing, catalog, and review store.
///
/// # Examples
///
/// ```
/// use resto_backend::outbound::memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// let shared = store.clone();
/// # let _ = shared;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, &'static str> {
        self.tables.lock().map_err(|_| POISONED)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::connection)?;
        if let Some(field) = tables.duplicate_user_field(account) {
            return Err(UserPersistenceError::duplicate(field));
        }
        tables.users.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(tables.users.iter().find(|a| a.user.id == *id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(tables.users.iter().find(|a| a.user.email == *email).cloned())
    }

    async fn find_by_reset_digest(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::connection)?;
        Ok(tables
            .users
            .iter()
            .find(|a| {
                a.password_reset
                    .as_ref()
                    .is_some_and(|reset| reset.digest == *digest)
            })
            .cloned())
    }

    async fn update(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock().map_err(UserPersistenceError::connection)?;
        if let Some(field) = tables.duplicate_user_field(account) {
            return Err(UserPersistenceError::duplicate(field));
        }
        let stored = tables
            .users
            .iter_mut()
            .find(|a| a.user.id == account.user.id)
            .ok_or_else(|| {
                UserPersistenceError::query(format!(
                    "user {} not found for update",
                    account.user.id
                ))
            })?;
        *stored = account.clone();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.lock().map_err(UserPersistenceError::connection)?;
        let mut users: Vec<User> = tables.users.iter().map(|a| a.user.clone()).collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

#[async_trait]
impl RestaurantRepository for MemoryStore {
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError> {
        let mut tables = self.lock().map_err(RestaurantPersistenceError::connection)?;
        if tables.contact_taken(restaurant) {
            return Err(RestaurantPersistenceError::duplicate_contact(
                restaurant.contact.as_ref(),
            ));
        }
        if !tables.users.iter().any(|a| a.user.id == restaurant.owner_id) {
            return Err(RestaurantPersistenceError::query("owner does not exist"));
        }
        tables.restaurants.push(restaurant.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantPersistenceError> {
        let tables = self.lock().map_err(RestaurantPersistenceError::connection)?;
        Ok(tables.restaurants.iter().find(|r| r.id == *id).cloned())
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError> {
        let mut tables = self.lock().map_err(RestaurantPersistenceError::connection)?;
        if tables.contact_taken(restaurant) {
            return Err(RestaurantPersistenceError::duplicate_contact(
                restaurant.contact.as_ref(),
            ));
        }
        let stored = tables
            .restaurants
            .iter_mut()
            .find(|r| r.id == restaurant.id)
            .ok_or_else(|| {
                RestaurantPersistenceError::query(format!(
                    "restaurant {} not found for update",
                    restaurant.id
                ))
            })?;
        let (rating, rating_count) = (stored.rating, stored.rating_count);
        *stored = restaurant.clone();
        stored.rating = rating;
        stored.rating_count = rating_count;
        Ok(())
    }

    async fn delete_cascade(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<RemovedRestaurant>, RestaurantPersistenceError> {
        let mut tables = self.lock().map_err(RestaurantPersistenceError::connection)?;
        let Some(position) = tables.restaurants.iter().position(|r| r.id == *id) else {
            return Ok(None);
        };
        let restaurant = tables.restaurants.remove(position);

        let (removed_items, kept_items): (Vec<MenuItem>, Vec<MenuItem>) =
            std::mem::take(&mut tables.menu_items)
                .into_iter()
                .partition(|item| item.restaurant_id == *id);
        tables.menu_items = kept_items;

        tables.reviews.retain(|review| match review.target {
            ReviewTarget::Restaurant(target) => target != *id,
            ReviewTarget::MenuItem(target) => !removed_items.iter().any(|item| item.id == target),
        });

        Ok(Some(RemovedRestaurant {
            restaurant,
            item_images: removed_items.into_iter().map(|item| item.image).collect(),
        }))
    }

    async fn list(
        &self,
        filter: &RestaurantFilter,
    ) -> Result<Vec<Restaurant>, RestaurantPersistenceError> {
        let tables = self.lock().map_err(RestaurantPersistenceError::connection)?;
        Ok(filter.apply(tables.restaurants.clone()))
    }
}

#[async_trait]
impl MenuItemRepository for MemoryStore {
    async fn insert(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError> {
        let mut tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        if !tables.restaurants.iter().any(|r| r.id == item.restaurant_id) {
            return Err(MenuItemPersistenceError::restaurant_missing(
                item.restaurant_id.to_string(),
            ));
        }
        tables.menu_items.push(item.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &MenuItemId,
    ) -> Result<Option<MenuItem>, MenuItemPersistenceError> {
        let tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        Ok(tables.menu_items.iter().find(|m| m.id == *id).cloned())
    }

    async fn update(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError> {
        let mut tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        let stored = tables
            .menu_items
            .iter_mut()
            .find(|m| m.id == item.id)
            .ok_or_else(|| {
                MenuItemPersistenceError::query(format!(
                    "menu item {} not found for update",
                    item.id
                ))
            })?;
        let (rating, rating_count) = (stored.rating, stored.rating_count);
        *stored = item.clone();
        stored.rating = rating;
        stored.rating_count = rating_count;
        Ok(())
    }

    async fn delete(&self, id: &MenuItemId) -> Result<Option<MenuItem>, MenuItemPersistenceError> {
        let mut tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        let Some(position) = tables.menu_items.iter().position(|m| m.id == *id) else {
            return Ok(None);
        };
        let item = tables.menu_items.remove(position);
        tables
            .reviews
            .retain(|review| review.target != ReviewTarget::MenuItem(*id));
        Ok(Some(item))
    }

    async fn list_for_restaurant(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, MenuItemPersistenceError> {
        let tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        Ok(tables
            .menu_items
            .iter()
            .filter(|item| item.restaurant_id == *restaurant)
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<MenuItem>, MenuItemPersistenceError> {
        let tables = self.lock().map_err(MenuItemPersistenceError::connection)?;
        Ok(tables
            .menu_items
            .iter()
            .filter(|item| item.matches(query) && tables.restaurant_listed(&item.restaurant_id))
            .cloned()
            .collect())
    }
}

fn newest_first(mut reviews: Vec<Review>) -> Vec<Review> {
    reviews.reverse();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reviews
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        let tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        Ok(tables.reviews.iter().find(|r| r.id == *id).cloned())
    }

    async fn list_for_target(
        &self,
        target: &ReviewTarget,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        Ok(newest_first(
            tables
                .reviews
                .iter()
                .filter(|review| review.target == *target)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        Ok(newest_first(
            tables
                .reviews
                .iter()
                .filter(|review| review.author_id == *author)
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        if !tables.target_exists(&review.target) {
            return Err(ReviewPersistenceError::target_missing(
                review.target.to_string(),
            ));
        }
        tables.reviews.push(review.clone());
        Ok(tables.refresh_summary(&review.target))
    }

    async fn update(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        if !tables.target_exists(&review.target) {
            return Err(ReviewPersistenceError::target_missing(
                review.target.to_string(),
            ));
        }
        let stored = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| {
                ReviewPersistenceError::query(format!("review {} not found for update", review.id))
            })?;
        stored.rating = review.rating;
        stored.text = review.text.clone();
        stored.updated_at = review.updated_at;
        Ok(tables.refresh_summary(&review.target))
    }

    async fn delete(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        if !tables.target_exists(&review.target) {
            return Err(ReviewPersistenceError::target_missing(
                review.target.to_string(),
            ));
        }
        tables.reviews.retain(|r| r.id != review.id);
        Ok(tables.refresh_summary(&review.target))
    }

    async fn recompute(
        &self,
        target: &ReviewTarget,
    ) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut tables = self.lock().map_err(ReviewPersistenceError::connection)?;
        if !tables.target_exists(target) {
            return Err(ReviewPersistenceError::target_missing(target.to_string()));
        }
        Ok(tables.refresh_summary(target))
    }
}
