//! Review use-cases and the rating aggregator entry points.
//!
//! Rating recomputation happens inside the review repository, in the same
//! unit of work as the review write; this service only validates, authorises,
//! and reports the refreshed [`RatingSummary`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    MenuItemRepository, NewReview, RestaurantRepository, ReviewChange, ReviewRepository,
    ReviewService,
};
use crate::domain::service_support::{
    map_menu_item_persistence_error, map_restaurant_persistence_error,
    map_review_persistence_error,
};
use crate::domain::{
    Error, RatingSummary, Review, ReviewId, ReviewTarget, ReviewUpdate, Role, User,
    authorize_owner, authorize_role,
};

/// Driven ports the review service depends on.
#[derive(Clone)]
pub struct ReviewPorts {
    /// Review store and aggregator.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Listing store, to resolve restaurant targets.
    pub restaurants: Arc<dyn RestaurantRepository>,
    /// Catalog store, to resolve menu item targets.
    pub menu_items: Arc<dyn MenuItemRepository>,
}

/// [`ReviewService`] implementation.
#[derive(Clone)]
pub struct ReviewServiceImpl {
    ports: ReviewPorts,
    clock: Arc<dyn Clock>,
}

impl ReviewServiceImpl {
    /// Build the service.
    pub fn new(ports: ReviewPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn ensure_target(&self, target: &ReviewTarget) -> Result<(), Error> {
        let exists = match target {
            ReviewTarget::Restaurant(id) => self
                .ports
                .restaurants
                .find_by_id(id)
                .await
                .map_err(map_restaurant_persistence_error)?
                .is_some(),
            ReviewTarget::MenuItem(id) => self
                .ports
                .menu_items
                .find_by_id(id)
                .await
                .map_err(map_menu_item_persistence_error)?
                .is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(Error::not_found(format!("{target} not found")))
        }
    }

    async fn authored(&self, caller: &User, id: &ReviewId) -> Result<Review, Error> {
        let review = self
            .ports
            .reviews
            .find_by_id(id)
            .await
            .map_err(map_review_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("review {id} not found")))?;
        authorize_owner(caller, &review.author_id)?;
        Ok(review)
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    async fn create(&self, caller: &User, review: NewReview) -> Result<ReviewChange, Error> {
        self.ensure_target(&review.target).await?;
        let review = Review::create(
            ReviewId::random(),
            caller.id,
            review.target,
            review.rating,
            review.text,
            self.clock.utc(),
        );
        let target_rating = self
            .ports
            .reviews
            .insert(&review)
            .await
            .map_err(map_review_persistence_error)?;
        info!(
            review_id = %review.id,
            target = %review.target,
            average = target_rating.average,
            count = target_rating.count,
            "review created"
        );
        Ok(ReviewChange {
            review,
            target_rating,
        })
    }

    async fn update(
        &self,
        caller: &User,
        id: &ReviewId,
        update: ReviewUpdate,
    ) -> Result<ReviewChange, Error> {
        let mut review = self.authored(caller, id).await?;
        update.apply(&mut review, self.clock.utc());
        let target_rating = self
            .ports
            .reviews
            .update(&review)
            .await
            .map_err(map_review_persistence_error)?;
        Ok(ReviewChange {
            review,
            target_rating,
        })
    }

    async fn delete(&self, caller: &User, id: &ReviewId) -> Result<RatingSummary, Error> {
        let review = self.authored(caller, id).await?;
        let summary = self
            .ports
            .reviews
            .delete(&review)
            .await
            .map_err(map_review_persistence_error)?;
        info!(review_id = %id, target = %review.target, "review deleted");
        Ok(summary)
    }

    async fn for_target(&self, target: &ReviewTarget) -> Result<Vec<Review>, Error> {
        self.ensure_target(target).await?;
        self.ports
            .reviews
            .list_for_target(target)
            .await
            .map_err(map_review_persistence_error)
    }

    async fn by_author(&self, caller: &User) -> Result<Vec<Review>, Error> {
        self.ports
            .reviews
            .list_by_author(&caller.id)
            .await
            .map_err(map_review_persistence_error)
    }

    async fn recompute(
        &self,
        caller: &User,
        target: &ReviewTarget,
    ) -> Result<RatingSummary, Error> {
        authorize_role(caller, Role::Admin)?;
        self.ensure_target(target).await?;
        let summary = self
            .ports
            .reviews
            .recompute(target)
            .await
            .map_err(map_review_persistence_error)?;
        info!(%target, average = summary.average, count = summary.count, "rating recomputed");
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "review_service_tests.rs"]
mod tests;
