//! Driving port for review use-cases.

use async_trait::async_trait;

use crate::domain::{
    Error, Rating, RatingSummary, Review, ReviewId, ReviewTarget, ReviewText, ReviewUpdate, User,
};

/// Validated review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed subject.
    pub target: ReviewTarget,
    /// Star rating.
    pub rating: Rating,
    /// Review body.
    pub text: ReviewText,
}

/// A review after a mutation and its target's refreshed rating.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChange {
    /// The stored review.
    pub review: Review,
    /// Target rating after the change.
    pub target_rating: RatingSummary,
}

/// Domain use-case port for reviews and rating aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review an existing restaurant or menu item.
    async fn create(&self, caller: &User, review: NewReview) -> Result<ReviewChange, Error>;

    /// Edit rating and/or text; author or admin.
    async fn update(
        &self,
        caller: &User,
        id: &ReviewId,
        update: ReviewUpdate,
    ) -> Result<ReviewChange, Error>;

    /// Delete a review; author or admin. Returns the target's new rating.
    async fn delete(&self, caller: &User, id: &ReviewId) -> Result<RatingSummary, Error>;

    /// Reviews of an existing target.
    async fn for_target(&self, target: &ReviewTarget) -> Result<Vec<Review>, Error>;

    /// Reviews written by the caller.
    async fn by_author(&self, caller: &User) -> Result<Vec<Review>, Error>;

    /// Re-run the aggregator for one target; admin only.
    async fn recompute(&self, caller: &User, target: &ReviewTarget)
    -> Result<RatingSummary, Error>;
}
