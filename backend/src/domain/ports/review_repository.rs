//! Port abstraction for review storage and the rating aggregator.
//!
//! Every mutation recomputes the target's [`RatingSummary`] from the full
//! review set and writes it back to the target in the same unit of work, with
//! the target locked so concurrent mutations serialise.
use async_trait::async_trait;

use crate::domain::{RatingSummary, Review, ReviewId, ReviewTarget, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// The reviewed restaurant or menu item does not exist.
        TargetMissing { target: String } => "{target} does not exist",
    }
}

/// Storage for reviews plus the aggregate written back to each target.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fetch a review by id.
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Reviews of one target, newest first.
    async fn list_for_target(
        &self,
        target: &ReviewTarget,
    ) -> Result<Vec<Review>, ReviewPersistenceError>;

    /// Reviews written by one user, newest first.
    async fn list_by_author(&self, author: &UserId)
    -> Result<Vec<Review>, ReviewPersistenceError>;

    /// Store a review and refresh its target's rating.
    async fn insert(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError>;

    /// Overwrite rating and text, then refresh the target's rating.
    async fn update(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError>;

    /// Remove a review and refresh its target's rating.
    async fn delete(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError>;

    /// Recompute and persist a target's rating without changing any review.
    async fn recompute(
        &self,
        target: &ReviewTarget,
    ) -> Result<RatingSummary, ReviewPersistenceError>;
}
