//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! This adapter is the rating aggregator. Every mutation runs in one
//! transaction that locks the target row with `SELECT ... FOR UPDATE`,
//! applies the change, recomputes the mean and count from the surviving
//! reviews, and writes both back to the target. Concurrent writers on the
//! same target serialise on the row lock, so the stored summary always
//! reflects the committed review set.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{Rating, RatingSummary, Review, ReviewId, ReviewTarget, UserId};

use super::error_mapping::{DieselFailure, classify, pool_error_message};
use super::models::{NewReviewRow, ReviewChangeset, ReviewRow, count_for_db};
use super::pool::{DbPool, PoolError};
use super::schema::{menu_items, restaurants, reviews};

/// Diesel-backed review store and rating aggregator.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside an aggregation transaction.
#[derive(Debug)]
enum AggregateError {
    Diesel(diesel::result::Error),
    TargetMissing(ReviewTarget),
    Corrupt(String),
}

impl From<diesel::result::Error> for AggregateError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    ReviewPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error_for(
    error: diesel::result::Error,
    target: Option<&ReviewTarget>,
) -> ReviewPersistenceError {
    match classify(error, "reviews") {
        DieselFailure::Connection(message) => ReviewPersistenceError::connection(message),
        // The target vanished between the lock and the insert.
        DieselFailure::ForeignKeyViolation { .. } => match target {
            Some(target) => ReviewPersistenceError::target_missing(target.to_string()),
            None => ReviewPersistenceError::query("foreign key violation"),
        },
        DieselFailure::UniqueViolation { .. } => {
            ReviewPersistenceError::query("unique constraint violation")
        }
        DieselFailure::Query(message) => ReviewPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    map_diesel_error_for(error, None)
}

fn map_aggregate_error(error: AggregateError, target: &ReviewTarget) -> ReviewPersistenceError {
    match error {
        AggregateError::Diesel(err) => map_diesel_error_for(err, Some(target)),
        AggregateError::TargetMissing(target) => {
            ReviewPersistenceError::target_missing(target.to_string())
        }
        AggregateError::Corrupt(message) => ReviewPersistenceError::query(message),
    }
}

fn to_reviews(rows: Vec<ReviewRow>) -> Result<Vec<Review>, ReviewPersistenceError> {
    rows.into_iter()
        .map(|row| Review::try_from(row).map_err(ReviewPersistenceError::query))
        .collect()
}

/// Lock the target row for the rest of the transaction.
async fn lock_target(
    conn: &mut AsyncPgConnection,
    target: &ReviewTarget,
) -> Result<(), AggregateError> {
    let locked: Option<Uuid> = match target {
        ReviewTarget::Restaurant(id) => {
            restaurants::table
                .filter(restaurants::id.eq(id.as_uuid()))
                .select(restaurants::id)
                .for_update()
                .first(conn)
                .await
                .optional()?
        }
        ReviewTarget::MenuItem(id) => {
            menu_items::table
                .filter(menu_items::id.eq(id.as_uuid()))
                .select(menu_items::id)
                .for_update()
                .first(conn)
                .await
                .optional()?
        }
    };
    locked
        .map(|_| ())
        .ok_or(AggregateError::TargetMissing(*target))
}

/// Recompute the target's summary from its reviews and store it.
async fn refresh_summary(
    conn: &mut AsyncPgConnection,
    target: &ReviewTarget,
) -> Result<RatingSummary, AggregateError> {
    let raw: Vec<i16> = match target {
        ReviewTarget::Restaurant(id) => {
            reviews::table
                .filter(reviews::restaurant_id.eq(id.as_uuid()))
                .select(reviews::rating)
                .load(conn)
                .await?
        }
        ReviewTarget::MenuItem(id) => {
            reviews::table
                .filter(reviews::menu_item_id.eq(id.as_uuid()))
                .select(reviews::rating)
                .load(conn)
                .await?
        }
    };
    let ratings = raw
        .into_iter()
        .map(|value| Rating::new(i64::from(value)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| AggregateError::Corrupt(err.to_string()))?;
    let summary = RatingSummary::from_ratings(ratings);
    let count = count_for_db(summary.count);

    match target {
        ReviewTarget::Restaurant(id) => {
            diesel::update(restaurants::table.filter(restaurants::id.eq(id.as_uuid())))
                .set((
                    restaurants::rating.eq(summary.average),
                    restaurants::rating_count.eq(count),
                ))
                .execute(conn)
                .await?;
        }
        ReviewTarget::MenuItem(id) => {
            diesel::update(menu_items::table.filter(menu_items::id.eq(id.as_uuid())))
                .set((
                    menu_items::rating.eq(summary.average),
                    menu_items::rating_count.eq(count),
                ))
                .execute(conn)
                .await?;
        }
    }
    Ok(summary)
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReviewRow> = reviews::table
            .filter(reviews::id.eq(id.as_uuid()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Review::try_from(row).map_err(ReviewPersistenceError::query))
            .transpose()
    }

    async fn list_for_target(
        &self,
        target: &ReviewTarget,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReviewRow> = match target {
            ReviewTarget::Restaurant(id) => {
                reviews::table
                    .filter(reviews::restaurant_id.eq(id.as_uuid()))
                    .select(ReviewRow::as_select())
                    .order_by(reviews::created_at.desc())
                    .load(&mut conn)
                    .await
            }
            ReviewTarget::MenuItem(id) => {
                reviews::table
                    .filter(reviews::menu_item_id.eq(id.as_uuid()))
                    .select(ReviewRow::as_select())
                    .order_by(reviews::created_at.desc())
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        to_reviews(rows)
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReviewRow> = reviews::table
            .filter(reviews::author_id.eq(author.as_uuid()))
            .select(ReviewRow::as_select())
            .order_by(reviews::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_reviews(rows)
    }

    async fn insert(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = review.target;
        let row = NewReviewRow::from(review);
        conn.transaction(|conn| {
            async move {
                lock_target(conn, &target).await?;
                diesel::insert_into(reviews::table)
                    .values(row)
                    .execute(conn)
                    .await?;
                refresh_summary(conn, &target).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_aggregate_error(err, &target))
    }

    async fn update(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = review.target;
        let review_id = *review.id.as_uuid();
        let changes = ReviewChangeset::from(review);
        conn.transaction(|conn| {
            async move {
                lock_target(conn, &target).await?;
                let updated = diesel::update(reviews::table.filter(reviews::id.eq(review_id)))
                    .set(changes)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(AggregateError::Corrupt(format!(
                        "review {review_id} not found for update"
                    )));
                }
                refresh_summary(conn, &target).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_aggregate_error(err, &target))
    }

    async fn delete(&self, review: &Review) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = review.target;
        let review_id = *review.id.as_uuid();
        conn.transaction(|conn| {
            async move {
                lock_target(conn, &target).await?;
                diesel::delete(reviews::table.filter(reviews::id.eq(review_id)))
                    .execute(conn)
                    .await?;
                refresh_summary(conn, &target).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_aggregate_error(err, &target))
    }

    async fn recompute(
        &self,
        target: &ReviewTarget,
    ) -> Result<RatingSummary, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = *target;
        conn.transaction(|conn| {
            async move {
                lock_target(conn, &target).await?;
                refresh_summary(conn, &target).await
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_aggregate_error(err, &target))
    }
}
