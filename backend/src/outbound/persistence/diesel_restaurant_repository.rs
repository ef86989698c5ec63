//! PostgreSQL-backed `RestaurantRepository` implementation using Diesel ORM.
//!
//! List queries filter, order, and limit in SQL; only the top-rated query
//! orders by rating.
//!
//! Hard deletes rely on `ON DELETE CASCADE` from `menu_items` and `reviews`,
//! run inside one transaction that first collects the item images so the
//! service can release them afterwards.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{RemovedRestaurant, RestaurantPersistenceError, RestaurantRepository};
use crate::domain::{ImageRef, Restaurant, RestaurantFilter, RestaurantId, RestaurantStatus};

use super::diesel_helpers::{has_category, like_pattern, lower, name_or_category_like};
use super::error_mapping::{DieselFailure, RESTAURANTS_CONTACT_KEY, classify, pool_error_message};
use super::models::{NewRestaurantRow, RestaurantChangeset, RestaurantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{menu_items, restaurants};

/// Diesel-backed listing store.
#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RestaurantPersistenceError {
    RestaurantPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error_for(
    error: diesel::result::Error,
    contact: Option<&str>,
) -> RestaurantPersistenceError {
    match classify(error, "restaurants") {
        DieselFailure::Connection(message) => RestaurantPersistenceError::connection(message),
        DieselFailure::UniqueViolation { constraint }
            if constraint.as_deref() == Some(RESTAURANTS_CONTACT_KEY) =>
        {
            RestaurantPersistenceError::duplicate_contact(contact.unwrap_or("unknown"))
        }
        DieselFailure::UniqueViolation { .. } => {
            RestaurantPersistenceError::query("unique constraint violation")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            RestaurantPersistenceError::query("owner does not exist")
        }
        DieselFailure::Query(message) => RestaurantPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RestaurantPersistenceError {
    map_diesel_error_for(error, None)
}

fn to_restaurant(row: RestaurantRow) -> Result<Restaurant, RestaurantPersistenceError> {
    Restaurant::try_from(row).map_err(RestaurantPersistenceError::query)
}

/// Loads every column, in `RestaurantRow` field order.
type ListQuery = restaurants::BoxedQuery<'static, Pg>;

/// Listed restaurants matching `filter`, oldest first unless ranked.
fn list_query(filter: &RestaurantFilter) -> Result<ListQuery, RestaurantPersistenceError> {
    let query = restaurants::table
        .filter(restaurants::status.ne(RestaurantStatus::Inactive.as_str()))
        .order(restaurants::created_at.asc())
        .into_boxed();

    let query = match filter {
        RestaurantFilter::All => query,
        RestaurantFilter::Category(category) => query.filter(has_category(category)),
        RestaurantFilter::City(city) => {
            query.filter(lower(restaurants::city).eq(city.trim().to_lowercase()))
        }
        RestaurantFilter::Open => {
            query.filter(restaurants::status.eq(RestaurantStatus::Open.as_str()))
        }
        RestaurantFilter::Search(needle) => {
            query.filter(name_or_category_like(&like_pattern(needle.as_str())))
        }
        RestaurantFilter::TopRated(limit) => {
            let limit = i64::try_from(*limit).map_err(|_| {
                RestaurantPersistenceError::query("requested limit exceeds i64 range")
            })?;
            query
                .order((restaurants::rating.desc(), restaurants::rating_count.desc()))
                .limit(limit)
        }
    };
    Ok(query)
}

#[async_trait]
impl RestaurantRepository for DieselRestaurantRepository {
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(restaurants::table)
            .values(NewRestaurantRow::from(restaurant))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error_for(err, Some(restaurant.contact.as_ref())))
    }

    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RestaurantRow> = restaurants::table
            .filter(restaurants::id.eq(id.as_uuid()))
            .select(RestaurantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_restaurant).transpose()
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<(), RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated =
            diesel::update(restaurants::table.filter(restaurants::id.eq(restaurant.id.as_uuid())))
                .set(RestaurantChangeset::from(restaurant))
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error_for(err, Some(restaurant.contact.as_ref())))?;
        if updated == 0 {
            return Err(RestaurantPersistenceError::query(format!(
                "restaurant {} not found for update",
                restaurant.id
            )));
        }
        Ok(())
    }

    async fn delete_cascade(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<RemovedRestaurant>, RestaurantPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let restaurant_id = *id.as_uuid();
        let removed = conn
            .transaction(|conn| {
                async move {
                    let row: Option<RestaurantRow> = restaurants::table
                        .filter(restaurants::id.eq(restaurant_id))
                        .select(RestaurantRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    let images: Vec<(String, String)> = menu_items::table
                        .filter(menu_items::restaurant_id.eq(restaurant_id))
                        .select((menu_items::image_id, menu_items::image_url))
                        .load(conn)
                        .await?;
                    diesel::delete(restaurants::table.filter(restaurants::id.eq(restaurant_id)))
                        .execute(conn)
                        .await?;
                    Ok(Some((row, images)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        removed
            .map(|(row, images)| {
                Ok(RemovedRestaurant {
                    restaurant: to_restaurant(row)?,
                    item_images: images
                        .into_iter()
                        .map(|(id, url)| ImageRef { id, url })
                        .collect(),
                })
            })
            .transpose()
    }

    async fn list(
        &self,
        filter: &RestaurantFilter,
    ) -> Result<Vec<Restaurant>, RestaurantPersistenceError> {
        let query = list_query(filter)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RestaurantRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(to_restaurant).collect()
    }
}
