//! PostgreSQL-backed `MenuItemRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MenuItemPersistenceError, MenuItemRepository};
use crate::domain::{MenuItem, MenuItemId, RestaurantId, RestaurantStatus, SearchQuery};

use super::diesel_helpers::like_pattern;
use super::error_mapping::{DieselFailure, classify, pool_error_message};
use super::models::{MenuItemChangeset, MenuItemRow, NewMenuItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::{menu_items, restaurants};

/// Diesel-backed catalog store.
#[derive(Clone)]
pub struct DieselMenuItemRepository {
    pool: DbPool,
}

impl DieselMenuItemRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MenuItemPersistenceError {
    MenuItemPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error_for(
    error: diesel::result::Error,
    restaurant: Option<&RestaurantId>,
) -> MenuItemPersistenceError {
    match classify(error, "menu_items") {
        DieselFailure::Connection(message) => MenuItemPersistenceError::connection(message),
        DieselFailure::ForeignKeyViolation { .. } => match restaurant {
            Some(id) => MenuItemPersistenceError::restaurant_missing(id.to_string()),
            None => MenuItemPersistenceError::query("foreign key violation"),
        },
        DieselFailure::UniqueViolation { .. } => {
            MenuItemPersistenceError::query("unique constraint violation")
        }
        DieselFailure::Query(message) => MenuItemPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> MenuItemPersistenceError {
    map_diesel_error_for(error, None)
}

fn to_items(rows: Vec<MenuItemRow>) -> Result<Vec<MenuItem>, MenuItemPersistenceError> {
    rows.into_iter()
        .map(|row| MenuItem::try_from(row).map_err(MenuItemPersistenceError::query))
        .collect()
}

/// Escape `LIKE` metacharacters so the needle matches literally.
#[async_trait]
impl MenuItemRepository for DieselMenuItemRepository {
    async fn insert(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(menu_items::table)
            .values(NewMenuItemRow::from(item))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error_for(err, Some(&item.restaurant_id)))
    }

    async fn find_by_id(
        &self,
        id: &MenuItemId,
    ) -> Result<Option<MenuItem>, MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MenuItemRow> = menu_items::table
            .filter(menu_items::id.eq(id.as_uuid()))
            .select(MenuItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| MenuItem::try_from(row).map_err(MenuItemPersistenceError::query))
            .transpose()
    }

    async fn update(&self, item: &MenuItem) -> Result<(), MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(menu_items::table.filter(menu_items::id.eq(item.id.as_uuid())))
            .set(MenuItemChangeset::from(item))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(MenuItemPersistenceError::query(format!(
                "menu item {} not found for update",
                item.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &MenuItemId) -> Result<Option<MenuItem>, MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Reviews of the item go with it through ON DELETE CASCADE.
        let row: Option<MenuItemRow> =
            diesel::delete(menu_items::table.filter(menu_items::id.eq(id.as_uuid())))
                .returning(MenuItemRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
        row.map(|row| MenuItem::try_from(row).map_err(MenuItemPersistenceError::query))
            .transpose()
    }

    async fn list_for_restaurant(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MenuItemRow> = menu_items::table
            .filter(menu_items::restaurant_id.eq(restaurant.as_uuid()))
            .select(MenuItemRow::as_select())
            .order_by(menu_items::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_items(rows)
    }

    async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<MenuItem>, MenuItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = like_pattern(query.as_str());
        let rows: Vec<MenuItemRow> = menu_items::table
            .inner_join(restaurants::table)
            .filter(restaurants::status.ne(RestaurantStatus::Inactive.as_str()))
            .filter(
                menu_items::name
                    .ilike(&pattern)
                    .or(menu_items::category.ilike(&pattern)),
            )
            .select(MenuItemRow::as_select())
            .order_by(menu_items::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_items(rows)
    }
}
