//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the store ports backed
//! by PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Validation and authorisation stay in the services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **One aggregator**: only the review adapter writes `rating` and
//!   `rating_count`, inside the transaction that changed the reviews.
//! - **Embedded migrations**: [`run_migrations`] applies `backend/migrations`
//!   before the pool is built.
//!
//! # Example
//!
//! ```ignore
//! use resto_backend::outbound::persistence::{
//!     DbPool, DieselUserRepository, PoolConfig, run_migrations,
//! };
//!
//! run_migrations("postgres://localhost/resto").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/resto")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_menu_item_repository;
mod diesel_restaurant_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_menu_item_repository::DieselMenuItemRepository;
pub use diesel_restaurant_repository::DieselRestaurantRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
