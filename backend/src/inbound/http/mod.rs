//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod cookies;
pub mod error;
pub mod health;
pub mod images;
pub mod menu_items;
pub mod response;
pub mod restaurants;
pub mod reviews;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
