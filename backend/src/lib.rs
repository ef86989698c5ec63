//! Restaurant discovery and review backend.
//!
//! The crate follows a hexagonal layout: [`domain`] holds entities, services,
//! and ports; [`inbound`] adapts HTTP requests onto the services; [`outbound`]
//! implements the ports over PostgreSQL, local disk, SMTP, and JWT signing.

pub mod auth_config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
