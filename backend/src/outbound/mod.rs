//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local store used without a database and in tests
//! - **images**: local-directory image store
//! - **security**: JWT credential issuer and Argon2 password hasher
//! - **notifications**: SMTP and tracing-only notification senders
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod images;
pub mod memory;
pub mod notifications;
pub mod persistence;
pub mod security;
