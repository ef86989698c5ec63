//! Port abstraction for the identity store and its errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, TokenDigest, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (email or phone) already holds the value.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

/// Storage for accounts and the credential material attached to them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; email and phone must be unused.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch an account by its (lower-cased) email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Fetch the account holding a pending reset with this digest.
    async fn find_by_reset_digest(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Overwrite an existing account.
    async fn update(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Every account's public profile, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;
}
