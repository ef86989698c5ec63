//! Driving port for resolving a bearer token to the caller.
//!
//! Inbound adapters call it to turn the `accessToken` cookie or
//! `Authorization` header into a live [`User`] without knowing how tokens are
//! verified or where accounts are stored.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify `access_token` and reload its subject.
    ///
    /// Missing, malformed, expired, or orphaned tokens yield
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn authenticate(&self, access_token: &str) -> Result<User, Error>;
}
