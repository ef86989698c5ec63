//! Driving port for account and credential use-cases.

use async_trait::async_trait;

use crate::domain::ports::TokenPair;
use crate::domain::{
    EmailAddress, Error, ImageUpload, LoginCredentials, NewPassword, PersonName, PhoneNumber,
    ProfileUpdate, User,
};

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name.
    pub name: PersonName,
    /// Sign-in email.
    pub email: EmailAddress,
    /// Initial password.
    pub password: NewPassword,
    /// Phone number.
    pub phone: PhoneNumber,
    /// Postal address, already validated.
    pub address: String,
}

/// A signed-in user and their tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Account profile.
    pub user: User,
    /// Issued tokens.
    pub tokens: TokenPair,
}

/// Domain use-case port for the identity store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account with the `USER` role.
    async fn register(&self, registration: Registration, avatar: ImageUpload)
    -> Result<User, Error>;

    /// Verify credentials and open a session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error>;

    /// Exchange a refresh token for a new pair, invalidating the old one.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, Error>;

    /// Forget the caller's refresh token.
    async fn logout(&self, caller: &User) -> Result<(), Error>;

    /// Change name and/or address.
    async fn update_profile(&self, caller: &User, update: ProfileUpdate) -> Result<User, Error>;

    /// Replace the avatar.
    async fn update_avatar(&self, caller: &User, avatar: ImageUpload) -> Result<User, Error>;

    /// Mail a single-use reset link.
    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), Error>;

    /// Set a new password using a mailed token.
    async fn reset_password(&self, token: &str, password: NewPassword) -> Result<(), Error>;

    /// Set a new password after verifying the current one.
    async fn change_password(
        &self,
        caller: &User,
        current: &str,
        password: NewPassword,
    ) -> Result<(), Error>;

    /// Every account; admin only.
    async fn list_users(&self, caller: &User) -> Result<Vec<User>, Error>;
}
