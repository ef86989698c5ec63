//! Identity store use-cases: registration, sessions, profile changes, and the
//! password-reset flow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountService, CredentialIssuer, ImageStore, NotificationSender, PasswordHasher,
    PasswordResetNotice, Registration, Session, UserRepository,
};
use crate::domain::service_support::{
    map_credential_error, map_image_store_error, map_notification_error,
    map_password_hash_error, map_user_persistence_error, release_image,
};
use crate::domain::{
    EmailAddress, Error, ImageUpload, LoginCredentials, NewPassword, PasswordResetToken,
    ProfileUpdate, ResetToken, Role, TokenDigest, User, UserAccount, UserId, authorize_role,
};

/// Lifetime of a mailed password-reset token, in minutes.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Driven ports the account service depends on.
#[derive(Clone)]
pub struct AccountPorts {
    /// Identity store.
    pub users: Arc<dyn UserRepository>,
    /// Avatar hosting.
    pub images: Arc<dyn ImageStore>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Token signing.
    pub credentials: Arc<dyn CredentialIssuer>,
    /// Reset-link delivery.
    pub notifier: Arc<dyn NotificationSender>,
}

/// [`AccountService`] backed by the identity store and its collaborators.
#[derive(Clone)]
pub struct AccountServiceImpl {
    ports: AccountPorts,
    clock: Arc<dyn Clock>,
    frontend_url: String,
}

impl AccountServiceImpl {
    /// Build the service. Reset links point at `{frontend_url}/reset/{token}`.
    pub fn new(ports: AccountPorts, clock: Arc<dyn Clock>, frontend_url: impl Into<String>) -> Self {
        Self {
            ports,
            clock,
            frontend_url: frontend_url.into().trim_end_matches('/').to_owned(),
        }
    }

    async fn load(&self, id: &UserId) -> Result<UserAccount, Error> {
        self.ports
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn save(&self, account: &UserAccount) -> Result<(), Error> {
        self.ports
            .users
            .update(account)
            .await
            .map_err(map_user_persistence_error)
    }

    async fn open_session(&self, mut account: UserAccount) -> Result<Session, Error> {
        let tokens = self
            .ports
            .credentials
            .issue(&account.user.id)
            .map_err(map_credential_error)?;
        account.refresh_token = Some(TokenDigest::of(&tokens.refresh_token));
        self.save(&account).await?;
        Ok(Session {
            user: account.user,
            tokens,
        })
    }

    fn hash(&self, password: &NewPassword) -> Result<String, Error> {
        self.ports
            .hasher
            .hash(password.expose())
            .map_err(map_password_hash_error)
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

fn invalid_reset_token() -> Error {
    Error::invalid_request("password reset token is invalid or has expired")
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(
        &self,
        registration: Registration,
        avatar: ImageUpload,
    ) -> Result<User, Error> {
        let existing = self
            .ports
            .users
            .find_by_email(&registration.email)
            .await
            .map_err(map_user_persistence_error)?;
        if existing.is_some() {
            return Err(Error::conflict("a user with this email already exists")
                .with_details(serde_json::json!({ "field": "email", "code": "duplicate" })));
        }

        let password_hash = self.hash(&registration.password)?;
        let avatar = self
            .ports
            .images
            .upload(&avatar)
            .await
            .map_err(map_image_store_error)?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            address: registration.address,
            avatar,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        let account = UserAccount {
            user,
            password_hash,
            refresh_token: None,
            password_reset: None,
        };
        if let Err(error) = self.ports.users.insert(&account).await {
            release_image(self.ports.images.as_ref(), &account.user.avatar).await;
            return Err(map_user_persistence_error(error));
        }
        info!(user_id = %account.user.id, "user registered");
        Ok(account.user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let account = self
            .ports
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(invalid_credentials)?;
        let verified = self
            .ports
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_password_hash_error)?;
        if !verified {
            return Err(invalid_credentials());
        }
        self.open_session(account).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, Error> {
        let user_id = self
            .ports
            .credentials
            .verify_refresh(refresh_token)
            .map_err(map_credential_error)?;
        let account = self
            .ports
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid refresh token"))?;
        if account.refresh_token.as_ref() != Some(&TokenDigest::of(refresh_token)) {
            return Err(Error::unauthorized("refresh token is expired or already used"));
        }
        self.open_session(account).await
    }

    async fn logout(&self, caller: &User) -> Result<(), Error> {
        let mut account = self.load(&caller.id).await?;
        account.refresh_token = None;
        self.save(&account).await
    }

    async fn update_profile(&self, caller: &User, update: ProfileUpdate) -> Result<User, Error> {
        if update.is_empty() {
            return Err(Error::invalid_request(
                "at least one of name or address must be provided",
            ));
        }
        let mut account = self.load(&caller.id).await?;
        update.apply(&mut account.user, self.clock.utc());
        self.save(&account).await?;
        Ok(account.user)
    }

    async fn update_avatar(&self, caller: &User, avatar: ImageUpload) -> Result<User, Error> {
        let mut account = self.load(&caller.id).await?;
        let uploaded = self
            .ports
            .images
            .upload(&avatar)
            .await
            .map_err(map_image_store_error)?;
        let previous = std::mem::replace(&mut account.user.avatar, uploaded);
        account.user.updated_at = self.clock.utc();
        if let Err(error) = self.save(&account).await {
            release_image(self.ports.images.as_ref(), &account.user.avatar).await;
            return Err(error);
        }
        release_image(self.ports.images.as_ref(), &previous).await;
        Ok(account.user)
    }

    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), Error> {
        let mut account = self
            .ports
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("no account is registered with this email"))?;

        let token = ResetToken::generate();
        account.password_reset = Some(PasswordResetToken {
            digest: token.digest(),
            expires_at: self.clock.utc() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        });
        self.save(&account).await?;

        let notice = PasswordResetNotice {
            recipient: account.user.email.clone(),
            name: account.user.name.to_string(),
            reset_url: format!("{}/reset/{}", self.frontend_url, token.expose()),
        };
        if let Err(error) = self.ports.notifier.send_password_reset(&notice).await {
            account.password_reset = None;
            if let Err(clear_error) = self.save(&account).await {
                warn!(user_id = %account.user.id, error = %clear_error, "failed to clear unsent reset token");
            }
            return Err(map_notification_error(error));
        }
        Ok(())
    }

    async fn reset_password(&self, token: &str, password: NewPassword) -> Result<(), Error> {
        let digest = TokenDigest::of(token.trim());
        let mut account = self
            .ports
            .users
            .find_by_reset_digest(&digest)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(invalid_reset_token)?;
        let now = self.clock.utc();
        let live = account
            .password_reset
            .as_ref()
            .is_some_and(|reset| reset.accepts(&digest, now));
        if !live {
            return Err(invalid_reset_token());
        }
        account.password_hash = self.hash(&password)?;
        account.password_reset = None;
        account.refresh_token = None;
        account.user.updated_at = now;
        self.save(&account).await
    }

    async fn change_password(
        &self,
        caller: &User,
        current: &str,
        password: NewPassword,
    ) -> Result<(), Error> {
        let mut account = self.load(&caller.id).await?;
        let verified = self
            .ports
            .hasher
            .verify(current, &account.password_hash)
            .map_err(map_password_hash_error)?;
        if !verified {
            return Err(Error::invalid_field(
                Some("oldPassword"),
                "current password is incorrect",
            ));
        }
        account.password_hash = self.hash(&password)?;
        account.user.updated_at = self.clock.utc();
        self.save(&account).await
    }

    async fn list_users(&self, caller: &User) -> Result<Vec<User>, Error> {
        authorize_role(caller, Role::Admin)?;
        self.ports
            .users
            .list()
            .await
            .map_err(map_user_persistence_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
