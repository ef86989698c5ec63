//! Authorization guard: token authentication and the ownership and role
//! checks applied before every protected mutation.
//!
//! Admins pass every ownership and role check.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{Authenticator, CredentialIssuer, UserRepository};
use crate::domain::service_support::{map_credential_error, map_user_persistence_error};
use crate::domain::{Error, Role, User, UserId};

/// Pass when `user` owns the resource or is an admin.
///
/// # Examples
/// ```
/// # use resto_backend::domain::{authorize_owner, ErrorCode, UserId};
/// # fn demo(user: &resto_backend::domain::User) {
/// let someone_else = UserId::random();
/// let err = authorize_owner(user, &someone_else).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// # }
/// ```
pub fn authorize_owner(user: &User, owner_id: &UserId) -> Result<(), Error> {
    if &user.id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden(
            "you are not allowed to modify this resource",
        ))
    }
}

/// Pass when `user` holds `role` or is an admin.
pub fn authorize_role(user: &User, role: Role) -> Result<(), Error> {
    if user.role == role || user.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden(format!("this action requires the {role} role")))
    }
}

/// [`Authenticator`] that verifies access tokens and reloads their subject.
#[derive(Clone)]
pub struct AuthorizationGuard {
    credentials: Arc<dyn CredentialIssuer>,
    users: Arc<dyn UserRepository>,
}

impl AuthorizationGuard {
    /// Build a guard over the token issuer and the identity store.
    pub fn new(credentials: Arc<dyn CredentialIssuer>, users: Arc<dyn UserRepository>) -> Self {
        Self { credentials, users }
    }
}

#[async_trait]
impl Authenticator for AuthorizationGuard {
    async fn authenticate(&self, access_token: &str) -> Result<User, Error> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(Error::unauthorized("unauthorized request"));
        }
        let user_id = self
            .credentials
            .verify_access(token)
            .map_err(map_credential_error)?;
        let account = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_persistence_error)?;
        match account {
            Some(account) => Ok(account.user),
            None => {
                debug!(%user_id, "access token subject no longer exists");
                Err(Error::unauthorized("invalid access token"))
            }
        }
    }
}
