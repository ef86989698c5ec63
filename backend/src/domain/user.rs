//! User accounts: public profile, role, and stored credentials.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::auth::TokenDigest;
use crate::domain::{ContactValidationError, EmailAddress, ImageRef, PhoneNumber, UserId};

/// Longest accepted personal name, in characters.
pub const NAME_MAX: usize = 80;
/// Longest accepted postal address, in characters.
pub const ADDRESS_MAX: usize = 200;

/// Validation errors for user profile fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Name was blank after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds [`NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Upper bound in characters.
        max: usize,
    },
    /// Address was blank after trimming.
    #[error("address must not be empty")]
    EmptyAddress,
    /// Address exceeds [`ADDRESS_MAX`].
    #[error("address must be at most {max} characters")]
    AddressTooLong {
        /// Upper bound in characters.
        max: usize,
    },
    /// Email or phone failed validation.
    #[error(transparent)]
    Contact(#[from] ContactValidationError),
}

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular diner; the default for new registrations.
    #[default]
    User,
    /// Operator with override rights on every resource.
    Admin,
    /// Account that manages restaurant listings.
    RestaurantOwner,
}

impl Role {
    /// Stable textual form used in storage and tokens.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::RestaurantOwner => "RESTAURANT_OWNER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "RESTAURANT_OWNER" => Ok(Self::RestaurantOwner),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Trimmed, non-empty personal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate a personal name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

/// Validate a postal address and return it trimmed.
pub fn validate_address(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyAddress);
    }
    if trimmed.chars().count() > ADDRESS_MAX {
        return Err(UserValidationError::AddressTooLong { max: ADDRESS_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
    /// Sign-in address; unique across accounts.
    pub email: EmailAddress,
    /// Phone number; unique across accounts.
    pub phone: PhoneNumber,
    /// Postal address.
    pub address: String,
    /// Profile picture.
    pub avatar: ImageRef,
    /// Access level.
    pub role: Role,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last profile change.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account carries the override role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Outstanding password-reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    /// Digest of the token mailed to the user.
    pub digest: TokenDigest,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether `digest` matches and the token is still live at `now`.
    #[must_use]
    pub fn accepts(&self, digest: &TokenDigest, now: DateTime<Utc>) -> bool {
        &self.digest == digest && now < self.expires_at
    }
}

/// A user together with the credential material the identity store keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Public profile.
    pub user: User,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Digest of the currently valid refresh token, if signed in.
    pub refresh_token: Option<TokenDigest>,
    /// Pending password reset, if one was requested.
    pub password_reset: Option<PasswordResetToken>,
}

/// Optional-field profile update; present values overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<PersonName>,
    /// New postal address, already validated.
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Build an update from raw optional inputs.
    pub fn try_new(
        name: Option<String>,
        address: Option<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: name.map(PersonName::new).transpose()?,
            address: address.as_deref().map(validate_address).transpose()?,
        })
    }

    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none()
    }

    /// Merge into `user`, stamping `now` as the update time.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(address) = self.address {
            user.address = address;
        }
        user.updated_at = now;
    }
}
