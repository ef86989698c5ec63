//! Authentication primitives: login credentials, password policy, and
//! token digests.
//!
//! Raw secrets are held in [`Zeroizing`] buffers so they are wiped when
//! dropped. Tokens handed to clients are never stored verbatim; the identity
//! store keeps a SHA-256 [`TokenDigest`] instead.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::{ContactValidationError, EmailAddress};

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Characters accepted as "special" by the password policy.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";
/// Random bytes in a password-reset token.
pub const RESET_TOKEN_BYTES: usize = 20;

/// Errors returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was malformed.
    #[error(transparent)]
    Email(#[from] ContactValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use resto_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "s3cret!pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password as provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Ways a new password can violate the policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    /// Fewer than [`PASSWORD_MIN_LEN`] characters.
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Lower bound in characters.
        min: usize,
    },
    /// Contains a character outside letters, digits, and [`PASSWORD_SPECIALS`].
    #[error("password may only contain letters, digits, and @$!%*?&")]
    InvalidCharacter,
    /// Missing a letter, a digit, or a special character.
    #[error("password must contain a letter, a digit, and one of @$!%*?&")]
    MissingCharacterClass,
}

/// Password that satisfies the account policy.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate `raw` against the policy.
    pub fn new(raw: &str) -> Result<Self, PasswordPolicyError> {
        if raw.chars().count() < PASSWORD_MIN_LEN {
            return Err(PasswordPolicyError::TooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let is_special = |c: char| PASSWORD_SPECIALS.contains(c);
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c))
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }
        let has_letter = raw.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = raw.chars().any(|c| c.is_ascii_digit());
        let has_special = raw.chars().any(is_special);
        if !(has_letter && has_digit && has_special) {
            return Err(PasswordPolicyError::MissingCharacterClass);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plain-text password for hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(..)")
    }
}

/// Hex-encoded SHA-256 digest of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Digest a raw token.
    #[must_use]
    pub fn of(token: &str) -> Self {
        Self(hex::encode(Sha256::digest(token.as_bytes())))
    }

    /// Rehydrate a digest loaded from storage.
    #[must_use]
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Random password-reset token as mailed to the user.
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// Draw [`RESET_TOKEN_BYTES`] random bytes and hex-encode them.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; RESET_TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(&mut bytes[..]);
        Self(Zeroizing::new(hex::encode(&bytes[..])))
    }

    /// Token text for the reset link.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest persisted in place of the token.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(self.expose())
    }
}
