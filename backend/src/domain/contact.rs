//! Contact details shared by users and restaurants.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation failures for contact fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    /// The address does not look like an email address.
    #[error("email address is not valid")]
    InvalidEmail,
    /// The number is empty or contains something other than digits.
    #[error("contact number must contain digits only")]
    InvalidPhone,
    /// The number is shorter or longer than any dialable number.
    #[error("contact number must be between {min} and {max} digits")]
    PhoneLength {
        /// Fewest digits accepted.
        min: usize,
        /// Most digits accepted.
        max: usize,
    },
}

static BASIC_EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static ACCOUNT_EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn basic_email_regex() -> &'static Regex {
    BASIC_EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn account_email_regex() -> &'static Regex {
    ACCOUNT_EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .unwrap_or_else(|error| panic!("account email regex failed to compile: {error}"))
    })
}

/// Lower-cased email address.
///
/// Restaurants accept anything shaped like `local@domain.tld`; accounts use
/// the stricter [`EmailAddress::for_account`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate against the basic `local@domain.tld` shape.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if basic_email_regex().is_match(&normalised) {
            Ok(Self(normalised))
        } else {
            Err(ContactValidationError::InvalidEmail)
        }
    }

    /// Validate an address used to sign in.
    pub fn for_account(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let email = Self::new(raw)?;
        if account_email_regex().is_match(&email.0) {
            Ok(email)
        } else {
            Err(ContactValidationError::InvalidEmail)
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Fewest digits in a phone or contact number.
pub const PHONE_MIN_DIGITS: usize = 6;
/// Most digits in a phone or contact number (E.164 limit).
pub const PHONE_MAX_DIGITS: usize = 15;

/// Digits-only phone or contact number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a digits-only number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ContactValidationError::InvalidPhone);
        }
        if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&trimmed.len()) {
            return Err(ContactValidationError::PhoneLength {
                min: PHONE_MIN_DIGITS,
                max: PHONE_MAX_DIGITS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}
