//! Port abstraction for signed access and refresh tokens.
use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures signing or verifying tokens.
    pub enum CredentialError {
        /// Signature, algorithm, or claims did not check out.
        Invalid { message: String } => "token is invalid: {message}",
        /// The token's lifetime has passed.
        Expired => "token has expired",
        /// Signing failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Freshly issued token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token exchanged for a new pair.
    pub refresh_token: String,
}

/// Issues and verifies tokens. Access and refresh tokens use distinct secrets,
/// so neither verifies as the other.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialIssuer: Send + Sync {
    /// Sign a new access/refresh pair for `user`.
    fn issue(&self, user: &UserId) -> Result<TokenPair, CredentialError>;

    /// Verify an access token and return its subject.
    fn verify_access(&self, token: &str) -> Result<UserId, CredentialError>;

    /// Verify a refresh token and return its subject.
    fn verify_refresh(&self, token: &str) -> Result<UserId, CredentialError>;
}
