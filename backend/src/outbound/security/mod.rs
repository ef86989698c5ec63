//! Credential adapters: JWT signing and Argon2 password hashing.

mod jwt;
mod password;

pub use jwt::JwtCredentialIssuer;
pub use password::Argon2PasswordHasher;
