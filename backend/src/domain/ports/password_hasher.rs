//! Port abstraction for one-way password hashing.
use super::define_port_error;

define_port_error! {
    /// Hashing failures.
    pub enum PasswordHashError {
        /// The hasher could not produce a hash.
        Hashing { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Slow, salted password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Whether `password` matches `hash`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
