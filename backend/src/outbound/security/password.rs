//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::RngCore as _;
use rand::rngs::OsRng;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

const SALT_LEN: usize = 16;

/// [`PasswordHasher`] producing PHC-formatted Argon2id hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let mut salt_bytes = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_verify_and_are_salted() {
        let hasher = Argon2PasswordHasher;

        let first = hasher.hash("Secr3t!pass").expect("hash");
        let second = hasher.hash("Secr3t!pass").expect("hash");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert_eq!(hasher.verify("Secr3t!pass", &first), Ok(true));
        assert_eq!(hasher.verify("wrong", &first), Ok(false));
    }

    #[rstest]
    fn malformed_hash_is_reported() {
        let err = Argon2PasswordHasher
            .verify("anything", "plain-text")
            .expect_err("not a PHC string");
        assert!(matches!(err, PasswordHashError::Malformed { .. }));
    }
}
