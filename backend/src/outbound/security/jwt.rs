//! HS256 JSON Web Token issuer.
//!
//! Access and refresh tokens are signed with different secrets and carry a
//! `typ` claim, so neither verifies as the other. Expiry is checked against
//! the injected clock rather than the system time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth_config::AuthSettings;
use crate::domain::UserId;
use crate::domain::ports::{CredentialError, CredentialIssuer, TokenPair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
    typ: TokenKind,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SigningKey {
    fn new(secret: &[u8], ttl: std::time::Duration) -> Result<Self, CredentialError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|err| CredentialError::signing(format!("token lifetime out of range: {err}")))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }
}

/// [`CredentialIssuer`] backed by `jsonwebtoken`.
pub struct JwtCredentialIssuer {
    access: SigningKey,
    refresh: SigningKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtCredentialIssuer {
    /// Build an issuer from the configured secrets and lifetimes.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Signing`] when a lifetime does not fit a
    /// timestamp.
    pub fn new(settings: &AuthSettings, clock: Arc<dyn Clock>) -> Result<Self, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        Ok(Self {
            access: SigningKey::new(settings.access_secret(), settings.access_ttl())?,
            refresh: SigningKey::new(settings.refresh_secret(), settings.refresh_ttl())?,
            validation,
            clock,
        })
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign(
        &self,
        user: &UserId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let key = self.key(kind);
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + key.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|err| CredentialError::signing(err.to_string()))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<UserId, CredentialError> {
        let data = decode::<Claims>(token, &self.key(kind).decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => CredentialError::expired(),
                _ => CredentialError::invalid(err.to_string()),
            },
        )?;
        let claims = data.claims;
        if claims.typ != kind {
            return Err(CredentialError::invalid("unexpected token type"));
        }
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(CredentialError::expired());
        }
        UserId::new(&claims.sub).map_err(|err| CredentialError::invalid(err.to_string()))
    }
}

impl CredentialIssuer for JwtCredentialIssuer {
    fn issue(&self, user: &UserId) -> Result<TokenPair, CredentialError> {
        let now = self.clock.utc();
        Ok(TokenPair {
            access_token: self.sign(user, TokenKind::Access, now)?,
            refresh_token: self.sign(user, TokenKind::Refresh, now)?,
        })
    }

    fn verify_access(&self, token: &str) -> Result<UserId, CredentialError> {
        self.verify(token, TokenKind::Access)
    }

    fn verify_refresh(&self, token: &str) -> Result<UserId, CredentialError> {
        self.verify(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::fixture_clock;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn settings() -> AuthSettings {
        AuthSettings::new(b"access-secret".to_vec(), b"refresh-secret".to_vec())
            .with_token_ttls(Duration::from_secs(60), Duration::from_secs(600))
    }

    #[rstest]
    fn issued_tokens_verify_with_their_own_secret(settings: AuthSettings) {
        let issuer = JwtCredentialIssuer::new(&settings, fixture_clock()).expect("issuer");
        let user = UserId::random();

        let pair = issuer.issue(&user).expect("issue");

        assert_eq!(issuer.verify_access(&pair.access_token), Ok(user));
        assert_eq!(issuer.verify_refresh(&pair.refresh_token), Ok(user));
    }

    #[rstest]
    fn access_and_refresh_tokens_are_not_interchangeable(settings: AuthSettings) {
        let issuer = JwtCredentialIssuer::new(&settings, fixture_clock()).expect("issuer");
        let pair = issuer.issue(&UserId::random()).expect("issue");

        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(CredentialError::Invalid { .. })
        ));
        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(CredentialError::Invalid { .. })
        ));
    }

    #[rstest]
    fn consecutive_pairs_differ(settings: AuthSettings) {
        let issuer = JwtCredentialIssuer::new(&settings, fixture_clock()).expect("issuer");
        let user = UserId::random();

        let first = issuer.issue(&user).expect("first");
        let second = issuer.issue(&user).expect("second");

        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[rstest]
    fn tokens_expire_with_the_clock(settings: AuthSettings) {
        let clock = fixture_clock();
        let issuer = JwtCredentialIssuer::new(&settings, clock.clone()).expect("issuer");
        let pair = issuer.issue(&UserId::random()).expect("issue");

        clock.advance(chrono::Duration::seconds(61));

        assert_eq!(
            issuer.verify_access(&pair.access_token),
            Err(CredentialError::expired())
        );
        assert!(issuer.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    fn garbage_is_invalid(settings: AuthSettings, #[case] token: &str) {
        let issuer = JwtCredentialIssuer::new(&settings, fixture_clock()).expect("issuer");
        assert!(matches!(
            issuer.verify_access(token),
            Err(CredentialError::Invalid { .. })
        ));
    }
}
