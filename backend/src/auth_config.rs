//! Token and cookie configuration parsing and validation.
//!
//! [`AuthSettings`] is read once at startup and handed to both the JWT
//! credential issuer and the HTTP cookie builder, so signing secrets, token
//! lifetimes, and cookie flags always agree.

use std::fmt;
use std::time::Duration;

use actix_web::cookie::SameSite;
use mockable::Env;
use rand::RngCore as _;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";
const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
const COOKIE_SECURE_ENV: &str = "AUTH_COOKIE_SECURE";
const SAMESITE_ENV: &str = "AUTH_COOKIE_SAMESITE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "a positive number of seconds";

/// Shortest signing secret accepted in release builds.
pub const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Default access token lifetime: one day.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default refresh token lifetime: seven days.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Build mode for auth configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing values.
    Debug,
    /// Release builds require explicit, valid secrets and cookie toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resto_backend::auth_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Signing secrets, token lifetimes, and cookie flags.
#[derive(Clone)]
pub struct AuthSettings {
    access_secret: Zeroizing<Vec<u8>>,
    refresh_secret: Zeroizing<Vec<u8>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    cookie_secure: bool,
    same_site: SameSite,
}

impl AuthSettings {
    /// Settings with the given secrets, default lifetimes, and secure `Lax`
    /// cookies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use resto_backend::auth_config::{AuthSettings, DEFAULT_ACCESS_TTL};
    ///
    /// let settings = AuthSettings::new(b"access-secret".to_vec(), b"refresh-secret".to_vec());
    /// assert_eq!(settings.access_ttl(), DEFAULT_ACCESS_TTL);
    /// assert!(settings.cookie_secure());
    /// ```
    #[must_use]
    pub fn new(access_secret: Vec<u8>, refresh_secret: Vec<u8>) -> Self {
        Self {
            access_secret: Zeroizing::new(access_secret),
            refresh_secret: Zeroizing::new(refresh_secret),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            cookie_secure: true,
            same_site: SameSite::Lax,
        }
    }

    /// Override both token lifetimes.
    #[must_use]
    pub fn with_token_ttls(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        self
    }

    /// Override the cookie flags.
    #[must_use]
    pub fn with_cookie_policy(mut self, secure: bool, same_site: SameSite) -> Self {
        self.cookie_secure = secure;
        self.same_site = same_site;
        self
    }

    /// HMAC secret for access tokens.
    pub fn access_secret(&self) -> &[u8] {
        &self.access_secret
    }

    /// HMAC secret for refresh tokens.
    pub fn refresh_secret(&self) -> &[u8] {
        &self.refresh_secret
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Whether auth cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// `SameSite` policy for auth cookies.
    pub fn same_site(&self) -> SameSite {
        self.same_site
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// Errors raised while validating auth configuration.
#[derive(thiserror::Error, Debug)]
pub enum AuthConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A signing secret is too short for release builds.
    #[error("{name} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        name: &'static str,
        length: usize,
        min_len: usize,
    },
    /// Access and refresh tokens must not share a secret.
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("AUTH_COOKIE_SAMESITE=None requires AUTH_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Build auth settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use resto_backend::auth_config::{BuildMode, auth_settings_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "ACCESS_TOKEN_SECRET" => Some("a".repeat(32)),
///     "REFRESH_TOKEN_SECRET" => Some("r".repeat(32)),
///     "AUTH_COOKIE_SECURE" => Some("1".to_owned()),
///     "AUTH_COOKIE_SAMESITE" => Some("Strict".to_owned()),
///     _ => None,
/// });
///
/// let settings = auth_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure());
/// # Ok(())
/// # }
/// ```
pub fn auth_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<AuthSettings, AuthConfigError> {
    let access_secret = secret_from_env(env, mode, ACCESS_SECRET_ENV)?;
    let refresh_secret = secret_from_env(env, mode, REFRESH_SECRET_ENV)?;
    if access_secret == refresh_secret {
        if mode.is_debug() {
            warn!("access and refresh tokens share a secret (dev only)");
        } else {
            return Err(AuthConfigError::SharedSecret);
        }
    }
    let access_ttl = ttl_from_env(env, mode, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL)?;
    let refresh_ttl = ttl_from_env(env, mode, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL)?;
    let cookie_secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;

    Ok(AuthSettings {
        access_secret,
        refresh_secret,
        access_ttl,
        refresh_ttl,
        cookie_secure,
        same_site,
    })
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
) -> Result<Zeroizing<Vec<u8>>, AuthConfigError> {
    let Some(value) = env.string(name).map(Zeroizing::new) else {
        if mode.is_debug() {
            warn!(variable = name, "using temporary signing secret (dev only)");
            return Ok(ephemeral_secret());
        }
        return Err(AuthConfigError::MissingEnv { name });
    };
    let length = value.len();
    if mode == BuildMode::Release && length < SECRET_MIN_LEN {
        return Err(AuthConfigError::SecretTooShort {
            name,
            length,
            min_len: SECRET_MIN_LEN,
        });
    }
    if length == 0 {
        warn!(variable = name, "empty signing secret; using temporary one");
        return Ok(ephemeral_secret());
    }
    Ok(Zeroizing::new(value.as_bytes().to_vec()))
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn ttl_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: Duration,
) -> Result<Duration, AuthConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ if mode.is_debug() => {
            warn!(variable = name, value = %value, "invalid token lifetime; using default");
            Ok(default)
        }
        _ => Err(AuthConfigError::InvalidEnv {
            name,
            value,
            expected: TTL_EXPECTED,
        }),
    }
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, AuthConfigError> {
    match env.string(COOKIE_SECURE_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None if mode.is_debug() => {
                warn!(value = %value, "invalid AUTH_COOKIE_SECURE; defaulting to secure");
                Ok(true)
            }
            None => Err(AuthConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value,
                expected: BOOL_EXPECTED,
            }),
        },
        None if mode.is_debug() => {
            warn!("AUTH_COOKIE_SECURE not set; defaulting to secure");
            Ok(true)
        }
        None => Err(AuthConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV,
        }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, AuthConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("AUTH_COOKIE_SAMESITE not set; using default");
            return Ok(default_same_site);
        }
        return Err(AuthConfigError::MissingEnv { name: SAMESITE_ENV });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                if mode.is_debug() {
                    warn!(
                        "AUTH_COOKIE_SAMESITE=None with AUTH_COOKIE_SECURE=0; browsers may drop the cookies"
                    );
                } else {
                    return Err(AuthConfigError::InsecureSameSiteNone);
                }
            }
            Ok(SameSite::None)
        }
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid AUTH_COOKIE_SAMESITE, using default");
            Ok(default_same_site)
        }
        _ => Err(AuthConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
