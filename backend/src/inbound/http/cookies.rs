//! Token cookies set on login and refresh and cleared on logout.

use actix_web::cookie::{Cookie, time::Duration};

use crate::auth_config::AuthSettings;
use crate::domain::ports::TokenPair;

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

const COOKIE_MAX_AGE_DAYS: i64 = 7;

fn token_cookie(
    settings: &AuthSettings,
    name: &'static str,
    value: String,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure())
        .same_site(settings.same_site())
        .max_age(max_age)
        .finish()
}

/// Cookies carrying a freshly issued token pair.
pub fn session_cookies(settings: &AuthSettings, tokens: &TokenPair) -> [Cookie<'static>; 2] {
    let max_age = Duration::days(COOKIE_MAX_AGE_DAYS);
    [
        token_cookie(settings, ACCESS_COOKIE, tokens.access_token.clone(), max_age),
        token_cookie(settings, REFRESH_COOKIE, tokens.refresh_token.clone(), max_age),
    ]
}

/// Expired, empty cookies that make the browser drop both tokens.
pub fn cleared_cookies(settings: &AuthSettings) -> [Cookie<'static>; 2] {
    [
        token_cookie(settings, ACCESS_COOKIE, String::new(), Duration::ZERO),
        token_cookie(settings, REFRESH_COOKIE, String::new(), Duration::ZERO),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::SameSite;
    use rstest::rstest;

    fn settings(secure: bool) -> AuthSettings {
        AuthSettings::new(b"access".to_vec(), b"refresh".to_vec())
            .with_cookie_policy(secure, SameSite::Strict)
    }

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "a.b.c".to_owned(),
            refresh_token: "d.e.f".to_owned(),
        }
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn session_cookies_follow_the_policy(#[case] secure: bool) {
        let [access, refresh] = session_cookies(&settings(secure), &pair());

        assert_eq!(access.name(), ACCESS_COOKIE);
        assert_eq!(access.value(), "a.b.c");
        assert_eq!(refresh.name(), REFRESH_COOKIE);
        assert_eq!(refresh.value(), "d.e.f");
        for cookie in [&access, &refresh] {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(secure));
            assert_eq!(cookie.same_site(), Some(SameSite::Strict));
            assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        }
    }

    #[rstest]
    fn cleared_cookies_expire_immediately() {
        for cookie in cleared_cookies(&settings(true)) {
            assert!(cookie.value().is_empty());
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
