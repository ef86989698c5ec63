//! Unit tests for auth configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;

fn mock_env(vars: HashMap<String, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_defaults() -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(ACCESS_SECRET_ENV.to_owned(), "a".repeat(SECRET_MIN_LEN));
    vars.insert(REFRESH_SECRET_ENV.to_owned(), "r".repeat(SECRET_MIN_LEN));
    vars.insert(COOKIE_SECURE_ENV.to_owned(), "1".to_owned());
    vars.insert(SAMESITE_ENV.to_owned(), "Strict".to_owned());
    vars
}

fn expect_error(result: Result<AuthSettings, AuthConfigError>, label: &str) -> AuthConfigError {
    match result {
        Ok(_) => panic!("{label}"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_configuration() {
    let mut vars = release_defaults();
    vars.insert(ACCESS_TTL_ENV.to_owned(), "900".to_owned());
    let env = mock_env(vars);

    let settings =
        auth_settings_from_env(&env, BuildMode::Release).expect("complete config is valid");

    assert_eq!(settings.access_secret(), "a".repeat(SECRET_MIN_LEN).as_bytes());
    assert_eq!(settings.access_ttl(), Duration::from_secs(900));
    assert_eq!(settings.refresh_ttl(), DEFAULT_REFRESH_TTL);
    assert_eq!(settings.same_site(), SameSite::Strict);
}

#[rstest]
#[case(ACCESS_SECRET_ENV)]
#[case(REFRESH_SECRET_ENV)]
fn release_missing_secret_is_rejected(#[case] name: &'static str) {
    let mut vars = release_defaults();
    vars.remove(name);
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected missing secret to fail",
    );
    assert!(matches!(err, AuthConfigError::MissingEnv { name: n } if n == name));
}

#[rstest]
fn release_short_secret_is_rejected() {
    let mut vars = release_defaults();
    vars.insert(ACCESS_SECRET_ENV.to_owned(), "short".to_owned());
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected short secret to fail",
    );
    assert!(matches!(
        err,
        AuthConfigError::SecretTooShort {
            name: ACCESS_SECRET_ENV,
            length: 5,
            ..
        }
    ));
}

#[rstest]
fn release_shared_secret_is_rejected() {
    let mut vars = release_defaults();
    vars.insert(REFRESH_SECRET_ENV.to_owned(), "a".repeat(SECRET_MIN_LEN));
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected shared secret to fail",
    );
    assert!(matches!(err, AuthConfigError::SharedSecret));
}

#[rstest]
#[case("0")]
#[case("-5")]
#[case("soon")]
fn release_invalid_ttl_is_rejected(#[case] value: &str) {
    let mut vars = release_defaults();
    vars.insert(REFRESH_TTL_ENV.to_owned(), value.to_owned());
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected invalid ttl to fail",
    );
    assert!(matches!(
        err,
        AuthConfigError::InvalidEnv {
            name: REFRESH_TTL_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_same_site_none_requires_secure_cookies() {
    let mut vars = release_defaults();
    vars.insert(COOKIE_SECURE_ENV.to_owned(), "0".to_owned());
    vars.insert(SAMESITE_ENV.to_owned(), "None".to_owned());
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected insecure SameSite=None to fail",
    );
    assert!(matches!(err, AuthConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_missing_cookie_secure_is_rejected() {
    let mut vars = release_defaults();
    vars.remove(COOKIE_SECURE_ENV);
    let env = mock_env(vars);

    let err = expect_error(
        auth_settings_from_env(&env, BuildMode::Release),
        "expected missing cookie secure to fail",
    );
    assert!(matches!(
        err,
        AuthConfigError::MissingEnv {
            name: COOKIE_SECURE_ENV
        }
    ));
}

#[rstest]
fn debug_falls_back_to_ephemeral_distinct_secrets() {
    let env = mock_env(HashMap::new());

    let settings = auth_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");

    assert_eq!(settings.access_secret().len(), EPHEMERAL_SECRET_LEN);
    assert_ne!(settings.access_secret(), settings.refresh_secret());
    assert!(settings.cookie_secure());
    assert_eq!(settings.same_site(), SameSite::Lax);
    assert_eq!(settings.access_ttl(), DEFAULT_ACCESS_TTL);
}

#[rstest]
fn debug_tolerates_invalid_values() {
    let mut vars = HashMap::new();
    vars.insert(COOKIE_SECURE_ENV.to_owned(), "maybe".to_owned());
    vars.insert(SAMESITE_ENV.to_owned(), "sideways".to_owned());
    vars.insert(ACCESS_TTL_ENV.to_owned(), "never".to_owned());
    let env = mock_env(vars);

    let settings = auth_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates");

    assert!(settings.cookie_secure());
    assert_eq!(settings.same_site(), SameSite::Lax);
    assert_eq!(settings.access_ttl(), DEFAULT_ACCESS_TTL);
}

#[rstest]
#[case("1", Some(true))]
#[case("YES", Some(true))]
#[case("n", Some(false))]
#[case("false", Some(false))]
#[case("maybe", None)]
fn parse_bool_accepts_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}

#[rstest]
fn debug_output_redacts_secrets() {
    let settings = AuthSettings::new(b"top-secret-access".to_vec(), b"top-secret-refresh".to_vec());
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("top-secret"));
    assert!(rendered.contains("<redacted>"));
}
