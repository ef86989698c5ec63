//! Server settings loaded via OrthoConfig and the runtime configuration built
//! from them.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use resto_backend::auth_config::AuthSettings;
use resto_backend::outbound::notifications::SmtpSettings;
use resto_backend::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGE_DIR: &str = "uploads";
const DEFAULT_IMAGE_BASE_URL: &str = "http://localhost:8080/uploads";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Errors raised while interpreting [`ServerSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{field} must be an absolute http(s) URL, got {value:?}")]
    Url { field: &'static str, value: String },
    #[error("SMTP is partially configured; set both host and sender")]
    IncompleteSmtp,
}

/// Deployment settings. Every field can be set as `RESTO_<FIELD>` in the
/// environment or as the matching `--<field>` flag.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RESTO")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. When absent, data lives in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Directory receiving uploaded images.
    pub image_dir: Option<PathBuf>,
    /// Public URL under which `image_dir` is served.
    pub image_base_url: Option<String>,
    /// Front end origin used to build password-reset links.
    pub frontend_url: Option<String>,
    /// SMTP relay host. Reset mails are only logged when unset.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// `From` mailbox for outgoing mail.
    pub smtp_sender: Option<String>,
}

fn http_url(field: &'static str, value: &str) -> Result<String, SettingsError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(value.trim_end_matches('/').to_owned())
        }
        _ => Err(SettingsError::Url {
            field,
            value: value.to_owned(),
        }),
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.max(1)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.image_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR))
    }

    pub fn image_base_url(&self) -> Result<String, SettingsError> {
        http_url(
            "image_base_url",
            self.image_base_url
                .as_deref()
                .unwrap_or(DEFAULT_IMAGE_BASE_URL),
        )
    }

    pub fn frontend_url(&self) -> Result<String, SettingsError> {
        http_url(
            "frontend_url",
            self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL),
        )
    }

    /// SMTP relay settings, or `None` when mail delivery is not configured.
    pub fn smtp(&self) -> Result<Option<SmtpSettings>, SettingsError> {
        match (&self.smtp_host, &self.smtp_sender) {
            (None, None) => Ok(None),
            (Some(host), Some(sender)) => Ok(Some(SmtpSettings {
                host: host.clone(),
                port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                username: self.smtp_username.clone(),
                password: self.smtp_password.clone(),
                sender: sender.clone(),
            })),
            _ => Err(SettingsError::IncompleteSmtp),
        }
    }
}

/// Storage wiring chosen at startup.
#[derive(Clone)]
pub enum Storage {
    Postgres(DbPool),
    Memory,
}

/// Everything [`super::create_server`] needs to build the app.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) auth: AuthSettings,
    pub(crate) storage: Storage,
    pub(crate) image_dir: PathBuf,
    pub(crate) image_base_url: String,
    pub(crate) frontend_url: String,
    pub(crate) smtp: Option<SmtpSettings>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Resolve settings into a runtime configuration.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when an address or URL does not parse or SMTP
    /// is only partly configured.
    pub fn from_settings(
        settings: &ServerSettings,
        auth: AuthSettings,
        storage: Storage,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            auth,
            storage,
            image_dir: settings.image_dir(),
            image_base_url: settings.image_base_url()?,
            frontend_url: settings.frontend_url()?,
            smtp: settings.smtp()?,
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "RESTO_BIND_ADDR",
        "RESTO_DATABASE_URL",
        "RESTO_DB_POOL_SIZE",
        "RESTO_IMAGE_DIR",
        "RESTO_IMAGE_BASE_URL",
        "RESTO_FRONTEND_URL",
        "RESTO_SMTP_HOST",
        "RESTO_SMTP_PORT",
        "RESTO_SMTP_USERNAME",
        "RESTO_SMTP_PASSWORD",
        "RESTO_SMTP_SENDER",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> ServerSettings {
        let vars = VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        });
        let _guard = lock_env(vars);
        ServerSettings::load_from_iter([OsString::from("resto-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.db_pool_size(), 10);
        assert_eq!(settings.image_dir(), PathBuf::from("uploads"));
        assert_eq!(
            settings.frontend_url().expect("default url"),
            DEFAULT_FRONTEND_URL
        );
        assert!(settings.smtp().expect("smtp").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("RESTO_BIND_ADDR", "127.0.0.1:9000"),
            ("RESTO_DATABASE_URL", "postgres://localhost/resto"),
            ("RESTO_DB_POOL_SIZE", "4"),
            ("RESTO_IMAGE_BASE_URL", "https://img.example.com/"),
            ("RESTO_SMTP_HOST", "smtp.example.com"),
            ("RESTO_SMTP_SENDER", "Resto <noreply@example.com>"),
        ]);

        assert_eq!(
            settings.bind_addr().expect("addr").port(),
            9000
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/resto")
        );
        assert_eq!(settings.db_pool_size(), 4);
        assert_eq!(
            settings.image_base_url().expect("url"),
            "https://img.example.com"
        );
        let smtp = settings.smtp().expect("smtp").expect("configured");
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, DEFAULT_SMTP_PORT);
        assert!(smtp.username.is_none());
    }

    #[rstest]
    #[case::bad_addr(("RESTO_BIND_ADDR", "everywhere"))]
    #[case::relative_url(("RESTO_FRONTEND_URL", "/reset"))]
    #[case::ftp_url(("RESTO_IMAGE_BASE_URL", "ftp://img.example.com"))]
    #[case::host_without_sender(("RESTO_SMTP_HOST", "smtp.example.com"))]
    fn malformed_values_are_rejected(#[case] pair: (&str, &str)) {
        let settings = load_with(&[pair]);
        let auth = AuthSettings::new(vec![1; 32], vec![2; 32]);

        assert!(ServerConfig::from_settings(&settings, auth, Storage::Memory).is_err());
    }
}
