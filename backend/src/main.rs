//! Backend entry-point: loads settings, connects storage, and serves the REST
//! API with its OpenAPI docs.

mod server;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use resto_backend::auth_config::{AuthConfigError, AuthSettings, BuildMode, auth_settings_from_env};
use resto_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{ServerConfig, ServerSettings, Storage, create_server, health_state_for};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Token secrets and cookie policy from the process environment.
fn process_auth_settings(mode: BuildMode) -> Result<AuthSettings, AuthConfigError> {
    auth_settings_from_env(&DefaultEnv::new(), mode)
}

/// Migrate and pool the configured database, or fall back to memory.
async fn connect_storage(settings: &ServerSettings) -> color_eyre::Result<Storage> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(Storage::Memory);
    };
    run_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size()))
        .await
        .wrap_err("failed to build database pool")?;
    info!(max_size = settings.db_pool_size(), "database pool ready");
    Ok(Storage::Postgres(pool))
}

#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "failed to initialise Prometheus metrics; continuing without");
            None
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let auth = process_auth_settings(BuildMode::from_debug_assertions())
        .wrap_err("failed to load auth settings")?;
    let storage = connect_storage(&settings).await?;
    let config = ServerConfig::from_settings(&settings, auth, storage)
        .wrap_err("invalid server settings")?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("resto")
            .endpoint("/metrics")
            .build()
    }));

    let health_state = health_state_for(&config);
    let server = create_server(health_state.clone(), config)?;
    info!("server listening");
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}
