//! Storefront entry-point: loads settings, migrates the database and serves
//! the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, build_http_state, create_server};
use storefront::config::StorefrontSettings;
use storefront::inbound::http::health::HealthState;
use storefront::inbound::http::session_config::{BuildMode, session_settings_from_env};
use storefront::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = StorefrontSettings::load().wrap_err("load settings")?;
    let sessions =
        session_settings_from_env(&mockable::DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("session cookie settings")?;

    let applied = run_migrations(settings.database_url())
        .await
        .wrap_err("apply migrations")?;
    info!(applied, "database migrations complete");

    let pool_config = PoolConfig::new(settings.database_url()).with_max_size(settings.pool_size());
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("connect to database")?;
    let http_state = build_http_state(&pool, &settings).wrap_err("assemble adapters")?;

    if let Some((email, password)) = settings.admin_credentials() {
        http_state
            .auth
            .ensure_admin(email, &password)
            .await
            .wrap_err("bootstrap admin account")?;
        info!(%email, "admin account ready");
    }

    let config = ServerConfig::new(sessions, settings.bind_addr()?, http_state);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::storefront_metrics()?));
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "storefront listening");
    server.await?;
    Ok(())
}
