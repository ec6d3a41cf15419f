//! Backend entry-point: loads settings, prepares persistence, and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lightbox::inbound::http::health::HealthState;
use lightbox::inbound::http::session_config::fingerprint::key_fingerprint;
use lightbox::inbound::http::session_config::{BuildMode, session_settings};
use lightbox::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use lightbox::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings(&settings.session_toggles(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let database_url = settings.database_url().map(str::to_owned);
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        settings,
    );

    if let Some(url) = database_url {
        let applied = run_pending_migrations(&url)
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(|err| std::io::Error::other(err.into_message()))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
