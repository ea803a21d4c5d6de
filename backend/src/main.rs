//! Schedule arranger entry-point: loads settings, applies migrations, and
//! serves the web app.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]

mod server;

use actix_web::web;
use mockable::{DefaultEnv, Env};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use schedule_arranger::inbound::http::health::HealthState;
use schedule_arranger::inbound::http::session_config::{BuildMode, session_settings_from_env};
use schedule_arranger::inbound::http::views::ensure_templates_loaded;
use schedule_arranger::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use server::{AppSettings, ServerConfig, create_server};

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

    let env = DefaultEnv::new();
    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    ensure_templates_loaded().map_err(std::io::Error::other)?;

    let database_url = settings
        .database_url(env.string("DATABASE_URL"))
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let github = settings.github_credentials().map_err(std::io::Error::other)?;

    let migration_url = database_url.clone();
    let applied = web::block(move || apply_migrations(&migration_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema up to date");

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(std::io::Error::other)?;

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        pool,
    )
    .with_github(github);

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    create_server(health_state, config)?.await
}
