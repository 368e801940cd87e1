//! Backend entry-point: loads settings, applies migrations, and serves the
//! recipe API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{AppSettings, ServerConfig, create_server};

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

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let database_url = settings.database_url()?;
    run_migrations(database_url)
        .await
        .wrap_err("failed to apply database migrations")?;

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("failed to build database pool")?;

    let config = ServerConfig::new(settings.bind_addr()?, pool)
        .with_tokens(settings.jwt_secret.clone(), settings.jwt_ttl()?)
        .with_bcrypt_cost(settings.bcrypt_cost())
        .with_upload(settings.upload_config()?, settings.upload_timeout());
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "recipe API listening");

    let outcome = server.await;
    health_state.mark_draining();
    outcome.wrap_err("server terminated unexpectedly")
}
