//! Backend entry-point: loads settings, picks the user store and serves the
//! user pages.

use std::sync::Arc;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::UserStore;
use backend::domain::{UserFormController, UserHome};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::InMemoryUserStore;
use backend::outbound::persistence::{DbPool, DieselUserStore, PoolConfig, run_migrations};
use backend::server::operator_login::load_login_service;
use backend::server::session_key::{BuildMode, load_session_key};
use backend::server::{ServerConfig, create_server};
use backend::settings::AppSettings;

/// Choose PostgreSQL when a database URL is configured, memory otherwise.
async fn build_user_store(settings: &AppSettings) -> std::io::Result<Arc<dyn UserStore>> {
    let Some(url) = settings.database_url() else {
        warn!("MOUSSIA_DATABASE_URL not set; users are kept in memory");
        return Ok(Arc::new(InMemoryUserStore::new()));
    };

    let migration_url = url.to_owned();
    tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(std::io::Error::other)?;
    info!("connected user store to PostgreSQL");
    Ok(Arc::new(DieselUserStore::new(pool)))
}

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

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let rules = settings.name_rules().map_err(std::io::Error::other)?;
    let mode = BuildMode::from_debug_assertions();
    let key = load_session_key(
        &settings.session_key_file(),
        mode,
        settings.allow_ephemeral_session,
    )
    .map_err(std::io::Error::other)?;
    let login = load_login_service(
        settings.admin_login(),
        settings.admin_password_file(),
        mode,
        settings.allow_fixture_login,
    )
    .map_err(std::io::Error::other)?;

    let store = build_user_store(&settings).await?;
    let controller = UserFormController::new(UserHome::new(store), rules);
    let state = HttpState::new(controller, login);

    let config = ServerConfig::new(key, settings.session_cookie_secure(), bind_addr);
    info!(%bind_addr, "starting server");
    create_server(state, config)?.await
}
