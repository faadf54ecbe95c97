use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::{init_logging, LogFormat};
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use service::services::ServiceContext;

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when readable, otherwise defaults plus
/// `DATABASE_URL` from the environment.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            warn!(error = %file_err, "config file unusable; falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Bring the schema up to date.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), StartupError> {
    migration::Migrator::up(db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))
}

/// Application router over an already migrated database.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let ctx = ServiceContext::from_config(db, cfg);
    info!(caching = ctx.caching(), max_page_size = ctx.limits().max_page_size, "services ready");
    routes::build_router(AppState::new(ctx), build_cors())
}

/// Public entry: load config, connect, migrate and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging(LogFormat::from_env());

    let cfg = load_config()?;
    let db = models::db::connect_with_config(&cfg.database).await.map_err(StartupError::from)?;
    migrate(&db).await?;

    let app = build_app(db, &cfg);
    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(StartupError::from)?;
    info!(%addr, "starting server crate");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
