mod api;
mod middleware;

use std::sync::Arc;

use alphaleads_core::{AppConfig, Environment, LeadStore};
use alphaleads_pipeline::{InMemoryLeadStore, LeadPipeline};
use alphaleads_validation::LeadValidator;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(alphaleads_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = connect_store(&config).await?;
    let pipeline = LeadPipeline::from_config(&config)?.with_store(store);
    let validator = LeadValidator::from_config(&config)?;

    tracing::info!(
        env = %config.env,
        providers = ?pipeline.enabled_providers(),
        validation = config.validation_enabled,
        "lead pipeline ready"
    );

    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let rate_limit = RateLimitState::from_app_config(&config);
    let app = build_app(
        AppState {
            pipeline: Arc::new(pipeline),
            validator: Arc::new(validator),
            config: Arc::clone(&config),
        },
        auth,
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise a process-local store.
async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LeadStore>> {
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL not set; leads are kept in memory only");
        return Ok(Arc::new(InMemoryLeadStore::new()));
    }

    let pool = alphaleads_db::connect_pool_from_config(config).await?;
    let applied = alphaleads_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations complete");
    Ok(Arc::new(alphaleads_db::PgLeadStore::new(pool)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
