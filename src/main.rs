use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use sqlx::postgres::PgPoolOptions;
use subscriptions::config;
use subscriptions::subs::{PgSubscriptionStore, SubscriptionService};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(level: Option<LevelFilter>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(LevelFilter::INFO).to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let level = config::log_level_filter(config::LOG_LEVEL.as_str());
    fmt().with_env_filter(env_filter(level.as_ref().ok().copied())).json().init();
    if let Err(error) = level {
        tracing::warn!(%error, "falling back to info level");
    }

    // Fail fast on incomplete database settings
    let db_config = config::database_config_from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .connect_with(db_config.connect_options()?)
        .await
        .context("failed to connect to Postgres")?;
    tracing::info!("database connected");

    if let Err(error) = sqlx::migrate!().run(&pool).await {
        if *config::ALLOW_MIGRATION_FAILURE {
            tracing::warn!(
                ?error,
                "Database migrations failed but continuing due to ALLOW_MIGRATION_FAILURE"
            );
        } else {
            return Err(error).context("failed to run database migrations");
        }
    }

    let store = Arc::new(PgSubscriptionStore::new(pool));
    let service = SubscriptionService::new(store);

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let app = subscriptions::app(service)
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .layer(prometheus_layer);

    let addr: SocketAddr = format!("{}:{}", config::BIND_ADDRESS.as_str(), *config::SERVER_PORT)
        .parse()
        .context("invalid bind address")?;
    tracing::info!(%addr, "Listening for incoming connections");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
