use anyhow::Context;
use crypto_tracker::{
    api::{ self, AppState },
    db::AssetSnapshotRepository,
    providers::CoinGeckoProvider,
    scheduler::RefreshScheduler,
    services::{ AlertService, RefreshService },
    Config,
};
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "crypto_tracker=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| crypto_tracker::AppError::Config(e.to_string()))?;

    tracing::info!(
        assets = ?config.crypto_ids,
        interval_secs = config.refresh_interval.as_secs(),
        "Starting crypto-tracker"
    );

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .context("failed to connect to database")?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.context("failed to run migrations")?;

    tracing::info!("Migrations completed successfully");

    // Initialize services
    let provider = Arc::new(CoinGeckoProvider::new(&config.coingecko_api_url, config.http_timeout)?);
    let snapshots = AssetSnapshotRepository::new(db.clone());

    let refresh_service = Arc::new(
        RefreshService::new(provider, snapshots.clone(), config.crypto_ids.clone())
    );
    let alert_service = Arc::new(AlertService::new(db));

    // Create app state
    let app_state = AppState::new(refresh_service.clone(), alert_service, snapshots);

    // Build application router
    let app = api
        ::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(api::cors_layer(&config.cors_allowed_origins)?);

    // Start server
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    let mut scheduler = RefreshScheduler::new(refresh_service, config.refresh_interval);
    scheduler.start();

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    tracing::info!("Shutting down");
    scheduler.shutdown().await;

    served.context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
