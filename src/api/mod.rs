use std::sync::Arc;

use axum::{ http::HeaderValue, routing::{ get, post }, Router };
use tower_http::cors::{ Any, CorsLayer };

pub mod cryptocurrency;
pub mod alert;

use crate::db::AssetSnapshotRepository;
use crate::error::{ AppError, Result };
use crate::services::{ AlertService, RefreshService };

#[derive(Clone)]
pub struct AppState {
    pub refresh_service: Arc<RefreshService>,
    pub alert_service: Arc<AlertService>,
    pub snapshots: AssetSnapshotRepository,
}

impl AppState {
    pub fn new(
        refresh_service: Arc<RefreshService>,
        alert_service: Arc<AlertService>,
        snapshots: AssetSnapshotRepository
    ) -> Self {
        Self {
            refresh_service,
            alert_service,
            snapshots,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/update-cryptocurrencies/", post(cryptocurrency::update_cryptocurrencies))
        .route("/cryptocurrencies/", get(cryptocurrency::list_cryptocurrencies))
        .route("/alerts/", post(alert::create_alert))
        .with_state(state)
}

/// CORS restricted to the configured frontend origins.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>().map_err(|_| {
                AppError::Config(format!("Invalid CORS origin: {}", o))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any))
}

async fn health_check() -> &'static str {
    "OK"
}
