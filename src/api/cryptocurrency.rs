use axum::{ extract::State, Json };
use serde::Serialize;

use crate::db::entity::asset_snapshot;
use crate::error::Result;

use super::AppState;

#[derive(Serialize)]
pub struct UpdateResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Serialize)]
pub struct CryptocurrencyResponse {
    pub id: i32,
    pub name: String,
    pub market_cap: Option<f64>,
    pub hourly_price: Option<f64>,
    pub hourly_percentage: Option<f64>,
    pub time_updated: Option<String>,
}

impl From<asset_snapshot::Model> for CryptocurrencyResponse {
    fn from(snapshot: asset_snapshot::Model) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            market_cap: snapshot.market_cap,
            hourly_price: snapshot.price,
            hourly_percentage: snapshot.percent_change,
            time_updated: snapshot.updated_at.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        }
    }
}

pub async fn update_cryptocurrencies(State(state): State<AppState>) -> Result<Json<UpdateResponse>> {
    let summary = state.refresh_service.refresh().await?;

    Ok(
        Json(UpdateResponse {
            status: "success",
            message: "Cryptocurrencies updated successfully.",
            fetched: summary.fetched,
            inserted: summary.inserted,
            updated: summary.updated,
        })
    )
}

pub async fn list_cryptocurrencies(
    State(state): State<AppState>
) -> Result<Json<Vec<CryptocurrencyResponse>>> {
    let snapshots = state.snapshots.find_all().await?;

    Ok(Json(snapshots.into_iter().map(CryptocurrencyResponse::from).collect()))
}
