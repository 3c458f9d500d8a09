use async_trait::async_trait;
use serde::{ Deserialize, Serialize };

use crate::error::Result;

/// One asset's market values as reported upstream, with missing numbers
/// already defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: String,
    pub market_cap: f64,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    /// Upstream "last updated" string, parsed during reconciliation.
    pub last_updated: String,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current market snapshot for the given asset ids.
    /// One outbound call, no retries.
    async fn fetch_markets(&self, asset_ids: &[String]) -> Result<Vec<MarketRecord>>;
}
