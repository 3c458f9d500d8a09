use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{ AppError, Result };
use super::market_provider::{ MarketDataProvider, MarketRecord };

const VS_CURRENCY: &str = "usd";
const ORDER: &str = "market_cap_desc";
const PER_PAGE: u32 = 100;

/// CoinGecko-backed market data via `/coins/markets`.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    id: String,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    last_updated: Option<String>,
}

impl From<CoinGeckoMarket> for MarketRecord {
    fn from(market: CoinGeckoMarket) -> Self {
        MarketRecord {
            id: market.id,
            market_cap: market.market_cap.unwrap_or(0.0),
            current_price: market.current_price.unwrap_or(0.0),
            price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or(0.0),
            last_updated: market.last_updated.unwrap_or_else(|| {
                Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
            }),
        }
    }
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn markets_url(&self, asset_ids: &[String]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/coins/markets", self.base_url)).map_err(|e|
            AppError::Config(format!("Invalid CoinGecko URL: {}", e))
        )?;

        url.query_pairs_mut()
            .append_pair("vs_currency", VS_CURRENCY)
            .append_pair("ids", &asset_ids.join(","))
            .append_pair("order", ORDER)
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", "1");

        Ok(url)
    }

    fn parse_markets(body: &[u8]) -> Result<Vec<MarketRecord>> {
        let markets: Vec<CoinGeckoMarket> = serde_json
            ::from_slice(body)
            .map_err(|e| AppError::Fetch(format!("Failed to parse CoinGecko response: {}", e)))?;

        Ok(markets.into_iter().map(MarketRecord::from).collect())
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(&self, asset_ids: &[String]) -> Result<Vec<MarketRecord>> {
        let url = self.markets_url(asset_ids)?;

        let response = self.client
            .get(url)
            .header("accept", "application/json")
            .send().await
            .map_err(|e| AppError::Fetch(format!("CoinGecko request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(
                AppError::Fetch(format!("CoinGecko API returned status: {}", response.status()))
            );
        }

        let body = response
            .bytes().await
            .map_err(|e| AppError::Fetch(format!("Failed to read CoinGecko response: {}", e)))?;

        let records = Self::parse_markets(&body)?;
        tracing::debug!(count = records.len(), "fetched market records from CoinGecko");

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> CoinGeckoProvider {
        CoinGeckoProvider::new(base_url, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_markets_url_query() {
        let provider = provider("https://api.coingecko.com/api/v3/");
        let url = provider
            .markets_url(&["bitcoin".to_string(), "ethereum".to_string()])
            .unwrap();

        assert_eq!(url.path(), "/api/v3/coins/markets");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("vs_currency".to_string(), "usd".to_string()),
                ("ids".to_string(), "bitcoin,ethereum".to_string()),
                ("order".to_string(), "market_cap_desc".to_string()),
                ("per_page".to_string(), "100".to_string()),
                ("page".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_full_record() {
        let body =
            br#"[{"id":"bitcoin","symbol":"btc","market_cap":1200000000000,"current_price":43000.5,
                "price_change_percentage_24h":2.3,"last_updated":"2024-01-01T00:00:00.000Z"}]"#;

        let records = CoinGeckoProvider::parse_markets(body).unwrap();

        assert_eq!(
            records,
            vec![MarketRecord {
                id: "bitcoin".to_string(),
                market_cap: 1.2e12,
                current_price: 43000.5,
                price_change_percentage_24h: 2.3,
                last_updated: "2024-01-01T00:00:00.000Z".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let body = br#"[{"id":"ethereum","market_cap":null}]"#;

        let records = CoinGeckoProvider::parse_markets(body).unwrap();
        let record = &records[0];

        assert_eq!(record.id, "ethereum");
        assert_eq!(record.market_cap, 0.0);
        assert_eq!(record.current_price, 0.0);
        assert_eq!(record.price_change_percentage_24h, 0.0);
        assert!(record.last_updated.ends_with('Z'));
    }

    #[test]
    fn test_malformed_body_is_fetch_error() {
        let result = CoinGeckoProvider::parse_markets(br#"{"status":{"error_code":429}}"#);
        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_fetch_error() {
        // Nothing listens on the discard port
        let provider = provider("http://127.0.0.1:9");
        let result = provider.fetch_markets(&["bitcoin".to_string()]).await;

        assert!(matches!(result, Err(AppError::Fetch(_))));
    }
}
