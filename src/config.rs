use std::env;
use std::time::Duration;

const DEFAULT_CRYPTO_IDS: &str = "bitcoin,ethereum";
const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 600;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Upstream asset ids tracked by every refresh cycle.
    pub crypto_ids: Vec<String>,
    pub coingecko_api_url: String,
    pub http_timeout: Duration,
    pub refresh_interval: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
        where F: Fn(&str) -> Option<String>
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => Self::database_url_from_parts(&lookup)?,
        };

        let crypto_ids = Self::parse_list(
            &lookup("CRYPTO_IDS").unwrap_or_else(|| DEFAULT_CRYPTO_IDS.to_string())
        );
        if crypto_ids.is_empty() {
            return Err("CRYPTO_IDS must contain at least one asset id".into());
        }

        let coingecko_api_url = lookup("COINGECKO_API_URL")
            .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let http_timeout_secs: u64 = match lookup("HTTP_TIMEOUT_SECS") {
            Some(v) => v.parse()?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let refresh_interval_secs: u64 = match lookup("REFRESH_INTERVAL_SECS") {
            Some(v) => v.parse()?,
            None => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        if refresh_interval_secs == 0 {
            return Err("REFRESH_INTERVAL_SECS must be greater than zero".into());
        }

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()?;

        let cors_allowed_origins = Self::parse_list(
            &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
        );

        Ok(Config {
            database_url,
            crypto_ids,
            coingecko_api_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            server_host,
            server_port,
            cors_allowed_origins,
        })
    }

    fn database_url_from_parts<F>(lookup: &F) -> Result<String, Box<dyn std::error::Error>>
        where F: Fn(&str) -> Option<String>
    {
        let user = lookup("DB_USER").ok_or("DATABASE_URL or DB_USER must be set")?;
        let pass = lookup("DB_PASS").unwrap_or_default();
        let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
        let name = lookup("DB_NAME").ok_or("DATABASE_URL or DB_NAME must be set")?;

        Ok(format!("postgres://{}:{}@{}/{}", user, pass, host, name))
    }

    fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
