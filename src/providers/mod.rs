pub mod market_provider;
pub mod coingecko;

pub use market_provider::{ MarketDataProvider, MarketRecord };
pub use coingecko::CoinGeckoProvider;
