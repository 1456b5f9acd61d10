//! # Chainscan Core
//!
//! Provider-neutral token metadata for smart contracts.
//!
//! ## Overview
//!
//! One capability contract ([`DataSource`]) over four kinds of upstream:
//!
//! - **Block explorer** (Etherscan and compatible explorers): token info,
//!   verified source code, ABI, verification status
//! - **Market aggregators** (CoinGecko, CoinMarketCap): coin/platform
//!   listings and token metadata
//! - **Chain analytics** (Bitquery GraphQL): deployment facts
//!
//! Every answer is normalized into the same [`TokenInfo`] shape regardless of
//! which provider produced it.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Etherscan, CoinGecko, CoinMarketCap, Bitquery) |
//! | [`config`] | Factory configuration, environment loading |
//! | [`data_source`] | Capability trait and error taxonomy |
//! | [`domain`] | Domain models (TokenInfo, MarketInfo, SourceCode, ContractAddress) |
//! | [`error`] | Core error types |
//! | [`factory`] | Adapter selection by provider name |
//! | [`http_client`] | Request dispatcher and HTTP client abstraction |
//! | [`market_map`] | Time-boxed name-to-id lookup table |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Per-provider rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chainscan_core::{new_data_source, ContractAddress, DataSourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DataSourceConfig::new("bsc")
//!         .with_alias("coingecko")
//!         .with_throughput(5);
//!     let source = new_data_source(&config)?;
//!
//!     let address = ContractAddress::parse("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82")?;
//!     let info = source.token_info(&address).await?;
//!     println!("{} ({}) decimals={}", info.name, info.symbol, info.decimals);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Factory      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ Market Map       │
//! │ (Adapter Trait) │     │ (24h TTL)        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Throttle        │────▶│ HTTP Client      │
//! │ (token bucket)  │     │ (reqwest/none)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every adapter operation returns [`SourceError`]; branch on its kind:
//!
//! ```rust
//! use chainscan_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Unsupported => "provider does not offer this",
//!         SourceErrorKind::Misconfigured => "missing url or api key",
//!         SourceErrorKind::Upstream => "provider reported a failure",
//!         _ => "request failed",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! API keys travel only in request headers or parameters and are never logged.

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod factory;
pub mod http_client;
pub mod market_map;
pub mod source;
pub mod throttling;

// Adapter implementations
pub use adapters::{
    BitqueryAdapter, CoinGeckoAdapter, CoinMarketCapAdapter, DateWindow, EtherscanAdapter,
    DEFAULT_BITQUERY_URL, DEFAULT_COINGECKO_URL, DEFAULT_COINMARKETCAP_URL, DEFAULT_ETHERSCAN_URL,
};

// Configuration
pub use config::{provider_api_key, DataSourceConfig};

// Data source trait and types
pub use data_source::{Capability, CapabilitySet, DataSource, SourceError, SourceErrorKind};

// Domain models
pub use domain::{ContractAddress, MarketInfo, SourceCode, TokenInfo, UNKNOWN_DECIMALS};

// Error types
pub use error::{CoreError, ValidationError};

// Factory
pub use factory::{new_data_source, new_data_source_with_client};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, RequestBody,
};

// Market map
pub use market_map::{MarketMap, DEFAULT_STALENESS_WINDOW};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::{RequestThrottle, DEFAULT_REQUESTS_PER_SECOND};
