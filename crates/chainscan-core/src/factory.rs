//! Builds a [`DataSource`] from a [`DataSourceConfig`].
//!
//! Every call yields an independent adapter with its own throttle and market
//! map; nothing is shared between instances built here.

use std::sync::Arc;

use crate::adapters::{
    url_or_default, BitqueryAdapter, CoinGeckoAdapter, CoinMarketCapAdapter, EtherscanAdapter,
    DEFAULT_BITQUERY_URL, DEFAULT_COINGECKO_URL, DEFAULT_COINMARKETCAP_URL, DEFAULT_ETHERSCAN_URL,
};
use crate::config::DataSourceConfig;
use crate::data_source::{DataSource, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::market_map::MarketMap;
use crate::throttling::RequestThrottle;
use crate::ProviderId;

/// Production data source backed by reqwest.
///
/// # Errors
///
/// Returns [`SourceErrorKind::UnknownSource`](crate::SourceErrorKind::UnknownSource)
/// when neither `alias` nor `source` names a known provider.
pub fn new_data_source(config: &DataSourceConfig) -> Result<Arc<dyn DataSource>, SourceError> {
    new_data_source_with_client(config, Arc::new(ReqwestHttpClient::new()))
}

/// Same as [`new_data_source`] over a caller-supplied transport.
pub fn new_data_source_with_client(
    config: &DataSourceConfig,
    http_client: Arc<dyn HttpClient>,
) -> Result<Arc<dyn DataSource>, SourceError> {
    let provider: ProviderId = config.provider_name().parse()?;
    let throttle = RequestThrottle::per_second(config.throughput_per_second);
    let source = config.source.trim();
    let api_key = config.api_key.trim();

    tracing::debug!(
        provider = %provider,
        source = source,
        rate = throttle.rate(),
        "building data source"
    );

    let data_source: Arc<dyn DataSource> = match provider {
        ProviderId::Etherscan => Arc::new(
            EtherscanAdapter::with_http_client(http_client, api_key)
                .with_source(source)
                .with_url(url_or_default(&config.url, DEFAULT_ETHERSCAN_URL))
                .with_throttle(throttle),
        ),
        ProviderId::CoinGecko => Arc::new(
            CoinGeckoAdapter::with_http_client(http_client, api_key)
                .with_source(source)
                .with_url(url_or_default(&config.url, DEFAULT_COINGECKO_URL))
                .with_throttle(throttle)
                .with_market_map(MarketMap::default()),
        ),
        ProviderId::CoinMarketCap => Arc::new(
            CoinMarketCapAdapter::with_http_client(http_client, api_key)
                .with_source(source)
                .with_url(url_or_default(&config.url, DEFAULT_COINMARKETCAP_URL))
                .with_throttle(throttle)
                .with_market_map(MarketMap::default()),
        ),
        ProviderId::Bitquery => Arc::new(
            BitqueryAdapter::with_http_client(http_client, api_key)
                .with_source(source)
                .with_url(url_or_default(&config.url, DEFAULT_BITQUERY_URL))
                .with_throttle(throttle),
        ),
    };
    Ok(data_source)
}
