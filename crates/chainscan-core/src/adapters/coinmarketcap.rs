use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{
    decode_body, dispatch, first_non_empty, require, string_or_number, upstream_failure,
    url_or_default, OneOrMany,
};
use crate::data_source::{Capability, CapabilitySet, DataSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
use crate::market_map::MarketMap;
use crate::config::provider_api_key;
use crate::throttling::RequestThrottle;
use crate::{ContractAddress, MarketInfo, ProviderId, SourceCode, TokenInfo, UNKNOWN_DECIMALS};

pub const DEFAULT_COINMARKETCAP_URL: &str = "https://pro-api.coinmarketcap.com";

const PROVIDER: ProviderId = ProviderId::CoinMarketCap;
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const MAP_PATH: &str = "/v1/cryptocurrency/map";
const INFO_PATH: &str = "/v2/cryptocurrency/info";
const DEFAULT_TOKEN_TYPE: &str = "ERC20";

/// CoinMarketCap adapter.
///
/// The contract-address lookup may return the same token on several
/// platforms; when `source` names a coin from the `/map` listing, the record
/// deployed on that platform wins.
#[derive(Clone)]
pub struct CoinMarketCapAdapter {
    source: String,
    url: String,
    api_key: String,
    http_client: Arc<dyn HttpClient>,
    throttle: RequestThrottle,
    market: MarketMap,
}

impl Default for CoinMarketCapAdapter {
    fn default() -> Self {
        Self {
            source: String::new(),
            url: String::from(DEFAULT_COINMARKETCAP_URL),
            api_key: provider_api_key(PROVIDER),
            http_client: Arc::new(NoopHttpClient),
            throttle: RequestThrottle::default(),
            market: MarketMap::default(),
        }
    }
}

impl CoinMarketCapAdapter {
    /// Production adapter; an empty `url` selects [`DEFAULT_COINMARKETCAP_URL`].
    pub fn new(source: impl Into<String>, url: &str, api_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url_or_default(url, DEFAULT_COINMARKETCAP_URL),
            api_key: api_key.into(),
            http_client: Arc::new(ReqwestHttpClient::new()),
            throttle: RequestThrottle::default(),
            market: MarketMap::default(),
        }
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_market_map(mut self, market: MarketMap) -> Self {
        self.market = market;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn check_config(&self) -> Result<(), SourceError> {
        require(PROVIDER, &self.url, "url")?;
        require(PROVIDER, &self.api_key, "api key")
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{}", self.url.trim().trim_end_matches('/'), path))
            .with_auth(&HttpAuth::header(API_KEY_HEADER, self.api_key.trim()))
            .with_header("accept", "application/json")
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SourceError> {
        self.throttle.wait().await;
        let response = dispatch(self.http_client.as_ref(), PROVIDER, request).await?;
        check_status(&response)?;
        Ok(response)
    }

    async fn fetch_map(&self) -> Result<Vec<MarketInfo>, SourceError> {
        let response = self.send(self.request(MAP_PATH)).await?;
        let envelope: CmcEnvelope<Vec<CmcCoin>> = decode_body(PROVIDER, &response)?;
        Ok(envelope.data.into_iter().map(MarketInfo::from).collect())
    }

    /// Platform id for the configured source, if it resolves through the map.
    async fn preferred_platform(&self) -> Result<Option<String>, SourceError> {
        if self.source.trim().is_empty() {
            return Ok(None);
        }

        self.market
            .refresh_if_stale(PROVIDER, || self.fetch_map())
            .await?;
        let resolved = self.market.get(PROVIDER, &self.source).await;
        if resolved.is_none() {
            tracing::debug!(
                provider = %PROVIDER,
                source = %self.source,
                "source not in market map, taking first record"
            );
        }
        Ok(resolved.map(|market| market.id))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CmcStatus {
    error_code: i64,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CmcStatusEnvelope {
    #[serde(default)]
    status: CmcStatus,
}

#[derive(Debug, Deserialize)]
struct CmcEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CmcCoin {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    name: String,
}

impl From<CmcCoin> for MarketInfo {
    fn from(raw: CmcCoin) -> Self {
        MarketInfo::new(raw.id, raw.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CmcTokenInfo {
    name: String,
    symbol: String,
    description: Option<String>,
    platform: Option<CmcPlatform>,
    urls: CmcUrls,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CmcPlatform {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CmcUrls {
    website: Vec<String>,
    twitter: Vec<String>,
    reddit: Vec<String>,
    chat: Vec<String>,
    source_code: Vec<String>,
}

/// Rejects envelopes whose `status.error_code` is non-zero and any non-2xx response.
fn check_status(response: &HttpResponse) -> Result<(), SourceError> {
    let envelope: CmcStatusEnvelope = decode_body(PROVIDER, response)?;
    if envelope.status.error_code != 0 || !response.is_success() {
        tracing::debug!(
            provider = %PROVIDER,
            code = envelope.status.error_code,
            error_message = envelope.status.error_message.as_deref().unwrap_or_default(),
            "error status in envelope"
        );
        return Err(upstream_failure(PROVIDER, response));
    }
    Ok(())
}

fn select_record(records: Vec<CmcTokenInfo>, platform_id: Option<&str>) -> Option<CmcTokenInfo> {
    let position = platform_id.and_then(|wanted| {
        records.iter().position(|record| {
            record
                .platform
                .as_ref()
                .is_some_and(|platform| platform.id == wanted)
        })
    });
    records.into_iter().nth(position.unwrap_or(0))
}

fn chat_link(chat: &[String], needle: &str) -> String {
    chat.iter()
        .find(|url| url.contains(needle))
        .cloned()
        .unwrap_or_default()
}

fn normalize_token_info(raw: CmcTokenInfo) -> TokenInfo {
    let urls = raw.urls;

    TokenInfo {
        name: raw.name,
        symbol: raw.symbol,
        decimals: String::from(UNKNOWN_DECIMALS),
        token_type: String::from(DEFAULT_TOKEN_TYPE),
        website: first_non_empty(&urls.website),
        twitter: first_non_empty(&urls.twitter),
        reddit: first_non_empty(&urls.reddit),
        telegram: chat_link(&urls.chat, "t.me"),
        discord: chat_link(&urls.chat, "discord"),
        github: first_non_empty(&urls.source_code),
        description: raw.description.unwrap_or_default(),
        ..TokenInfo::default()
    }
}

impl DataSource for CoinMarketCapAdapter {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::market_aggregator()
    }

    fn market_info_for_coin<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketInfo>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.check_config()?;
            self.fetch_map().await
        })
    }

    fn token_info<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<TokenInfo, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.check_config()?;
            let platform_id = self.preferred_platform().await?;

            let request = self
                .request(INFO_PATH)
                .with_param("address", address.to_lowercase());
            let response = self.send(request).await?;
            let envelope: CmcEnvelope<BTreeMap<String, OneOrMany<CmcTokenInfo>>> =
                decode_body(PROVIDER, &response)?;

            let records = envelope
                .data
                .into_values()
                .flat_map(OneOrMany::into_vec)
                .collect();
            select_record(records, platform_id.as_deref())
                .map(normalize_token_info)
                .ok_or_else(|| SourceError::empty_result(PROVIDER, format!("no token info for {address}")))
        })
    }

    fn source_code<'a>(
        &'a self,
        _address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SourceCode>, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported(PROVIDER, Capability::SourceCode)) })
    }

    fn abi_data<'a>(
        &'a self,
        _address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported(PROVIDER, Capability::Abi)) })
    }

    fn is_verified<'a>(
        &'a self,
        _address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported(PROVIDER, Capability::Verification)) })
    }
}
