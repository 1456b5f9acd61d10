use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{decode_body, dispatch, first_non_empty, require, upstream_failure, url_or_default};
use crate::data_source::{Capability, CapabilitySet, DataSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
use crate::market_map::MarketMap;
use crate::config::provider_api_key;
use crate::throttling::RequestThrottle;
use crate::{ContractAddress, MarketInfo, ProviderId, SourceCode, TokenInfo, UNKNOWN_DECIMALS};

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/";

const PROVIDER: ProviderId = ProviderId::CoinGecko;
const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";
const DEMO_KEY_HEADER: &str = "x-cg-demo-api-key";
const DEFAULT_TOKEN_TYPE: &str = "ERC20";

/// CoinGecko adapter.
///
/// Token lookups go through the asset-platform listing: the configured
/// `source` (for example `"bsc"` or `"ethereum"`) is resolved to a platform id
/// via the adapter's [`MarketMap`] before the contract endpoint is queried.
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    source: String,
    url: String,
    api_key: String,
    http_client: Arc<dyn HttpClient>,
    throttle: RequestThrottle,
    market: MarketMap,
}

impl Default for CoinGeckoAdapter {
    fn default() -> Self {
        Self {
            source: String::from("ethereum"),
            url: String::from(DEFAULT_COINGECKO_URL),
            api_key: provider_api_key(PROVIDER),
            http_client: Arc::new(NoopHttpClient),
            throttle: RequestThrottle::default(),
            market: MarketMap::default(),
        }
    }
}

impl CoinGeckoAdapter {
    /// Production adapter; an empty `url` selects [`DEFAULT_COINGECKO_URL`].
    pub fn new(source: impl Into<String>, url: &str, api_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url_or_default(url, DEFAULT_COINGECKO_URL),
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
        require(PROVIDER, &self.url, "url")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim().trim_end_matches('/'), path)
    }

    /// Pro keys only work against the pro host; everything else is a demo key.
    fn key_header(&self) -> &'static str {
        if self.url.contains("pro-api") {
            PRO_KEY_HEADER
        } else {
            DEMO_KEY_HEADER
        }
    }

    async fn get(&self, path: &str) -> Result<HttpResponse, SourceError> {
        self.throttle.wait().await;

        let mut request = HttpRequest::get(self.endpoint(path)).with_header("accept", "application/json");
        if !self.api_key.trim().is_empty() {
            request = request.with_auth(&HttpAuth::header(self.key_header(), self.api_key.trim()));
        }

        let response = dispatch(self.http_client.as_ref(), PROVIDER, request).await?;
        if !response.is_success() {
            return Err(upstream_failure(PROVIDER, &response));
        }
        Ok(response)
    }

    async fn fetch_platforms(&self) -> Result<Vec<MarketInfo>, SourceError> {
        let response = self.get("asset_platforms").await?;
        let platforms: Vec<CoinGeckoPlatform> = decode_body(PROVIDER, &response)?;
        Ok(platforms.into_iter().map(MarketInfo::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct CoinGeckoPlatform {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    shortname: Option<String>,
}

impl From<CoinGeckoPlatform> for MarketInfo {
    fn from(raw: CoinGeckoPlatform) -> Self {
        let name = raw
            .shortname
            .filter(|shortname| !shortname.trim().is_empty())
            .or(raw.name)
            .unwrap_or_default();
        MarketInfo::new(raw.id, name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinGeckoTokenInfo {
    error: Option<String>,
    name: String,
    symbol: String,
    detail_platforms: HashMap<String, CoinGeckoDetailPlatform>,
    description: CoinGeckoDescription,
    links: CoinGeckoLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinGeckoDetailPlatform {
    decimal_place: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinGeckoDescription {
    en: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinGeckoLinks {
    homepage: Vec<Option<String>>,
    twitter_screen_name: Option<String>,
    telegram_channel_identifier: Option<String>,
    subreddit_url: Option<String>,
    chat_url: Vec<Option<String>>,
    repos_url: CoinGeckoRepos,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoinGeckoRepos {
    github: Vec<Option<String>>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn flatten(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

/// CoinGecko sends the bare reddit host when a coin has no subreddit.
fn subreddit(url: Option<String>) -> String {
    present(url)
        .filter(|url| url.contains("/r/"))
        .unwrap_or_default()
}

fn normalize_token_info(raw: CoinGeckoTokenInfo, platform_id: &str) -> TokenInfo {
    let decimals = raw
        .detail_platforms
        .get(platform_id)
        .and_then(|platform| platform.decimal_place)
        .map_or_else(|| String::from(UNKNOWN_DECIMALS), |places| places.to_string());
    let links = raw.links;

    TokenInfo {
        name: raw.name,
        symbol: raw.symbol,
        decimals,
        token_type: String::from(DEFAULT_TOKEN_TYPE),
        website: first_non_empty(&flatten(links.homepage)),
        twitter: present(links.twitter_screen_name)
            .map(|name| format!("https://twitter.com/{name}"))
            .unwrap_or_default(),
        reddit: subreddit(links.subreddit_url),
        telegram: present(links.telegram_channel_identifier)
            .map(|channel| format!("https://t.me/{channel}"))
            .unwrap_or_default(),
        discord: flatten(links.chat_url)
            .into_iter()
            .find(|url| url.contains("discord"))
            .unwrap_or_default(),
        github: first_non_empty(&flatten(links.repos_url.github)),
        description: present(raw.description.en).unwrap_or_default(),
        ..TokenInfo::default()
    }
}

impl DataSource for CoinGeckoAdapter {
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
            self.fetch_platforms().await
        })
    }

    fn token_info<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<TokenInfo, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.check_config()?;
            self.market
                .refresh_if_stale(PROVIDER, || self.fetch_platforms())
                .await?;
            let platform = self.market.get(PROVIDER, &self.source).await.ok_or_else(|| {
                SourceError::empty_result(
                    PROVIDER,
                    format!("market id not found for source '{}'", self.source),
                )
            })?;

            let path = format!("coins/{}/contract/{}", platform.id, address.to_lowercase());
            let response = self.get(&path).await?;
            let raw: CoinGeckoTokenInfo = decode_body(PROVIDER, &response)?;
            if raw.error.is_some() {
                return Err(upstream_failure(PROVIDER, &response));
            }

            Ok(normalize_token_info(raw, &platform.id))
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
