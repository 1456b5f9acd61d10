use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::{decode_body, dispatch, require, string_or_number, upstream_failure, url_or_default};
use crate::data_source::{Capability, CapabilitySet, DataSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::config::provider_api_key;
use crate::throttling::RequestThrottle;
use crate::{ContractAddress, MarketInfo, ProviderId, SourceCode, TokenInfo, UNKNOWN_DECIMALS};

pub const DEFAULT_BITQUERY_URL: &str = "https://graphql.bitquery.io/";

const PROVIDER: ProviderId = ProviderId::Bitquery;
const API_KEY_HEADER: &str = "X-API-KEY";

const TOKEN_DEPLOYMENT_QUERY: &str = r#"query ($network: EthereumNetwork!, $address: String!, $from: ISO8601DateTime, $till: ISO8601DateTime) {
  ethereum(network: $network) {
    smartContractCalls(date: {since: $from, till: $till}, smartContractAddress: {is: $address}) {
      created: minimum(of: block, get: time)
      created_block: minimum(of: block)
      created_tx: minimum(of: block, get: tx_hash)
      created_by: minimum(of: block, get: caller)
    }
  }
}"#;

/// Date range searched for the contract's first call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub from: String,
    pub till: String,
}

impl DateWindow {
    pub const DEFAULT_FROM: &'static str = "2008-01-01";
    pub const DEFAULT_TILL: &'static str = "2022-04-13T23:59:59";

    pub fn new(from: impl Into<String>, till: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            till: till.into(),
        }
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FROM, Self::DEFAULT_TILL)
    }
}

/// Bitquery GraphQL adapter; answers deployment facts only.
///
/// `source` is passed through as the GraphQL `network` (for example
/// `"ethereum"` or `"bsc"`).
#[derive(Clone)]
pub struct BitqueryAdapter {
    source: String,
    url: String,
    api_key: String,
    window: DateWindow,
    http_client: Arc<dyn HttpClient>,
    throttle: RequestThrottle,
}

impl Default for BitqueryAdapter {
    fn default() -> Self {
        Self {
            source: String::from("ethereum"),
            url: String::from(DEFAULT_BITQUERY_URL),
            api_key: provider_api_key(PROVIDER),
            window: DateWindow::default(),
            http_client: Arc::new(NoopHttpClient),
            throttle: RequestThrottle::default(),
        }
    }
}

impl BitqueryAdapter {
    /// Production adapter; an empty `url` selects [`DEFAULT_BITQUERY_URL`].
    pub fn new(source: impl Into<String>, url: &str, api_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url_or_default(url, DEFAULT_BITQUERY_URL),
            api_key: api_key.into(),
            window: DateWindow::default(),
            http_client: Arc::new(ReqwestHttpClient::new()),
            throttle: RequestThrottle::default(),
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

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_date_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn date_window(&self) -> &DateWindow {
        &self.window
    }

    fn check_config(&self) -> Result<(), SourceError> {
        require(PROVIDER, &self.url, "url")?;
        require(PROVIDER, &self.api_key, "api key")
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<BitqueryData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BitqueryData {
    ethereum: Option<BitqueryEthereum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BitqueryEthereum {
    smart_contract_calls: Option<Vec<ContractCall>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContractCall {
    #[serde(deserialize_with = "string_or_number")]
    created: String,
    #[serde(deserialize_with = "string_or_number")]
    created_block: String,
    #[serde(deserialize_with = "string_or_number")]
    created_tx: String,
    #[serde(deserialize_with = "string_or_number")]
    created_by: String,
}

impl ContractCall {
    /// Aggregates over zero calls come back as a row of nulls.
    fn is_blank(&self) -> bool {
        self.created_tx.is_empty() && self.created_by.is_empty()
    }

    /// Undated rows sort after every dated one.
    fn deployment_order(&self) -> (bool, &str) {
        (self.created.is_empty(), &self.created)
    }
}

fn normalize_token_info(call: ContractCall) -> TokenInfo {
    TokenInfo {
        creator: call.created_by,
        deployed_block: call.created_block,
        deployed_tx: call.created_tx,
        deployed_at: call.created,
        decimals: String::from(UNKNOWN_DECIMALS),
        ..TokenInfo::default()
    }
}

impl DataSource for BitqueryAdapter {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::token_info_only()
    }

    fn market_info_for_coin<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketInfo>, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported(PROVIDER, Capability::MarketInfo)) })
    }

    fn token_info<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<TokenInfo, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.check_config()?;
            self.throttle.wait().await;

            let variables = json!({
                "network": self.source.trim(),
                "address": address.as_str(),
                "from": self.window.from,
                "till": self.window.till,
            });
            let request = HttpRequest::post(self.url.trim())
                .with_auth(&HttpAuth::header(API_KEY_HEADER, self.api_key.trim()))
                .with_header("content-type", "application/json")
                .with_param("query", TOKEN_DEPLOYMENT_QUERY)
                .with_param("variables", variables);

            let response = dispatch(self.http_client.as_ref(), PROVIDER, request).await?;
            let decoded: GraphQlResponse = decode_body(PROVIDER, &response)?;
            if !decoded.errors.is_empty() || !response.is_success() {
                if let Some(first) = decoded.errors.first() {
                    tracing::debug!(provider = %PROVIDER, error = %first.message, "graphql error");
                }
                return Err(upstream_failure(PROVIDER, &response));
            }

            decoded
                .data
                .and_then(|data| data.ethereum)
                .and_then(|ethereum| ethereum.smart_contract_calls)
                .unwrap_or_default()
                .into_iter()
                .filter(|call| !call.is_blank())
                .min_by(|left, right| left.deployment_order().cmp(&right.deployment_order()))
                .map(normalize_token_info)
                .ok_or_else(|| SourceError::empty_result(PROVIDER, "no data"))
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
