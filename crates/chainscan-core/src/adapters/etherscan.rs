use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{decode_body, dispatch, require, upstream_failure, url_or_default, OneOrMany};
use crate::data_source::{Capability, CapabilitySet, DataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
use crate::config::provider_api_key;
use crate::throttling::RequestThrottle;
use crate::{ContractAddress, MarketInfo, ProviderId, SourceCode, TokenInfo, UNKNOWN_DECIMALS};

pub const DEFAULT_ETHERSCAN_URL: &str = "https://api.etherscan.io/api";

const PROVIDER: ProviderId = ProviderId::Etherscan;
const SUCCESS_STATUS: &str = "1";

/// Etherscan-family block explorer adapter (etherscan, bscscan, polygonscan, ...).
///
/// Works against any explorer exposing the `module`/`action` query API; point
/// `url` at the explorer's `/api` endpoint.
#[derive(Clone)]
pub struct EtherscanAdapter {
    source: String,
    url: String,
    api_key: String,
    http_client: Arc<dyn HttpClient>,
    throttle: RequestThrottle,
}

impl Default for EtherscanAdapter {
    fn default() -> Self {
        Self {
            source: String::from(PROVIDER.as_str()),
            url: String::from(DEFAULT_ETHERSCAN_URL),
            api_key: provider_api_key(PROVIDER),
            http_client: Arc::new(NoopHttpClient),
            throttle: RequestThrottle::default(),
        }
    }
}

impl EtherscanAdapter {
    /// Production adapter; an empty `url` selects [`DEFAULT_ETHERSCAN_URL`].
    pub fn new(source: impl Into<String>, url: &str, api_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url_or_default(url, DEFAULT_ETHERSCAN_URL),
            api_key: api_key.into(),
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

    pub fn source(&self) -> &str {
        &self.source
    }

    fn check_config(&self) -> Result<(), SourceError> {
        require(PROVIDER, &self.url, "url")?;
        require(PROVIDER, &self.api_key, "api key")
    }

    async fn call(
        &self,
        module: &str,
        action: &str,
        address: &ContractAddress,
    ) -> Result<HttpResponse, SourceError> {
        self.check_config()?;
        self.throttle.wait().await;

        let request = HttpRequest::get(&self.url)
            .with_param("module", module)
            .with_param("action", action)
            .with_param("address", address.as_str())
            .with_param("apikey", self.api_key.as_str());

        dispatch(self.http_client.as_ref(), PROVIDER, request).await
    }
}

/// Status-only view of the `{status, message, result}` envelope.
#[derive(Debug, Deserialize)]
struct EtherscanStatus {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct EtherscanEnvelope<T> {
    result: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EtherscanTokenInfo {
    token_name: String,
    symbol: String,
    divisor: String,
    token_type: String,
    description: String,
    website: String,
    reddit: String,
    twitter: String,
    github: String,
    telegram: String,
    discord: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EtherscanSourceCode {
    #[serde(rename = "SourceCode")]
    source_code: String,
    #[serde(rename = "ABI")]
    abi: String,
    #[serde(rename = "ContractName")]
    contract_name: String,
    #[serde(rename = "CompilerVersion")]
    compiler_version: String,
    #[serde(rename = "OptimizationUsed")]
    optimization_used: String,
    #[serde(rename = "Runs")]
    runs: String,
    #[serde(rename = "ConstructorArguments")]
    constructor_arguments: String,
    #[serde(rename = "EVMVersion")]
    evm_version: String,
    #[serde(rename = "Library")]
    library: String,
    #[serde(rename = "LicenseType")]
    license_type: String,
    #[serde(rename = "Proxy")]
    proxy: String,
    #[serde(rename = "Implementation")]
    implementation: String,
    #[serde(rename = "SwarmSource")]
    swarm_source: String,
}

fn envelope_ok(response: &HttpResponse) -> Result<bool, SourceError> {
    let envelope: EtherscanStatus = decode_body(PROVIDER, response)?;
    Ok(envelope.status == SUCCESS_STATUS)
}

/// Checks the envelope status, then decodes `result` into the caller's shape.
fn decode_result<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, SourceError> {
    if !envelope_ok(response)? {
        return Err(upstream_failure(PROVIDER, response));
    }
    let envelope: EtherscanEnvelope<T> = decode_body(PROVIDER, response)?;
    Ok(envelope.result)
}

fn normalize_token_info(raw: EtherscanTokenInfo) -> TokenInfo {
    let decimals = if raw.divisor.trim().is_empty() {
        String::from(UNKNOWN_DECIMALS)
    } else {
        raw.divisor
    };

    TokenInfo {
        name: raw.token_name,
        symbol: raw.symbol,
        decimals,
        token_type: raw.token_type,
        website: raw.website,
        twitter: raw.twitter,
        reddit: raw.reddit,
        telegram: raw.telegram,
        discord: raw.discord,
        github: raw.github,
        description: raw.description,
        ..TokenInfo::default()
    }
}

impl From<EtherscanSourceCode> for SourceCode {
    fn from(raw: EtherscanSourceCode) -> Self {
        Self {
            source_code: raw.source_code,
            abi: raw.abi,
            contract_name: raw.contract_name,
            compiler_version: raw.compiler_version,
            optimization_used: raw.optimization_used,
            runs: raw.runs,
            constructor_arguments: raw.constructor_arguments,
            evm_version: raw.evm_version,
            library: raw.library,
            license_type: raw.license_type,
            proxy: raw.proxy,
            implementation: raw.implementation,
            swarm_source: raw.swarm_source,
        }
    }
}

impl DataSource for EtherscanAdapter {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::block_explorer()
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
            let response = self.call("token", "tokeninfo", address).await?;
            let records: OneOrMany<EtherscanTokenInfo> = decode_result(&response)?;

            records
                .into_vec()
                .into_iter()
                .next()
                .map(normalize_token_info)
                .ok_or_else(|| SourceError::empty_result(PROVIDER, format!("no token info for {address}")))
        })
    }

    fn source_code<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SourceCode>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.call("contract", "getsourcecode", address).await?;
            let records: OneOrMany<EtherscanSourceCode> = decode_result(&response)?;
            Ok(records.into_vec().into_iter().map(SourceCode::from).collect())
        })
    }

    fn abi_data<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.call("contract", "getabi", address).await?;
            decode_result::<String>(&response)
        })
    }

    fn is_verified<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.call("contract", "getabi", address).await?;
            envelope_ok(&response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::RecordingHttpClient;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpError;
    use serde_json::Value;

    const USDT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

    fn address() -> ContractAddress {
        ContractAddress::parse(USDT).expect("valid address")
    }

    fn adapter(client: Arc<RecordingHttpClient>) -> EtherscanAdapter {
        EtherscanAdapter::with_http_client(client, "key-123").with_throttle(RequestThrottle::per_second(100))
    }

    #[tokio::test]
    async fn token_info_builds_module_action_query() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":[{"tokenName":"Tether USD","symbol":"USDT","divisor":"6","tokenType":"ERC20","website":"https://tether.to/","twitter":"https://twitter.com/Tether_to","github":"","totalSupply":"1"}]}"#,
        ]));

        let info = adapter(client.clone())
            .token_info(&address())
            .await
            .expect("token info succeeds");

        assert_eq!(info.name, "Tether USD");
        assert_eq!(info.decimals, "6");
        assert_eq!(info.token_type, "ERC20");
        assert_eq!(info.website, "https://tether.to/");
        assert!(info.discord.is_empty());
        assert!(info.creator.is_empty());

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].params.get("module"), Some(&Value::from("token")));
        assert_eq!(requests[0].params.get("action"), Some(&Value::from("tokeninfo")));
        assert_eq!(requests[0].params.get("address"), Some(&Value::from(USDT)));
        assert_eq!(requests[0].params.get("apikey"), Some(&Value::from("key-123")));
    }

    #[tokio::test]
    async fn token_info_accepts_bare_object_result() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":{"tokenName":"Wrapped BNB","symbol":"WBNB"}}"#,
        ]));

        let info = adapter(client).token_info(&address()).await.expect("succeeds");
        assert_eq!(info.symbol, "WBNB");
        assert_eq!(info.decimals, UNKNOWN_DECIMALS);
    }

    #[tokio::test]
    async fn empty_result_array_is_empty_result_error() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":[]}"#,
        ]));

        let error = adapter(client).token_info(&address()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn failure_status_embeds_raw_response() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#,
        ]));

        let error = adapter(client).token_info(&address()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Upstream);
        assert!(error.message().contains("Invalid API Key"));
        assert!(error.message().contains("NOTOK"));
    }

    #[tokio::test]
    async fn source_code_maps_every_record() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":[{"SourceCode":"pragma solidity ^0.4.17;","ABI":"[]","ContractName":"TetherToken","CompilerVersion":"v0.4.18+commit.9cf6e910","OptimizationUsed":"0","Runs":"200","EVMVersion":"Default","Proxy":"0"}]}"#,
        ]));

        let sources = adapter(client.clone())
            .source_code(&address())
            .await
            .expect("succeeds");

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].contract_name, "TetherToken");
        assert_eq!(sources[0].evm_version, "Default");
        assert!(sources[0].implementation.is_empty());
        assert_eq!(
            client.recorded_requests()[0].params.get("action"),
            Some(&Value::from("getsourcecode"))
        );
    }

    #[tokio::test]
    async fn abi_returns_result_text() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":"[{\"type\":\"function\"}]"}"#,
        ]));

        let abi = adapter(client).abi_data(&address()).await.expect("succeeds");
        assert_eq!(abi, r#"[{"type":"function"}]"#);
    }

    #[tokio::test]
    async fn verification_follows_abi_status() {
        let client = Arc::new(RecordingHttpClient::json(&[
            r#"{"status":"1","message":"OK","result":"[]"}"#,
            r#"{"status":"0","message":"NOTOK","result":"Contract source code not verified"}"#,
        ]));
        let adapter = adapter(client);

        assert!(adapter.is_verified(&address()).await.expect("verified"));
        assert!(!adapter.is_verified(&address()).await.expect("not verified"));
    }

    #[tokio::test]
    async fn transport_error_propagates_unchanged() {
        let client = Arc::new(RecordingHttpClient::with_responses([Err(HttpError::new(
            "connection refused",
        ))]));

        let error = adapter(client).abi_data(&address()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Transport);
        assert!(error.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_dispatch() {
        let client = Arc::new(RecordingHttpClient::default());
        let adapter = EtherscanAdapter::with_http_client(client.clone(), "");

        let error = adapter.token_info(&address()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Misconfigured);
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn market_listing_is_unsupported() {
        let client = Arc::new(RecordingHttpClient::default());
        let error = adapter(client.clone())
            .market_info_for_coin()
            .await
            .expect_err("must fail");

        assert!(error.is_unsupported());
        assert!(client.recorded_requests().is_empty());
    }
}
