mod bitquery;
mod coingecko;
mod coinmarketcap;
mod etherscan;

pub use bitquery::{BitqueryAdapter, DateWindow, DEFAULT_BITQUERY_URL};
pub use coingecko::{CoinGeckoAdapter, DEFAULT_COINGECKO_URL};
pub use coinmarketcap::{CoinMarketCapAdapter, DEFAULT_COINMARKETCAP_URL};
pub use etherscan::{EtherscanAdapter, DEFAULT_ETHERSCAN_URL};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::ProviderId;

/// Fails fast when a required setting is blank.
fn require(provider: ProviderId, setting: &str, name: &str) -> Result<(), SourceError> {
    if setting.trim().is_empty() {
        return Err(SourceError::misconfigured(provider, name));
    }
    Ok(())
}

pub(crate) fn url_or_default(url: &str, default: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        String::from(default)
    } else {
        url.to_owned()
    }
}

async fn dispatch(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<HttpResponse, SourceError> {
    tracing::debug!(provider = %provider, url = %request.url, "sending provider request");
    http_client.execute(request).await.map_err(|error| {
        tracing::warn!(provider = %provider, error = %error, "transport failure");
        SourceError::transport(provider, &error)
    })
}

/// Decodes `response` into `T`, reporting undecodable non-2xx bodies as upstream failures.
fn decode_body<T: DeserializeOwned>(
    provider: ProviderId,
    response: &HttpResponse,
) -> Result<T, SourceError> {
    match serde_json::from_str(&response.body) {
        Ok(decoded) => Ok(decoded),
        Err(_) if !response.is_success() => Err(upstream_failure(provider, response)),
        Err(error) => Err(SourceError::decode(provider, &error)),
    }
}

fn upstream_failure(provider: ProviderId, response: &HttpResponse) -> SourceError {
    tracing::warn!(provider = %provider, status = response.status, "upstream reported failure");
    if response.is_success() {
        SourceError::upstream(provider, &response.body)
    } else {
        SourceError::upstream(
            provider,
            &format!("http status {}: {}", response.status, response.body),
        )
    }
}

/// Upstream payload that is documented as a list but sometimes arrives as a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(values) => values,
            Self::One(value) => vec![value],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Accepts `"123"`, `123` or `null` and yields a string (empty for `null`).
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

fn first_non_empty(values: &[String]) -> String {
    values
        .iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_default()
}
