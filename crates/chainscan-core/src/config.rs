use std::env;

use serde::{Deserialize, Serialize};

use crate::throttling::DEFAULT_REQUESTS_PER_SECOND;
use crate::{CoreError, ProviderId, ValidationError};

pub const ENV_SOURCE: &str = "CHAINSCAN_SOURCE";
pub const ENV_ALIAS: &str = "CHAINSCAN_ALIAS";
pub const ENV_URL: &str = "CHAINSCAN_URL";
pub const ENV_API_KEY: &str = "CHAINSCAN_API_KEY";
pub const ENV_TPS: &str = "CHAINSCAN_TPS";

/// Everything the factory needs to build one data source.
///
/// `alias` names the provider (`etherscan`, `coingecko`, ...) when set;
/// otherwise `source` doubles as the provider name. `source` is always handed
/// to the adapter as its chain/platform name.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub source: String,
    pub alias: String,
    pub url: String,
    pub api_key: String,
    pub throughput_per_second: i64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            alias: String::new(),
            url: String::new(),
            api_key: String::new(),
            throughput_per_second: i64::from(DEFAULT_REQUESTS_PER_SECOND),
        }
    }
}

impl DataSourceConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_throughput(mut self, per_second: i64) -> Self {
        self.throughput_per_second = per_second;
        self
    }

    /// Reads `CHAINSCAN_*` variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(source) = lookup(ENV_SOURCE) {
            config.source = source.trim().to_owned();
        }
        if let Some(alias) = lookup(ENV_ALIAS) {
            config.alias = alias.trim().to_owned();
        }
        if let Some(url) = lookup(ENV_URL) {
            config.url = url.trim().to_owned();
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            config.api_key = api_key.trim().to_owned();
        }
        if let Some(raw) = lookup(ENV_TPS).filter(|raw| !raw.trim().is_empty()) {
            config.throughput_per_second = parse_throughput(&raw)?;
        }
        Ok(config)
    }

    /// Provider name used for adapter selection.
    pub fn provider_name(&self) -> &str {
        if self.alias.trim().is_empty() {
            self.source.trim()
        } else {
            self.alias.trim()
        }
    }
}

impl std::fmt::Debug for DataSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceConfig")
            .field("source", &self.source)
            .field("alias", &self.alias)
            .field("url", &self.url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("throughput_per_second", &self.throughput_per_second)
            .finish()
    }
}

/// Key for an adapter built through `Default`: `CHAINSCAN_<PROVIDER>_API_KEY`,
/// then `CHAINSCAN_API_KEY`, then empty.
pub fn provider_api_key(provider: ProviderId) -> String {
    provider_api_key_from_lookup(provider, |name| env::var(name).ok())
}

pub fn provider_api_key_from_lookup<F>(provider: ProviderId, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let specific = format!(
        "CHAINSCAN_{}_API_KEY",
        provider.as_str().to_ascii_uppercase()
    );
    let key = [specific.as_str(), ENV_API_KEY]
        .into_iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
        .unwrap_or_default();
    key
}

pub fn parse_throughput(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidThroughput {
            value: raw.to_owned(),
        })
}
