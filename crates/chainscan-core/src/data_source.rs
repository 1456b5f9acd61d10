//! Data source trait and error taxonomy.
//!
//! This module defines the capability contract (`DataSource`) every provider
//! adapter implements, along with the structured error returned by all of its
//! operations.
//!
//! # Capabilities
//!
//! | Capability | Method | Response |
//! |------------|--------|----------|
//! | Market listing | [`DataSource::market_info_for_coin`] | `Vec<MarketInfo>` |
//! | Token info | [`DataSource::token_info`] | [`TokenInfo`] |
//! | Source code | [`DataSource::source_code`] | `Vec<SourceCode>` |
//! | ABI | [`DataSource::abi_data`] | ABI JSON text |
//! | Verification | [`DataSource::is_verified`] | `bool` |
//!
//! A provider that does not offer a capability returns
//! [`SourceErrorKind::Unsupported`] without sending anything upstream, so
//! callers can treat it as a normal outcome:
//!
//! ```rust,ignore
//! use chainscan_core::{ContractAddress, DataSource};
//!
//! async fn abi_if_available(
//!     source: &dyn DataSource,
//!     address: &ContractAddress,
//! ) -> Result<Option<String>, chainscan_core::SourceError> {
//!     match source.abi_data(address).await {
//!         Ok(abi) => Ok(Some(abi)),
//!         Err(error) if error.is_unsupported() => Ok(None),
//!         Err(error) => Err(error),
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::http_client::HttpError;
use crate::{ContractAddress, MarketInfo, ProviderId, SourceCode, TokenInfo, ValidationError};

/// Operation offered by a provider, used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    MarketInfo,
    TokenInfo,
    SourceCode,
    Abi,
    Verification,
}

impl Capability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketInfo => "market_info",
            Self::TokenInfo => "token_info",
            Self::SourceCode => "source_code",
            Self::Abi => "abi",
            Self::Verification => "verification",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported capability matrix for a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub market_info: bool,
    pub token_info: bool,
    pub source_code: bool,
    pub abi: bool,
    pub verification: bool,
}

impl CapabilitySet {
    pub const fn new(
        market_info: bool,
        token_info: bool,
        source_code: bool,
        abi: bool,
        verification: bool,
    ) -> Self {
        Self {
            market_info,
            token_info,
            source_code,
            abi,
            verification,
        }
    }

    /// Token info, source code, ABI and verification; no market listing.
    pub const fn block_explorer() -> Self {
        Self::new(false, true, true, true, true)
    }

    /// Market listing and token info only.
    pub const fn market_aggregator() -> Self {
        Self::new(true, true, false, false, false)
    }

    pub const fn token_info_only() -> Self {
        Self::new(false, true, false, false, false)
    }

    pub const fn supports(self, capability: Capability) -> bool {
        match capability {
            Capability::MarketInfo => self.market_info,
            Capability::TokenInfo => self.token_info,
            Capability::SourceCode => self.source_code,
            Capability::Abi => self.abi,
            Capability::Verification => self.verification,
        }
    }

    pub fn supported(self) -> Vec<&'static str> {
        [
            Capability::MarketInfo,
            Capability::TokenInfo,
            Capability::SourceCode,
            Capability::Abi,
            Capability::Verification,
        ]
        .into_iter()
        .filter(|capability| self.supports(*capability))
        .map(Capability::as_str)
        .collect()
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Base URL or API key missing; nothing was sent.
    Misconfigured,
    /// The provider does not offer this capability.
    Unsupported,
    /// Network/HTTP layer failure, message passed through unchanged.
    Transport,
    /// Response body did not match the expected schema.
    Decode,
    /// Upstream envelope reported a failure status.
    Upstream,
    /// Request succeeded but yielded no matching record.
    EmptyResult,
    /// Factory was asked for a platform it does not know.
    UnknownSource,
    InvalidRequest,
}

/// Structured error returned by every data source operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn misconfigured(provider: ProviderId, missing: &str) -> Self {
        Self::new(
            SourceErrorKind::Misconfigured,
            format!("config mismatched for {provider}: {missing} is required"),
        )
    }

    pub fn unsupported(provider: ProviderId, capability: Capability) -> Self {
        Self::new(
            SourceErrorKind::Unsupported,
            format!("capability '{capability}' is not supported by {provider}"),
        )
    }

    pub fn transport(provider: ProviderId, error: &HttpError) -> Self {
        Self::new(
            SourceErrorKind::Transport,
            format!("{provider} transport error: {}", error.message()),
        )
    }

    pub fn decode(provider: ProviderId, error: &serde_json::Error) -> Self {
        Self::new(
            SourceErrorKind::Decode,
            format!("failed to decode {provider} response: {error}"),
        )
    }

    /// Upstream failure; `raw` is the response body, kept for diagnostics.
    pub fn upstream(provider: ProviderId, raw: &str) -> Self {
        Self::new(
            SourceErrorKind::Upstream,
            format!("request service error for {provider}, {raw}"),
        )
    }

    pub fn empty_result(provider: ProviderId, detail: impl Display) -> Self {
        Self::new(
            SourceErrorKind::EmptyResult,
            format!("no data from {provider}: {detail}"),
        )
    }

    pub fn unknown_source(value: &str) -> Self {
        Self::new(
            SourceErrorKind::UnknownSource,
            format!("unknown data source '{value}'"),
        )
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_unsupported(&self) -> bool {
        matches!(self.kind, SourceErrorKind::Unsupported)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Misconfigured => "source.misconfigured",
            SourceErrorKind::Unsupported => "source.unsupported",
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::EmptyResult => "source.empty_result",
            SourceErrorKind::UnknownSource => "source.unknown_source",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::UnknownSource { value } => Self::unknown_source(&value),
            other => Self::invalid_request(other.to_string()),
        }
    }
}

/// Source adapter contract.
///
/// # Required Methods
///
/// | Method | Description |
/// |--------|-------------|
/// | [`id`](DataSource::id) | Provider identifier |
/// | [`capabilities`](DataSource::capabilities) | Supported operations |
/// | [`market_info_for_coin`](DataSource::market_info_for_coin) | Coin/platform listing |
/// | [`token_info`](DataSource::token_info) | Normalized token metadata |
/// | [`source_code`](DataSource::source_code) | Verified contract sources |
/// | [`abi_data`](DataSource::abi_data) | Contract ABI text |
/// | [`is_verified`](DataSource::is_verified) | Whether the contract is verified |
///
/// Every supported operation waits on the adapter's throttle before it
/// dispatches, and no operation retries.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance is meant to be shared
/// across many lookups.
pub trait DataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> CapabilitySet;

    /// Lists the provider's coins or platforms with their internal ids.
    fn market_info_for_coin<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketInfo>, SourceError>> + Send + 'a>>;

    /// Fetches and normalizes token metadata for one contract.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the adapter is misconfigured, the transport
    /// fails, the body cannot be decoded, the upstream reports a failure, or no
    /// record matches.
    fn token_info<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<TokenInfo, SourceError>> + Send + 'a>>;

    fn source_code<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SourceCode>, SourceError>> + Send + 'a>>;

    fn abi_data<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>>;

    /// `Ok(false)` means the provider answered and the contract is not verified.
    fn is_verified<'a>(
        &'a self,
        address: &'a ContractAddress,
    ) -> Pin<Box<dyn Future<Output = Result<bool, SourceError>> + Send + 'a>>;
}
