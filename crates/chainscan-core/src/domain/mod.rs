//! # Domain Models
//!
//! Canonical types shared by every provider adapter.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TokenInfo`] | Normalized token metadata |
//! | [`MarketInfo`] | Provider-internal coin/platform id and display name |
//! | [`SourceCode`] | Verified contract source from a block explorer |
//! | [`ContractAddress`] | Validated contract address |
//!
//! `TokenInfo` and `MarketInfo` are built fresh per call and never mutated
//! afterwards. Every `TokenInfo` field is a plain string that defaults to empty,
//! so a provider that only knows a subset of fields still yields a valid record.

mod address;
mod models;

pub use address::ContractAddress;
pub use models::{MarketInfo, SourceCode, TokenInfo, UNKNOWN_DECIMALS};
