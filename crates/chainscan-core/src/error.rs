use thiserror::Error;

/// Validation and contract errors exposed by `chainscan-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("contract address cannot be empty")]
    EmptyAddress,
    #[error("contract address length {len} exceeds max {max}")]
    AddressTooLong { len: usize, max: usize },
    #[error("contract address contains invalid character '{ch}' at index {index}")]
    AddressInvalidChar { ch: char, index: usize },

    #[error("unknown data source '{value}', expected one of etherscan, coinmarketcap, coingecko, bitquery")]
    UnknownSource { value: String },

    #[error("throughput must be an integer, got '{value}'")]
    InvalidThroughput { value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
