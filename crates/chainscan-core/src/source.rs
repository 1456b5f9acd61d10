use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used for adapter selection and market-map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Etherscan,
    CoinMarketCap,
    CoinGecko,
    Bitquery,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [
        Self::Etherscan,
        Self::CoinMarketCap,
        Self::CoinGecko,
        Self::Bitquery,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Etherscan => "etherscan",
            Self::CoinMarketCap => "coinmarketcap",
            Self::CoinGecko => "coingecko",
            Self::Bitquery => "bitquery",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "etherscan" => Ok(Self::Etherscan),
            "coinmarketcap" => Ok(Self::CoinMarketCap),
            "coingecko" => Ok(Self::CoinGecko),
            "bitquery" => Ok(Self::Bitquery),
            _ => Err(ValidationError::UnknownSource {
                value: value.to_owned(),
            }),
        }
    }
}
