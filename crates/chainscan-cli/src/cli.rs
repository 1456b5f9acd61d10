//! CLI argument definitions for chainscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `token-info` | Normalized token metadata for a contract |
//! | `source-code` | Verified source records (block explorers) |
//! | `abi` | Contract ABI text (block explorers) |
//! | `verified` | Whether the contract source is verified |
//! | `markets` | Provider coin/platform listing |
//!
//! # Global Options
//!
//! Flags override the matching `CHAINSCAN_*` environment variable.
//!
//! | Option | Env | Description |
//! |--------|-----|-------------|
//! | `--source` | `CHAINSCAN_SOURCE` | Chain/platform name, or provider when no alias |
//! | `--alias` | `CHAINSCAN_ALIAS` | Provider name |
//! | `--url` | `CHAINSCAN_URL` | Provider base URL |
//! | `--api-key` | `CHAINSCAN_API_KEY` | Provider API key |
//! | `--tps` | `CHAINSCAN_TPS` | Requests per second |
//! | `--pretty` | | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! chainscan --source bsc --alias coingecko token-info 0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82
//! chainscan --alias etherscan --api-key $KEY verified 0xdAC17F958D2ee523a2206206994597C13D831ec7
//! chainscan --source coinmarketcap --api-key $KEY markets --pretty
//! ```

use clap::{Args, Parser, Subcommand};

/// chainscan - provider-neutral token metadata CLI
#[derive(Debug, Parser)]
#[command(
    name = "chainscan",
    author,
    version,
    about = "Provider-neutral token metadata CLI",
    long_about = "Look up token metadata, verified sources and ABIs through block explorers \
(Etherscan-compatible), market aggregators (CoinGecko, CoinMarketCap) or chain analytics \
(Bitquery) with one normalized JSON output.\n\
\n\
Use 'chainscan <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Chain or platform name (e.g. bsc, ethereum); also selects the provider when no alias is set.
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Provider name: etherscan, coingecko, coinmarketcap or bitquery.
    #[arg(long, global = true)]
    pub alias: Option<String>,

    /// Provider base URL; the provider default is used when omitted.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Provider API key.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Maximum requests per second; zero or negative means one.
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub tps: Option<i64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch normalized token metadata for a contract.
    ///
    /// # Examples
    ///
    ///   chainscan --source bsc --alias coingecko token-info 0x0E09...cE82
    ///   chainscan --source ethereum --alias bitquery token-info 0xdAC1...1ec7
    TokenInfo(ContractArgs),

    /// Fetch verified source code records.
    SourceCode(ContractArgs),

    /// Fetch the contract ABI.
    Abi(ContractArgs),

    /// Report whether the contract source is verified.
    Verified(ContractArgs),

    /// List the provider's coins or platforms with their internal ids.
    Markets,
}

/// Arguments shared by every per-contract command.
#[derive(Debug, Clone, Args)]
pub struct ContractArgs {
    /// Contract address.
    pub address: String,
}
