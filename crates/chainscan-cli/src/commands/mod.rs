use chainscan_core::{new_data_source, ContractAddress, DataSource, DataSourceConfig};
use serde_json::{json, Value};

use crate::cli::{Cli, Command, ContractArgs};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = resolve_config(cli)?;
    let source = new_data_source(&config)?;
    tracing::debug!(
        provider = %source.id(),
        source = %config.source,
        "data source ready"
    );

    let data = execute(&cli.command, source.as_ref()).await?;
    Ok(json!({
        "provider": source.id(),
        "source": config.source,
        "data": data,
    }))
}

/// Environment first, then any flag given on the command line.
fn resolve_config(cli: &Cli) -> Result<DataSourceConfig, CliError> {
    let mut config = DataSourceConfig::from_env()?;
    if let Some(source) = &cli.source {
        config.source = source.trim().to_owned();
    }
    if let Some(alias) = &cli.alias {
        config.alias = alias.trim().to_owned();
    }
    if let Some(url) = &cli.url {
        config.url = url.trim().to_owned();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = api_key.trim().to_owned();
    }
    if let Some(tps) = cli.tps {
        config.throughput_per_second = tps;
    }
    Ok(config)
}

pub async fn execute(command: &Command, source: &dyn DataSource) -> Result<Value, CliError> {
    let value = match command {
        Command::TokenInfo(args) => {
            let address = parse_address(args)?;
            serde_json::to_value(source.token_info(&address).await?)?
        }
        Command::SourceCode(args) => {
            let address = parse_address(args)?;
            serde_json::to_value(source.source_code(&address).await?)?
        }
        Command::Abi(args) => {
            let address = parse_address(args)?;
            let abi = source.abi_data(&address).await?;
            json!({ "address": address, "abi": abi })
        }
        Command::Verified(args) => {
            let address = parse_address(args)?;
            let verified = source.is_verified(&address).await?;
            json!({ "address": address, "verified": verified })
        }
        Command::Markets => serde_json::to_value(source.market_info_for_coin().await?)?,
    };
    Ok(value)
}

fn parse_address(args: &ContractArgs) -> Result<ContractAddress, CliError> {
    Ok(ContractAddress::parse(&args.address)?)
}
