#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use chainscan_core::{
    new_data_source_with_client, Capability, CapabilitySet, ContractAddress, DataSource,
    DataSourceConfig, ProviderId, SourceErrorKind,
};

use support::{RecordingHttpClient, USDT};

struct ProviderCase {
    id: ProviderId,
    client: Arc<RecordingHttpClient>,
    source: Arc<dyn DataSource>,
    capabilities: CapabilitySet,
}

fn provider_cases() -> Vec<ProviderCase> {
    [
        (ProviderId::Etherscan, CapabilitySet::block_explorer()),
        (ProviderId::CoinGecko, CapabilitySet::market_aggregator()),
        (ProviderId::CoinMarketCap, CapabilitySet::market_aggregator()),
        (ProviderId::Bitquery, CapabilitySet::token_info_only()),
    ]
    .into_iter()
    .map(|(id, capabilities)| {
        let client = Arc::new(RecordingHttpClient::default());
        let config = DataSourceConfig::new("ethereum")
            .with_alias(id.as_str())
            .with_api_key("test-key");
        let source = new_data_source_with_client(&config, client.clone())
            .unwrap_or_else(|error| panic!("provider '{id}' should build: {error}"));
        ProviderCase {
            id,
            client,
            source,
            capabilities,
        }
    })
    .collect()
}

fn address() -> ContractAddress {
    ContractAddress::parse(USDT).expect("valid address")
}

#[test]
fn factory_builds_every_provider_with_expected_capabilities() {
    for case in provider_cases() {
        assert_eq!(case.source.id(), case.id, "provider '{}': id", case.id);
        assert_eq!(
            case.source.capabilities(),
            case.capabilities,
            "provider '{}': capabilities",
            case.id
        );
    }
}

#[tokio::test]
async fn unsupported_capabilities_fail_without_transport_calls() {
    let address = address();

    for case in provider_cases() {
        let source = case.source.as_ref();
        let outcomes = [
            (
                Capability::MarketInfo,
                source.market_info_for_coin().await.err(),
            ),
            (Capability::SourceCode, source.source_code(&address).await.err()),
            (Capability::Abi, source.abi_data(&address).await.err()),
            (Capability::Verification, source.is_verified(&address).await.err()),
        ];

        for (capability, error) in outcomes {
            if case.capabilities.supports(capability) {
                continue;
            }
            let error = error.unwrap_or_else(|| {
                panic!("provider '{}': {capability} should be unsupported", case.id)
            });
            assert_eq!(
                error.kind(),
                SourceErrorKind::Unsupported,
                "provider '{}': {capability}",
                case.id
            );
            assert_eq!(error.code(), "source.unsupported");
        }
    }
}

#[tokio::test]
async fn unsupported_capabilities_never_touch_the_transport() {
    let address = address();

    for case in provider_cases() {
        let source = case.source.as_ref();
        if !case.capabilities.market_info {
            let _ = source.market_info_for_coin().await;
        }
        if !case.capabilities.source_code {
            let _ = source.source_code(&address).await;
        }
        if !case.capabilities.abi {
            let _ = source.abi_data(&address).await;
        }
        if !case.capabilities.verification {
            let _ = source.is_verified(&address).await;
        }

        assert_eq!(
            case.client.request_count(),
            0,
            "provider '{}': no request expected",
            case.id
        );
    }
}

#[tokio::test]
async fn token_info_is_supported_everywhere() {
    for case in provider_cases() {
        assert!(case.capabilities.supports(Capability::TokenInfo));

        let error = case
            .source
            .token_info(&address())
            .await
            .expect_err("recording client has no scripted response");
        assert_ne!(
            error.kind(),
            SourceErrorKind::Unsupported,
            "provider '{}': token info",
            case.id
        );
    }
}
