//! Behavior-driven tests for data provider behavior
//!
//! These tests verify HOW adapters handle sparse upstream payloads, shared
//! market-map refreshes and throttled bursts.

#[path = "support/mod.rs"]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chainscan_core::{
    new_data_source_with_client, BitqueryAdapter, CoinGeckoAdapter, CoinMarketCapAdapter,
    ContractAddress, DataSource, DataSourceConfig, EtherscanAdapter, MarketInfo, MarketMap,
    ProviderId, RequestThrottle, SourceError, UNKNOWN_DECIMALS,
};

use support::{RecordingHttpClient, USDT};

const CG_PLATFORMS: &str = r#"[{"id":"ethereum","name":"Ethereum","shortname":""}]"#;

fn address() -> ContractAddress {
    ContractAddress::parse(USDT).expect("valid address")
}

fn fast() -> RequestThrottle {
    RequestThrottle::per_second(1_000)
}

// =============================================================================
// Normalization: minimal payloads
// =============================================================================

#[tokio::test]
async fn when_explorer_returns_name_only_other_fields_stay_empty() {
    // Given: an explorer answering with a single populated field
    let client = Arc::new(RecordingHttpClient::json(&[
        r#"{"status":"1","message":"OK","result":[{"tokenName":"Only Name"}]}"#,
    ]));
    let adapter = EtherscanAdapter::with_http_client(client, "key").with_throttle(fast());

    // When: token info is requested
    let info = adapter.token_info(&address()).await.expect("succeeds");

    // Then: the populated subset survives and everything else is empty
    assert_eq!(info.name, "Only Name");
    for field in [&info.symbol, &info.website, &info.twitter, &info.github, &info.creator] {
        assert!(field.is_empty());
    }
    assert_eq!(info.decimals, UNKNOWN_DECIMALS);
}

#[tokio::test]
async fn when_aggregator_returns_bare_coin_decimals_are_unknown() {
    // Given: CoinGecko knows the coin but has no platform detail or links
    let client = Arc::new(RecordingHttpClient::json(&[
        CG_PLATFORMS,
        r#"{"name":"Tether","symbol":"usdt"}"#,
    ]));
    let adapter = CoinGeckoAdapter::with_http_client(client, "")
        .with_source("ethereum")
        .with_throttle(fast());

    // When
    let info = adapter.token_info(&address()).await.expect("succeeds");

    // Then: decimals fall back to the placeholder, links stay empty
    assert_eq!(info.symbol, "usdt");
    assert_eq!(info.decimals, UNKNOWN_DECIMALS);
    assert_eq!(info.token_type, "ERC20");
    assert!(info.twitter.is_empty());
    assert!(info.telegram.is_empty());
}

#[tokio::test]
async fn when_cmc_record_has_no_urls_links_stay_empty() {
    let client = Arc::new(RecordingHttpClient::json(&[
        r#"{"status":{"error_code":0},"data":{"825":{"name":"Tether USDt","symbol":"USDT"}}}"#,
    ]));
    let adapter = CoinMarketCapAdapter::with_http_client(client, "key").with_throttle(fast());

    let info = adapter.token_info(&address()).await.expect("succeeds");

    assert_eq!(info.name, "Tether USDt");
    assert_eq!(info.decimals, UNKNOWN_DECIMALS);
    assert!(info.website.is_empty());
    assert!(info.discord.is_empty());
}

#[tokio::test]
async fn when_analytics_returns_deployment_only_metadata_is_empty() {
    let client = Arc::new(RecordingHttpClient::json(&[
        r#"{"data":{"ethereum":{"smartContractCalls":[{"created_tx":"0xabc","created_by":"0xdef"}]}}}"#,
    ]));
    let adapter = BitqueryAdapter::with_http_client(client, "key").with_throttle(fast());

    let info = adapter.token_info(&address()).await.expect("succeeds");

    assert!(info.has_deployment());
    assert_eq!(info.deployed_tx, "0xabc");
    assert!(info.deployed_block.is_empty());
    assert!(info.name.is_empty());
    assert_eq!(info.decimals, UNKNOWN_DECIMALS);
}

// =============================================================================
// Market map: refresh and concurrent readers
// =============================================================================

fn table(version: &str) -> Vec<MarketInfo> {
    vec![
        MarketInfo::new(format!("{version}-eth"), "Ethereum"),
        MarketInfo::new(format!("{version}-bsc"), "BSC"),
        MarketInfo::new(format!("{version}-matic"), format!("Only-{version}")),
    ]
}

#[tokio::test]
async fn readers_during_slow_refresh_see_a_complete_table() {
    // Given: a populated map that has gone stale
    let map = MarketMap::new(Duration::from_millis(30));
    map.refresh_if_stale(ProviderId::CoinGecko, || async { Ok(table("old")) })
        .await
        .expect("initial refresh");
    tokio::time::sleep(Duration::from_millis(50)).await;

    // When: a slow refresh is in flight and readers arrive mid-way
    let refresher = map.clone();
    let refresh = tokio::spawn(async move {
        refresher
            .refresh_if_stale(ProviderId::CoinGecko, || async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(table("new"))
            })
            .await
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let mut readers = Vec::new();
    for _ in 0..8 {
        let reader = map.clone();
        readers.push(tokio::spawn(async move {
            let eth = reader.get(ProviderId::CoinGecko, "ethereum").await;
            let only_new = reader.get(ProviderId::CoinGecko, "only-new").await;
            (eth, only_new)
        }));
    }

    // Then: every reader saw the finished new table, never a mix or a gap
    assert!(refresh.await.expect("task").expect("refresh succeeds"));
    for reader in readers {
        let (eth, only_new) = reader.await.expect("reader task");
        assert_eq!(eth.expect("ethereum present").id, "new-eth");
        assert_eq!(only_new.expect("new-only entry present").id, "new-matic");
    }
    assert!(map.get(ProviderId::CoinGecko, "only-old").await.is_none());
}

#[tokio::test]
async fn concurrent_callers_on_a_stale_map_trigger_one_refresh() {
    let map = MarketMap::default();
    let fetches = Arc::new(AtomicUsize::new(0));

    let mut callers = Vec::new();
    for _ in 0..6 {
        let map = map.clone();
        let fetches = fetches.clone();
        callers.push(tokio::spawn(async move {
            map.refresh_if_stale(ProviderId::CoinMarketCap, || async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, SourceError>(table("v1"))
            })
            .await
        }));
    }
    for caller in callers {
        caller.await.expect("task").expect("refresh succeeds");
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_lookups_share_one_platform_listing() {
    // Given: one adapter shared by three simultaneous lookups
    let detail = r#"{"name":"Tether","symbol":"usdt"}"#;
    let client = Arc::new(
        RecordingHttpClient::json(&[CG_PLATFORMS, detail, detail, detail])
            .with_delay(Duration::from_millis(10)),
    );
    let adapter = CoinGeckoAdapter::with_http_client(client.clone(), "")
        .with_source("ethereum")
        .with_throttle(fast());
    let address = address();

    // When
    let (first, second, third) = tokio::join!(
        adapter.token_info(&address),
        adapter.token_info(&address),
        adapter.token_info(&address),
    );

    // Then: all succeed and the listing endpoint was hit once
    for result in [first, second, third] {
        assert_eq!(result.expect("lookup succeeds").name, "Tether");
    }
    let listings = client
        .recorded_requests()
        .iter()
        .filter(|request| request.url.ends_with("asset_platforms"))
        .count();
    assert_eq!(listings, 1);
}

// =============================================================================
// Throttling
// =============================================================================

#[tokio::test]
async fn burst_beyond_rate_waits_instead_of_failing() {
    // Given: a factory-built explorer limited to 2 requests per second
    let ok = r#"{"status":"1","message":"OK","result":"[]"}"#;
    let client = Arc::new(RecordingHttpClient::json(&[ok, ok, ok, ok]));
    let config = DataSourceConfig::new("ethereum")
        .with_alias("etherscan")
        .with_api_key("key")
        .with_throughput(2);
    let source = new_data_source_with_client(&config, client.clone()).expect("builds");
    let address = address();

    // When: four calls are issued back to back
    let started = Instant::now();
    for _ in 0..4 {
        source.abi_data(&address).await.expect("throttled call still succeeds");
    }

    // Then: the burst was delayed, nothing was dropped
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(client.request_count(), 4);
}

#[tokio::test]
async fn non_positive_throughput_behaves_as_one_per_second() {
    let ok = r#"{"status":"1","message":"OK","result":"[]"}"#;
    let client = Arc::new(RecordingHttpClient::json(&[ok, ok]));
    let config = DataSourceConfig::new("ethereum")
        .with_alias("etherscan")
        .with_api_key("key")
        .with_throughput(0);
    let source = new_data_source_with_client(&config, client).expect("builds");
    let address = address();

    let started = Instant::now();
    source.is_verified(&address).await.expect("first");
    source.is_verified(&address).await.expect("second");

    assert!(started.elapsed() >= Duration::from_millis(900));
}
