//! Provider-owned lookup table from chain/coin name to provider-internal id.
//!
//! A table is *empty* until first use, *fresh* after a refresh, and *stale*
//! once the staleness window has elapsed. [`MarketMap::refresh_if_stale`]
//! holds the write lock across the staleness check, the upstream fetch and
//! the swap, so concurrent callers trigger exactly one refresh and readers only
//! ever see a complete table.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::data_source::SourceError;
use crate::{MarketInfo, ProviderId};

/// Tables older than this are refetched before the next lookup.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct PlatformTable {
    entries: HashMap<String, MarketInfo>,
    refreshed_at: Instant,
}

impl PlatformTable {
    fn build(markets: Vec<MarketInfo>) -> Self {
        let entries = markets
            .into_iter()
            .map(|market| (market.name.to_lowercase(), market))
            .collect();
        Self {
            entries,
            refreshed_at: Instant::now(),
        }
    }
}

#[derive(Debug)]
struct MarketMapInner {
    tables: HashMap<ProviderId, PlatformTable>,
    staleness_window: Duration,
}

impl MarketMapInner {
    fn is_stale(&self, provider: ProviderId) -> bool {
        match self.tables.get(&provider) {
            None => true,
            Some(table) => {
                table.entries.is_empty() || table.refreshed_at.elapsed() > self.staleness_window
            }
        }
    }
}

/// Thread-safe market map shared by clones of one adapter.
#[derive(Debug, Clone)]
pub struct MarketMap {
    inner: Arc<RwLock<MarketMapInner>>,
}

impl MarketMap {
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MarketMapInner {
                tables: HashMap::new(),
                staleness_window,
            })),
        }
    }

    /// Looks up `key` (case-insensitive) in the provider's table.
    pub async fn get(&self, provider: ProviderId, key: &str) -> Option<MarketInfo> {
        let inner = self.inner.read().await;
        inner
            .tables
            .get(&provider)
            .and_then(|table| table.entries.get(&key.trim().to_lowercase()))
            .cloned()
    }

    /// Refetches the provider's table when it is empty or stale.
    ///
    /// Returns `Ok(true)` when a refresh happened. On fetch failure the
    /// previous table is left untouched.
    pub async fn refresh_if_stale<F, Fut>(
        &self,
        provider: ProviderId,
        fetch: F,
    ) -> Result<bool, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<MarketInfo>, SourceError>>,
    {
        let mut inner = self.inner.write().await;
        if !inner.is_stale(provider) {
            return Ok(false);
        }

        let markets = fetch().await?;
        let table = PlatformTable::build(markets);
        tracing::info!(
            provider = %provider,
            entries = table.entries.len(),
            "market map refreshed"
        );
        inner.tables.insert(provider, table);
        Ok(true)
    }
}

impl Default for MarketMap {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_WINDOW)
    }
}
