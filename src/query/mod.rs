//! Cached read queries against the rental contract
//!
//! Each query result stays fresh for a bounded staleness window and is
//! eagerly re-fetched on a fixed background interval, so listings rented
//! by other users show up without any local action. Transient read
//! failures retry with bounded exponential backoff before surfacing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use primitive_types::U256;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::adapter::listing_from_raw;
use crate::config::Config;
use crate::contract::RentalContract;
use crate::error::ClientError;
use crate::models::{Listing, PlatformStats};

/// Staleness / refresh / retry policy for all read queries
#[derive(Debug, Clone, Copy)]
pub struct QuerySettings {
    /// Cached results younger than this are served without a re-fetch
    pub stale_after: Duration,
    /// Background re-fetch interval
    pub refresh_every: Duration,
    /// Total attempts per read before the error surfaces
    pub retry_attempts: u32,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(20),
            refresh_every: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(30),
        }
    }
}

impl QuerySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            stale_after: config.query_stale_after,
            refresh_every: config.query_refresh_every,
            ..Self::default()
        }
    }
}

/// Observable state of one cached query, distinct from an empty result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// No fetch has completed yet
    Loading,
    Ready(T),
    Failed(String),
}

/// One cache slot. `fetched_at` doubles as the invalidation marker:
/// clearing it keeps the last data renderable but forces a re-fetch.
struct Slot<T> {
    state: QueryState<T>,
    fetched_at: Option<Instant>,
}

impl<T: Clone> Slot<T> {
    fn new() -> Self {
        Self {
            state: QueryState::Loading,
            fetched_at: None,
        }
    }

    fn fresh_value(&self, window: Duration) -> Option<T> {
        match (&self.state, self.fetched_at) {
            (QueryState::Ready(data), Some(at)) if at.elapsed() < window => Some(data.clone()),
            _ => None,
        }
    }

    fn mark_ready(&mut self, data: T) {
        self.state = QueryState::Ready(data);
        self.fetched_at = Some(Instant::now());
    }

    fn mark_failed(&mut self, err: &ClientError) {
        self.state = QueryState::Failed(err.to_string());
        self.fetched_at = None;
    }

    fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

/// Read query layer over the external contract
pub struct ListingQueries {
    contract: Arc<dyn RentalContract>,
    settings: QuerySettings,
    all: RwLock<Slot<Vec<Listing>>>,
    by_owner: RwLock<HashMap<String, Slot<Vec<Listing>>>>,
    single: RwLock<HashMap<String, Slot<Listing>>>,
    stats: RwLock<Slot<PlatformStats>>,
}

impl ListingQueries {
    pub fn new(contract: Arc<dyn RentalContract>, settings: QuerySettings) -> Self {
        Self {
            contract,
            settings,
            all: RwLock::new(Slot::new()),
            by_owner: RwLock::new(HashMap::new()),
            single: RwLock::new(HashMap::new()),
            stats: RwLock::new(Slot::new()),
        }
    }

    /// Full mapped listing collection; empty vec when the contract has
    /// no listings yet, never an absent value
    pub async fn all_listings(&self) -> Result<Vec<Listing>, ClientError> {
        if let Some(cached) = self
            .all
            .read()
            .await
            .fresh_value(self.settings.stale_after)
        {
            return Ok(cached);
        }

        let contract = Arc::clone(&self.contract);
        let fetched = self
            .fetch_with_retry("all_listings", || {
                let contract = Arc::clone(&contract);
                async move { contract.all_listings().await }
            })
            .await;

        match fetched {
            Ok(raw) => {
                let listings: Vec<Listing> = raw.into_iter().map(listing_from_raw).collect();
                self.all.write().await.mark_ready(listings.clone());
                Ok(listings)
            }
            Err(err) => {
                self.all.write().await.mark_failed(&err);
                Err(err)
            }
        }
    }

    /// Listings owned by `owner`. Disabled when no address is supplied:
    /// returns empty without touching the contract.
    pub async fn listings_by_owner(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<Listing>, ClientError> {
        let owner = match owner {
            Some(o) => o,
            None => return Ok(Vec::new()),
        };

        {
            let map = self.by_owner.read().await;
            if let Some(cached) = map
                .get(owner)
                .and_then(|slot| slot.fresh_value(self.settings.stale_after))
            {
                return Ok(cached);
            }
        }

        let contract = Arc::clone(&self.contract);
        let owner_arg = owner.to_string();
        let fetched = self
            .fetch_with_retry("listings_by_owner", || {
                let contract = Arc::clone(&contract);
                let owner = owner_arg.clone();
                async move { contract.listings_by_owner(&owner).await }
            })
            .await;

        let mut map = self.by_owner.write().await;
        let slot = map.entry(owner.to_string()).or_insert_with(Slot::new);
        match fetched {
            Ok(raw) => {
                let listings: Vec<Listing> = raw.into_iter().map(listing_from_raw).collect();
                slot.mark_ready(listings.clone());
                Ok(listings)
            }
            Err(err) => {
                slot.mark_failed(&err);
                Err(err)
            }
        }
    }

    /// Single listing by id. Disabled when the id is absent.
    pub async fn listing(&self, id: Option<&str>) -> Result<Option<Listing>, ClientError> {
        let id = match id {
            Some(i) => i,
            None => return Ok(None),
        };
        let id_value = U256::from_dec_str(id)
            .map_err(|_| ClientError::Validation(format!("malformed listing id: {}", id)))?;

        {
            let map = self.single.read().await;
            if let Some(cached) = map
                .get(id)
                .and_then(|slot| slot.fresh_value(self.settings.stale_after))
            {
                return Ok(Some(cached));
            }
        }

        let contract = Arc::clone(&self.contract);
        let fetched = self
            .fetch_with_retry("listing", || {
                let contract = Arc::clone(&contract);
                async move { contract.listing(id_value).await }
            })
            .await;

        let mut map = self.single.write().await;
        let slot = map.entry(id.to_string()).or_insert_with(Slot::new);
        match fetched {
            Ok(raw) => {
                let listing = listing_from_raw(raw);
                slot.mark_ready(listing.clone());
                Ok(Some(listing))
            }
            Err(err) => {
                slot.mark_failed(&err);
                Err(err)
            }
        }
    }

    /// Platform statistics triple, recomputed by the contract on read
    pub async fn platform_stats(&self) -> Result<PlatformStats, ClientError> {
        if let Some(cached) = self
            .stats
            .read()
            .await
            .fresh_value(self.settings.stale_after)
        {
            return Ok(cached);
        }

        let contract = Arc::clone(&self.contract);
        let fetched = self
            .fetch_with_retry("platform_stats", || {
                let contract = Arc::clone(&contract);
                async move { contract.platform_stats().await }
            })
            .await;

        match fetched {
            Ok(raw) => {
                let stats = PlatformStats {
                    total_listings: raw.total_listings.low_u64(),
                    total_rentals: raw.total_rentals.low_u64(),
                    fee_balance: raw.fee_balance,
                };
                self.stats.write().await.mark_ready(stats);
                Ok(stats)
            }
            Err(err) => {
                self.stats.write().await.mark_failed(&err);
                Err(err)
            }
        }
    }

    /// True when `address` is the contract's designated owner; disabled
    /// without an address. This only decides whether to show the fee
    /// collection action; the contract enforces the real check.
    pub async fn is_contract_owner(&self, address: Option<&str>) -> Result<bool, ClientError> {
        let address = match address {
            Some(a) => a,
            None => return Ok(false),
        };
        let contract = Arc::clone(&self.contract);
        let owner = self
            .fetch_with_retry("contract_owner", || {
                let contract = Arc::clone(&contract);
                async move { contract.contract_owner().await }
            })
            .await?;
        Ok(owner.eq_ignore_ascii_case(address))
    }

    /// Snapshot of the all-listings slot without triggering a fetch
    pub async fn snapshot_all(&self) -> QueryState<Vec<Listing>> {
        self.all.read().await.state.clone()
    }

    /// Snapshot of the statistics slot without triggering a fetch
    pub async fn snapshot_stats(&self) -> QueryState<PlatformStats> {
        self.stats.read().await.state.clone()
    }

    /// Drop freshness on every cached result so the next read re-fetches.
    /// Called after a confirmed write; last-known data stays renderable.
    pub async fn invalidate_all(&self) {
        self.all.write().await.invalidate();
        self.stats.write().await.invalidate();
        for slot in self.by_owner.write().await.values_mut() {
            slot.invalidate();
        }
        for slot in self.single.write().await.values_mut() {
            slot.invalidate();
        }
        tracing::debug!("read caches invalidated");
    }

    /// Spawn the background refresh loop. The task is aborted when the
    /// returned handle drops, tying its lifetime to the consuming view.
    pub fn spawn_refresh(self: Arc<Self>) -> RefreshHandle {
        let queries = self;
        let every = queries.settings.refresh_every;
        let handle = tokio::spawn(async move {
            loop {
                sleep(every).await;
                queries.refresh_tick().await;
            }
        });
        RefreshHandle { handle }
    }

    async fn refresh_tick(&self) {
        self.invalidate_all().await;

        if let Err(err) = self.all_listings().await {
            tracing::warn!(error = %err, "background refresh of listings failed");
        }
        if let Err(err) = self.platform_stats().await {
            tracing::warn!(error = %err, "background refresh of stats failed");
        }

        let owners: Vec<String> = self.by_owner.read().await.keys().cloned().collect();
        for owner in owners {
            if let Err(err) = self.listings_by_owner(Some(&owner)).await {
                tracing::warn!(owner = %owner, error = %err, "background refresh of owner listings failed");
            }
        }
        let ids: Vec<String> = self.single.read().await.keys().cloned().collect();
        for id in ids {
            if let Err(err) = self.listing(Some(&id)).await {
                tracing::warn!(id = %id, error = %err, "background refresh of listing failed");
            }
        }
    }

    /// Re-run a read with capped exponential backoff. Only transport
    /// faults are transient; execution errors surface immediately.
    async fn fetch_with_retry<T, F, Fut>(&self, what: &str, fetch: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut delay = self.settings.retry_base_delay;
        let mut attempt = 1;
        loop {
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(err @ ClientError::Transport(_)) if attempt < self.settings.retry_attempts => {
                    tracing::warn!(query = what, attempt, error = %err, "read failed, retrying");
                    sleep(delay).await;
                    delay = (delay * 2).min(self.settings.retry_max_delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Handle to the background refresh task; dropping it cancels the loop
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_match_the_product_policy() {
        let settings = QuerySettings::default();
        assert_eq!(settings.stale_after, Duration::from_secs(20));
        assert_eq!(settings.refresh_every, Duration::from_secs(30));
        assert_eq!(settings.retry_attempts, 3);
    }

    #[test]
    fn test_slot_freshness_window() {
        let mut slot: Slot<u32> = Slot::new();
        assert_eq!(slot.fresh_value(Duration::from_secs(20)), None);

        slot.mark_ready(7);
        assert_eq!(slot.fresh_value(Duration::from_secs(20)), Some(7));

        slot.invalidate();
        assert_eq!(slot.fresh_value(Duration::from_secs(20)), None);
        // Data stays renderable after invalidation
        assert_eq!(slot.state, QueryState::Ready(7));
    }

    #[test]
    fn test_slot_failure_is_distinct_from_loading() {
        let mut slot: Slot<u32> = Slot::new();
        assert_eq!(slot.state, QueryState::Loading);

        slot.mark_failed(&ClientError::Transport("connection refused".to_string()));
        match &slot.state {
            QueryState::Failed(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
