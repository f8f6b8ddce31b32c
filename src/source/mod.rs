//! Polymorphic listing data source
//!
//! One capability with two variants selected at startup from
//! configuration: the local fixture store and the live contract path.
//! Both funnel input through the same model validation, so the paths
//! cannot drift apart.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{Config, DataSourceKind};
use crate::contract::{EthPropertyRental, RentalContract, SigningAgent};
use crate::error::ClientError;
use crate::models::{Listing, ListingDraft, PlatformStats, RentalRequest};
use crate::notify::Notifier;
use crate::query::{ListingQueries, QuerySettings, RefreshHandle};
use crate::store::LocalListingStore;
use crate::tx::{TxHandle, WriteService};

/// Live-contract wiring: cached reads plus the write service. The
/// background refresh task lives exactly as long as this source.
pub struct LiveSource {
    pub queries: Arc<ListingQueries>,
    pub writes: WriteService,
    _refresh: RefreshHandle,
}

/// The selected listing data source
pub enum DataSource {
    Local(Arc<RwLock<LocalListingStore>>),
    LiveContract(LiveSource),
}

impl DataSource {
    /// Build the variant named by the configuration
    pub fn from_config(config: &Config, notifier: Notifier, agent: Arc<dyn SigningAgent>) -> Self {
        match config.data_source {
            DataSourceKind::Local => DataSource::Local(Arc::new(RwLock::new(
                LocalListingStore::with_fixtures(notifier),
            ))),
            DataSourceKind::LiveContract => {
                let contract: Arc<dyn RentalContract> =
                    Arc::new(EthPropertyRental::from_config(config, agent));
                Self::live(contract, notifier, QuerySettings::from_config(config))
            }
        }
    }

    /// Wire the live path around any contract implementation
    pub fn live(
        contract: Arc<dyn RentalContract>,
        notifier: Notifier,
        settings: QuerySettings,
    ) -> Self {
        let queries = Arc::new(ListingQueries::new(Arc::clone(&contract), settings));
        let refresh = Arc::clone(&queries).spawn_refresh();
        let writes = WriteService::new(contract, notifier).with_queries(Arc::clone(&queries));
        DataSource::LiveContract(LiveSource {
            queries,
            writes,
            _refresh: refresh,
        })
    }

    /// Full listing collection from whichever variant is active
    pub async fn listings(&self) -> Result<Vec<Listing>, ClientError> {
        match self {
            DataSource::Local(store) => Ok(store.read().await.listings().to_vec()),
            DataSource::LiveContract(live) => live.queries.all_listings().await,
        }
    }

    /// Platform statistics projection
    pub async fn stats(&self) -> Result<PlatformStats, ClientError> {
        match self {
            DataSource::Local(store) => Ok(store.read().await.stats()),
            DataSource::LiveContract(live) => live.queries.platform_stats().await,
        }
    }

    /// Register a listing. The live path returns a lifecycle handle;
    /// the local path applies synchronously and returns `None` (check
    /// the store's recorded error on silent failure).
    pub async fn register(&self, draft: ListingDraft) -> Result<Option<TxHandle>, ClientError> {
        match self {
            DataSource::Local(store) => {
                store.write().await.add(draft);
                Ok(None)
            }
            DataSource::LiveContract(live) => live.writes.register_listing(draft).map(Some),
        }
    }

    /// Rent a listing through whichever variant is active
    pub async fn rent(&self, request: RentalRequest) -> Result<Option<TxHandle>, ClientError> {
        match self {
            DataSource::Local(store) => {
                store.write().await.rent(&request);
                Ok(None)
            }
            DataSource::LiveContract(live) => live.writes.rent_listing_request(request).map(Some),
        }
    }

    /// The local store, when that variant is active
    pub fn local_store(&self) -> Option<Arc<RwLock<LocalListingStore>>> {
        match self {
            DataSource::Local(store) => Some(Arc::clone(store)),
            DataSource::LiveContract(_) => None,
        }
    }
}
