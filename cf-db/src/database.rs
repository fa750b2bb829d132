//! Ledger database handle
//!
//! Constructed once at startup and passed to whoever needs it; there is no
//! global instance. [`LedgerDatabase::shutdown`] flushes the store and must
//! be called before the process exits.

use std::sync::Arc;
use tracing::{info, warn};

use cf_core::LedgerResult;

use crate::config::{RetryConfig, StoreConfig};
use crate::error::DbResult;
use crate::retry::RetryPolicy;
use crate::services::{AchievementService, CampaignService, FundingService, UserService};
use crate::store::{open_store, LedgerStore, MemoryLedgerStore};

/// Store handle plus the services built on it
#[derive(Clone)]
pub struct LedgerDatabase {
    store: Arc<dyn LedgerStore>,
    config: StoreConfig,
    pub funding: FundingService,
    pub campaigns: CampaignService,
    pub users: UserService,
    pub achievements: AchievementService,
}

impl LedgerDatabase {
    /// Open the configured store
    pub fn open(config: StoreConfig, retry: &RetryConfig) -> DbResult<Self> {
        let store = open_store(&config)?;
        info!(
            backend = config.backend.as_str(),
            data_dir = %config.data_dir.display(),
            "Ledger store opened"
        );
        Ok(Self::with_store(store, config, retry.policy()))
    }

    /// In-memory database
    pub fn in_memory(retry: RetryPolicy) -> Self {
        Self::with_store(Arc::new(MemoryLedgerStore::new()), StoreConfig::memory(), retry)
    }

    pub fn with_store(store: Arc<dyn LedgerStore>, config: StoreConfig, retry: RetryPolicy) -> Self {
        Self {
            funding: FundingService::new(store.clone(), retry.clone()),
            campaigns: CampaignService::new(store.clone(), retry.clone()),
            users: UserService::new(store.clone(), retry.clone()),
            achievements: AchievementService::new(store.clone(), retry),
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Round trip to the store
    pub async fn health_check(&self) -> LedgerResult<()> {
        self.store.ping().await
    }

    /// Flush buffered writes if configured
    pub async fn shutdown(&self) -> LedgerResult<()> {
        if !self.config.flush_on_shutdown {
            return Ok(());
        }
        match self.store.flush().await {
            Ok(()) => {
                info!("Ledger store flushed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Ledger store flush failed");
                Err(e)
            }
        }
    }
}
