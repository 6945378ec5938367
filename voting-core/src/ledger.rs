//! Main ledger orchestration layer
//!
//! This module ties together storage, the entity ledgers, and the
//! actor into a high-level API for voting operations.
//!
//! # Example
//!
//! ```no_run
//! use voting_core::{Config, VotingLedger};
//!
//! #[tokio::main]
//! async fn main() -> voting_core::Result<()> {
//!     let config = Config::default();
//!     let ledger = VotingLedger::open(config).await?;
//!
//!     ledger.create_voter("voter-1", "100").await?;
//!     ledger.create_candidate("cand-1", "Alice").await?;
//!     ledger.transfer_vote("voter-1", "cand-1", "25").await?;
//!
//!     ledger.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    store::KeyValueStore,
    types::{Candidate, Voter},
    Config, Result, RocksStore,
};
use std::sync::Arc;

/// Main voting ledger interface
pub struct VotingLedger {
    /// Actor handle for async operations
    handle: LedgerHandle,

    /// Shared store (for out-of-band inspection)
    store: Arc<dyn KeyValueStore>,

    /// Configuration
    config: Config,
}

impl VotingLedger {
    /// Open ledger with configuration
    pub async fn open(config: Config) -> Result<Self> {
        let rocks = RocksStore::open(&config)?;

        let stats = rocks.stats()?;
        tracing::info!(
            entities = stats.entities,
            index_entries = stats.index_entries,
            "Opened voting ledger"
        );

        let store: Arc<dyn KeyValueStore> = Arc::new(rocks);
        let handle = spawn_ledger_actor(store.clone(), config.channel_capacity);

        Ok(Self {
            handle,
            store,
            config,
        })
    }

    /// Build a ledger over an already-open store
    ///
    /// Used for in-memory deployments and tests. Must be called from
    /// within a Tokio runtime.
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: Config) -> Self {
        let handle = spawn_ledger_actor(store.clone(), config.channel_capacity);

        Self {
            handle,
            store,
            config,
        }
    }

    /// Register a voter with a token budget
    pub async fn create_voter(&self, id: &str, tokens_bought: &str) -> Result<()> {
        self.handle.create_voter(id, tokens_bought).await
    }

    /// Read a voter record
    pub async fn read_voter(&self, id: &str) -> Result<Voter> {
        self.handle.read_voter(id).await
    }

    /// Disable a voter whose budget is spent
    pub async fn disable_voter(&self, id: &str) -> Result<()> {
        self.handle.disable_voter(id).await
    }

    /// Delete a voter and its index entry
    pub async fn delete_voter(&self, id: &str) -> Result<()> {
        self.handle.delete_voter(id).await
    }

    /// Read a contiguous range of voters by ID
    ///
    /// Empty bounds are open on that side.
    pub async fn read_voter_range(&self, start_id: &str, end_id: &str) -> Result<Vec<Voter>> {
        self.handle.read_voter_range(start_id, end_id).await
    }

    /// Register a candidate
    pub async fn create_candidate(&self, id: &str, name: &str) -> Result<()> {
        self.handle.create_candidate(id, name).await
    }

    /// Read a candidate record
    pub async fn read_candidate(&self, id: &str) -> Result<Candidate> {
        self.handle.read_candidate(id).await
    }

    /// Delete a candidate
    pub async fn delete_candidate(&self, id: &str) -> Result<()> {
        self.handle.delete_candidate(id).await
    }

    /// Transfer voting tokens from a voter to a candidate
    pub async fn transfer_vote(
        &self,
        voter_id: &str,
        candidate_id: &str,
        amount: &str,
    ) -> Result<()> {
        self.handle.transfer_vote(voter_id, candidate_id, amount).await
    }

    /// Shared store handle
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown ledger
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}
