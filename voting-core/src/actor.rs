//! Actor-based concurrency for the ledger
//!
//! The voting ledger runs behind a single-writer actor: one task owns
//! the store and processes operations one at a time from an mpsc
//! mailbox. Hosts hold a cloneable [`LedgerHandle`] and never touch
//! the store concurrently, so every read-modify-write in the entity
//! ledgers observes the previous operation's writes without locks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Host / Dispatcher                    │
//! │              (many concurrent callers)                │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ LedgerHandle (Clone)
//!                       ▼
//!             mpsc::channel (bounded)
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (single task)                │
//! │    VoterLedger / CandidateLedger / TransferEngine     │
//! │                       │                               │
//! │                       ▼                               │
//! │              KeyValueStore (RocksDB)                  │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::candidate::CandidateLedger;
use crate::store::KeyValueStore;
use crate::transfer::TransferEngine;
use crate::types::{Candidate, Voter};
use crate::voter::VoterLedger;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Register a voter
    CreateVoter {
        id: String,
        tokens_bought: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Read a voter record
    ReadVoter {
        id: String,
        response: oneshot::Sender<Result<Voter>>,
    },

    /// Disable an exhausted voter
    DisableVoter {
        id: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Delete a voter and its index entry
    DeleteVoter {
        id: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Read a contiguous range of voters by ID
    ReadVoterRange {
        start_id: String,
        end_id: String,
        response: oneshot::Sender<Result<Vec<Voter>>>,
    },

    /// Register a candidate
    CreateCandidate {
        id: String,
        name: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Read a candidate record
    ReadCandidate {
        id: String,
        response: oneshot::Sender<Result<Candidate>>,
    },

    /// Delete a candidate
    DeleteCandidate {
        id: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Move tokens from a voter to a candidate
    TransferVote {
        voter_id: String,
        candidate_id: String,
        amount: String,
        response: oneshot::Sender<Result<()>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// Voter operations
    voters: VoterLedger,

    /// Candidate operations
    candidates: CandidateLedger,

    /// Transfer engine
    transfers: TransferEngine,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor over a shared store
    pub fn new(store: Arc<dyn KeyValueStore>, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self {
            voters: VoterLedger::new(store.clone()),
            candidates: CandidateLedger::new(store.clone()),
            transfers: TransferEngine::new(store),
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }

        tracing::debug!("Ledger actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::CreateVoter {
                id,
                tokens_bought,
                response,
            } => {
                let _ = response.send(self.voters.create(&id, &tokens_bought));
            }

            LedgerMessage::ReadVoter { id, response } => {
                let _ = response.send(self.voters.read(&id));
            }

            LedgerMessage::DisableVoter { id, response } => {
                let _ = response.send(self.voters.disable(&id));
            }

            LedgerMessage::DeleteVoter { id, response } => {
                let _ = response.send(self.voters.delete(&id));
            }

            LedgerMessage::ReadVoterRange {
                start_id,
                end_id,
                response,
            } => {
                let _ = response.send(self.voters.read_range(&start_id, &end_id));
            }

            LedgerMessage::CreateCandidate { id, name, response } => {
                let _ = response.send(self.candidates.create(&id, &name));
            }

            LedgerMessage::ReadCandidate { id, response } => {
                let _ = response.send(self.candidates.read(&id));
            }

            LedgerMessage::DeleteCandidate { id, response } => {
                let _ = response.send(self.candidates.delete(&id));
            }

            LedgerMessage::TransferVote {
                voter_id,
                candidate_id,
                amount,
                response,
            } => {
                let _ = response.send(self.transfers.transfer(&voter_id, &candidate_id, &amount));
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Register a voter
    pub async fn create_voter(&self, id: &str, tokens_bought: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::CreateVoter {
                id: id.to_string(),
                tokens_bought: tokens_bought.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Read a voter record
    pub async fn read_voter(&self, id: &str) -> Result<Voter> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::ReadVoter {
                id: id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Disable an exhausted voter
    pub async fn disable_voter(&self, id: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::DisableVoter {
                id: id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Delete a voter and its index entry
    pub async fn delete_voter(&self, id: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::DeleteVoter {
                id: id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Read a contiguous range of voters by ID
    pub async fn read_voter_range(&self, start_id: &str, end_id: &str) -> Result<Vec<Voter>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::ReadVoterRange {
                start_id: start_id.to_string(),
                end_id: end_id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Register a candidate
    pub async fn create_candidate(&self, id: &str, name: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::CreateCandidate {
                id: id.to_string(),
                name: name.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Read a candidate record
    pub async fn read_candidate(&self, id: &str) -> Result<Candidate> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::ReadCandidate {
                id: id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Delete a candidate
    pub async fn delete_candidate(&self, id: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::DeleteCandidate {
                id: id.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Move tokens from a voter to a candidate
    pub async fn transfer_vote(
        &self,
        voter_id: &str,
        candidate_id: &str,
        amount: &str,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::TransferVote {
                voter_id: voter_id.to_string(),
                candidate_id: candidate_id.to_string(),
                amount: amount.to_string(),
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Shutdown actor
    ///
    /// Resolves once the actor has drained its mailbox and released
    /// the store, so the data directory can be reopened immediately.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        self.sender.closed().await;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(
    store: Arc<dyn KeyValueStore>,
    channel_capacity: usize,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(channel_capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(store, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn spawn_test_actor() -> LedgerHandle {
        spawn_ledger_actor(Arc::new(MemoryStore::new()), 64)
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = spawn_test_actor();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_round_trip() {
        let handle = spawn_test_actor();

        handle.create_voter("v1", "100").await.unwrap();
        handle.create_candidate("c1", "Alice").await.unwrap();
        handle.transfer_vote("v1", "c1", "60").await.unwrap();

        let voter = handle.read_voter("v1").await.unwrap();
        assert_eq!(voter.tokens_remaining, 40);

        let candidate = handle.read_candidate("c1").await.unwrap();
        assert_eq!(candidate.votes_received, 60);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_serializes_operations() {
        let handle = spawn_test_actor();

        handle.create_voter("v1", "100").await.unwrap();
        handle.create_candidate("c1", "Alice").await.unwrap();

        // Fire transfers from many cloned handles at once; the actor
        // applies them one at a time.
        let mut tasks = Vec::new();
        for _ in 0..10 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.transfer_vote("v1", "c1", "10").await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let voter = handle.read_voter("v1").await.unwrap();
        assert_eq!(voter.tokens_remaining, 0);
        assert!(!voter.enabled);

        let candidate = handle.read_candidate("c1").await.unwrap();
        assert_eq!(candidate.votes_received, 100);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_propagates_errors() {
        let handle = spawn_test_actor();

        let err = handle.read_voter("v9").await.unwrap_err();
        assert_eq!(err.kind(), "NotFound");

        handle.create_voter("v1", "5").await.unwrap();
        let err = handle.create_voter("v1", "5").await.unwrap_err();
        assert_eq!(err.kind(), "AlreadyExists");

        handle.shutdown().await.unwrap();
    }
}
