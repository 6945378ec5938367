//! TokenVote Voting Core
//!
//! Token-weighted voting ledger over an embedded key-value store.
//!
//! # Architecture
//!
//! - **Entity ledgers**: Voters and candidates stored as field-tagged JSON records
//! - **Single writer**: One actor task serializes every read-modify-write
//! - **Atomic transfers**: Voter and candidate mutate in one write batch
//! - **Range queries**: Record keys for ID ranges, a composite index for budgets
//!
//! # Invariants
//!
//! - Token conservation: tokensRemaining + Σ(tokensUsedPerCandidate) == tokensBought
//! - Tally consistency: votesReceived equals the sum of transfers targeting it
//! - Auto-disable: a voter whose budget reaches zero is permanently disabled

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod candidate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod ledger;
pub mod metrics;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod types;
pub mod validate;
pub mod voter;

// Re-exports
pub use config::Config;
pub use dispatch::{Dispatcher, Request, Response};
pub use error::{Error, Result};
pub use ledger::VotingLedger;
pub use metrics::Metrics;
pub use storage::RocksStore;
pub use store::{KeyValueStore, MemoryStore, WriteBatch};
pub use types::{Candidate, CandidateId, Voter, VoterId};
