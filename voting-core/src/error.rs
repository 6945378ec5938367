//! Error types for the voting ledger

use thiserror::Error;

/// Voting ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied argument failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity with the same key already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Voter is disabled and cannot vote
    #[error("Voter disabled: {0}")]
    VoterDisabled(String),

    /// Voter lacks the tokens for a transfer
    #[error("Insufficient tokens: {remaining} remaining, {requested} requested")]
    InsufficientTokens {
        /// Tokens left in the voter's budget
        remaining: u64,
        /// Tokens the transfer asked for
        requested: u64,
    },

    /// Internal accounting invariant broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Concurrency error
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable tag for host-facing responses.
    ///
    /// Storage, serialization, and IO failures all surface as
    /// `StoreFailure` so callers never depend on backend internals.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::AlreadyExists(_) => "AlreadyExists",
            Error::NotFound(_) => "NotFound",
            Error::VoterDisabled(_) => "VoterDisabled",
            Error::InsufficientTokens { .. } => "InsufficientTokens",
            Error::InvariantViolation(_) => "InvariantViolation",
            Error::Storage(_) | Error::Serialization(_) | Error::Io(_) => "StoreFailure",
            Error::Config(_) => "Config",
            Error::Concurrency(_) => "Concurrency",
        }
    }
}

impl From<rocksdb::Error> for Error {
    fn from(e: rocksdb::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, Error>;
