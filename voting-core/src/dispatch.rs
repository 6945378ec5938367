//! Operation dispatch for the host boundary
//!
//! Requests arrive as an operation name plus positional string
//! arguments, mirroring the invocation model of the hosting runtime.
//! The dispatcher validates argument counts, routes to the ledger,
//! and shapes every outcome into a tagged [`Response`] so callers can
//! branch on `status` without knowing the error taxonomy internals.

use crate::{metrics::Metrics, types::{Candidate, Voter}, Error, Result, VotingLedger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Register a voter
pub const OP_CREATE_VOTER: &str = "CreateVoter";
/// Read a voter record
pub const OP_READ_VOTER: &str = "ReadVoter";
/// Disable an exhausted voter
pub const OP_DISABLE_VOTER: &str = "DisableVoter";
/// Delete a voter
pub const OP_DELETE_VOTER: &str = "DeleteVoter";
/// Read a contiguous range of voters
pub const OP_READ_VOTER_RANGE: &str = "ReadVoterRange";
/// Register a candidate
pub const OP_CREATE_CANDIDATE: &str = "CreateCandidate";
/// Read a candidate record
pub const OP_READ_CANDIDATE: &str = "ReadCandidate";
/// Delete a candidate
pub const OP_DELETE_CANDIDATE: &str = "DeleteCandidate";
/// Move tokens from a voter to a candidate
pub const OP_TRANSFER_VOTE: &str = "TransferVote";

/// An operation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Operation name
    pub op: String,

    /// Positional string arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// An operation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "camelCase")]
pub enum Response {
    /// Operation succeeded with no payload
    Ack,

    /// A voter record
    Voter(Voter),

    /// A candidate record
    Candidate(Candidate),

    /// A list of voter records
    Voters(Vec<Voter>),

    /// Operation failed
    Error {
        /// Stable failure kind from the error taxonomy
        kind: String,
        /// Human-readable detail
        message: String,
    },
}

impl From<Error> for Response {
    fn from(err: Error) -> Self {
        Response::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Routes requests to the ledger and records per-operation metrics
pub struct Dispatcher {
    ledger: VotingLedger,
    metrics: Arc<Metrics>,
}

impl Dispatcher {
    /// Create a dispatcher over an open ledger
    pub fn new(ledger: VotingLedger, metrics: Arc<Metrics>) -> Self {
        Self { ledger, metrics }
    }

    /// Dispatch a request and shape the outcome into a response
    pub async fn dispatch(&self, request: Request) -> Response {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        tracing::debug!(
            request_id = %request_id,
            op = %request.op,
            args = request.args.len(),
            "Dispatching operation"
        );

        let response = match self.route(&request).await {
            Ok(response) => response,
            Err(err) => Response::from(err),
        };

        let outcome = match &response {
            Response::Error { kind, .. } => kind.as_str(),
            _ => "ok",
        };
        self.metrics
            .record_request(&request.op, outcome, started.elapsed().as_secs_f64());

        if let Response::Error { kind, message } = &response {
            tracing::warn!(
                request_id = %request_id,
                op = %request.op,
                kind = %kind,
                "Operation failed: {}",
                message
            );
        }

        response
    }

    /// Dispatch a JSON-encoded request line, returning a JSON response
    pub async fn dispatch_json(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => Response::Error {
                kind: "InvalidArgument".to_string(),
                message: format!("Malformed request: {}", err),
            },
        };

        serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"status":"error","body":{"kind":"StoreFailure","message":"response serialization failed"}}"#
                .to_string()
        })
    }

    async fn route(&self, request: &Request) -> Result<Response> {
        let args = &request.args;

        match request.op.as_str() {
            OP_CREATE_VOTER => {
                expect_args(args, 2)?;
                self.ledger.create_voter(&args[0], &args[1]).await?;
                Ok(Response::Ack)
            }

            OP_READ_VOTER => {
                expect_args(args, 1)?;
                let voter = self.ledger.read_voter(&args[0]).await?;
                Ok(Response::Voter(voter))
            }

            OP_DISABLE_VOTER => {
                expect_args(args, 1)?;
                self.ledger.disable_voter(&args[0]).await?;
                Ok(Response::Ack)
            }

            OP_DELETE_VOTER => {
                expect_args(args, 1)?;
                self.ledger.delete_voter(&args[0]).await?;
                Ok(Response::Ack)
            }

            OP_READ_VOTER_RANGE => {
                expect_args(args, 2)?;
                let voters = self.ledger.read_voter_range(&args[0], &args[1]).await?;
                Ok(Response::Voters(voters))
            }

            OP_CREATE_CANDIDATE => {
                expect_args(args, 2)?;
                self.ledger.create_candidate(&args[0], &args[1]).await?;
                Ok(Response::Ack)
            }

            OP_READ_CANDIDATE => {
                expect_args(args, 1)?;
                let candidate = self.ledger.read_candidate(&args[0]).await?;
                Ok(Response::Candidate(candidate))
            }

            OP_DELETE_CANDIDATE => {
                expect_args(args, 1)?;
                self.ledger.delete_candidate(&args[0]).await?;
                Ok(Response::Ack)
            }

            OP_TRANSFER_VOTE => {
                expect_args(args, 3)?;
                self.ledger
                    .transfer_vote(&args[0], &args[1], &args[2])
                    .await?;

                // Amount already validated by the transfer engine.
                if let Ok(amount) = args[2].parse::<u64>() {
                    self.metrics.record_transfer(amount);
                }
                Ok(Response::Ack)
            }

            unknown => Err(Error::InvalidArgument(format!(
                "Unknown operation: {}",
                unknown
            ))),
        }
    }

    /// Shutdown the underlying ledger
    pub async fn shutdown(self) -> Result<()> {
        self.ledger.shutdown().await
    }
}

fn expect_args(args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(Error::InvalidArgument(format!(
            "Incorrect number of arguments. Expecting {}",
            expected
        )));
    }
    Ok(())
}
