//! Token transfer engine
//!
//! [`TransferEngine::transfer`] is the one operation that mutates two
//! entities at once: the voter's budget and the candidate's tally.
//! Both records are staged into a single write batch and committed
//! together, so the ledger never shows spent tokens without the
//! matching credited votes.

use crate::candidate::CandidateLedger;
use crate::store::{KeyValueStore, WriteBatch};
use crate::types::{CandidateId, VoterId};
use crate::voter::VoterLedger;
use crate::{validate, Error, Result};
use std::sync::Arc;

/// Moves tokens from voters to candidates
#[derive(Clone)]
pub struct TransferEngine {
    store: Arc<dyn KeyValueStore>,
    voters: VoterLedger,
    candidates: CandidateLedger,
}

impl TransferEngine {
    /// Create an engine sharing a store with the entity ledgers
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            voters: VoterLedger::new(store.clone()),
            candidates: CandidateLedger::new(store.clone()),
            store,
        }
    }

    /// Transfer `amount` tokens from a voter to a candidate.
    ///
    /// A transfer that drains the budget to zero still succeeds and
    /// disables the voter in the same commit. An attempt against an
    /// already drained voter disables it and fails with
    /// `InsufficientTokens`; every later attempt fails `VoterDisabled`.
    pub fn transfer(&self, voter_id: &str, candidate_id: &str, amount: &str) -> Result<()> {
        validate::require_arg("voterID", voter_id)?;
        validate::require_arg("candidateID", candidate_id)?;
        let amount = validate::parse_transfer_amount("amount", amount)?;

        let voter_id = VoterId::new(voter_id);
        let mut voter = self.voters.get(&voter_id)?;
        if !voter.enabled {
            return Err(Error::VoterDisabled(voter_id.to_string()));
        }

        let candidate_id = CandidateId::new(candidate_id);
        let mut candidate = self.candidates.get(&candidate_id)?;

        let remaining = voter.tokens_remaining;
        if remaining == 0 {
            voter.enabled = false;
            self.voters.put(&voter)?;
            tracing::warn!(
                voter_id = %voter_id,
                "Voter exhausted, disabled on transfer attempt"
            );
            return Err(Error::InsufficientTokens {
                remaining: 0,
                requested: amount,
            });
        }

        if remaining < amount {
            return Err(Error::InsufficientTokens {
                remaining,
                requested: amount,
            });
        }

        voter.tokens_remaining = remaining - amount;

        let spent = voter
            .tokens_used_per_candidate
            .entry(candidate_id.clone())
            .or_insert(0);
        *spent = spent.checked_add(amount).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "per-candidate spend overflow for voter {}",
                voter_id
            ))
        })?;

        candidate.votes_received =
            candidate.votes_received.checked_add(amount).ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "vote tally overflow for candidate {}",
                    candidate_id
                ))
            })?;

        // Draining the budget is the auto-disable trigger
        if voter.tokens_remaining == 0 {
            voter.enabled = false;
        }

        // Voter staged before candidate; the batch commits atomically
        let mut batch = WriteBatch::new();
        VoterLedger::stage_put(&mut batch, &voter)?;
        CandidateLedger::stage_put(&mut batch, &candidate)?;
        self.store.apply(batch)?;

        tracing::info!(
            voter_id = %voter_id,
            candidate_id = %candidate_id,
            amount,
            tokens_remaining = voter.tokens_remaining,
            votes_received = candidate.votes_received,
            "Vote transfer committed"
        );

        Ok(())
    }
}
