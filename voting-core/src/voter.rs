//! Voter registration and lifecycle
//!
//! All voter records flow through [`VoterLedger`]. Creation and
//! deletion maintain the `vID~tokensBought` index in the same atomic
//! batch as the record itself, so record and index move together.

use crate::index;
use crate::store::{KeyValueStore, Keyspace, WriteBatch};
use crate::types::{Voter, VoterId, VOTER_TAG};
use crate::{validate, Error, Result};
use std::sync::Arc;

/// Voter-side operations on the ledger
#[derive(Clone)]
pub struct VoterLedger {
    store: Arc<dyn KeyValueStore>,
}

impl VoterLedger {
    /// Create a ledger view over the given store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Register a new voter with a token budget.
    ///
    /// `tokens_bought` arrives as a decimal string and may be zero.
    pub fn create(&self, id: &str, tokens_bought: &str) -> Result<()> {
        validate::require_arg("voterID", id)?;
        let tokens_bought = validate::parse_token_count("tokensBought", tokens_bought)?;

        let voter_id = VoterId::new(id);
        if self.try_get(&voter_id)?.is_some() {
            return Err(Error::AlreadyExists(format!("voter {}", voter_id)));
        }

        let voter = Voter::new(voter_id, tokens_bought);

        let mut batch = WriteBatch::new();
        Self::stage_put(&mut batch, &voter)?;
        index::stage_voter_index_put(&mut batch, &voter);
        self.store.apply(batch)?;

        tracing::info!(
            voter_id = %voter.voter_id,
            tokens_bought = voter.tokens_bought,
            "Voter created"
        );

        Ok(())
    }

    /// Read a voter record
    pub fn read(&self, id: &str) -> Result<Voter> {
        validate::require_arg("voterID", id)?;
        self.get(&VoterId::new(id))
    }

    /// Disable an exhausted voter.
    ///
    /// Disabling is only valid once the budget is spent; a voter with
    /// tokens remaining cannot be disabled through this path. Disabling
    /// an already disabled voter succeeds without a write.
    pub fn disable(&self, id: &str) -> Result<()> {
        validate::require_arg("voterID", id)?;
        let voter_id = VoterId::new(id);
        let mut voter = self.get(&voter_id)?;

        if !voter.enabled {
            tracing::debug!(voter_id = %voter_id, "Voter already disabled");
            return Ok(());
        }

        if voter.tokens_remaining > 0 {
            return Err(Error::InvariantViolation(format!(
                "voter {} still has {} tokens remaining",
                voter_id, voter.tokens_remaining
            )));
        }

        voter.enabled = false;
        self.put(&voter)?;

        tracing::info!(voter_id = %voter_id, "Voter disabled");
        Ok(())
    }

    /// Delete a voter and the index entry that mirrors it.
    ///
    /// The record is read back first because the index key embeds
    /// `tokensBought`. A second delete fails with `NotFound`.
    pub fn delete(&self, id: &str) -> Result<()> {
        validate::require_arg("voterID", id)?;
        let voter_id = VoterId::new(id);
        let voter = self.get(&voter_id)?;

        let mut batch = WriteBatch::new();
        batch.stage_delete(Keyspace::Entities, voter.record_key());
        index::stage_voter_index_delete(&mut batch, &voter);
        self.store.apply(batch)?;

        tracing::info!(voter_id = %voter_id, "Voter deleted");
        Ok(())
    }

    /// Read voters with `startID <= voterID < endID`, in ID order.
    ///
    /// Either bound may be empty, which leaves that end of the range
    /// open. An inverted range yields an empty result.
    pub fn read_range(&self, start_id: &str, end_id: &str) -> Result<Vec<Voter>> {
        validate::check_bound("startID", start_id)?;
        validate::check_bound("endID", end_id)?;

        // The record tag bounds the scan to voter records, so an open
        // end never walks into candidate keys.
        let start_key = VoterId::new(start_id).record_key();
        let end_key = if end_id.is_empty() {
            vec![VOTER_TAG + 1]
        } else {
            VoterId::new(end_id).record_key()
        };

        let entries = self
            .store
            .scan_range(Keyspace::Entities, &start_key, &end_key)?;

        let mut voters = Vec::with_capacity(entries.len());
        for (_, value) in entries {
            voters.push(serde_json::from_slice(&value)?);
        }

        tracing::debug!(start_id, end_id, count = voters.len(), "Voter range read");
        Ok(voters)
    }

    /// Fetch a voter, failing with `NotFound` when absent
    pub(crate) fn get(&self, voter_id: &VoterId) -> Result<Voter> {
        self.try_get(voter_id)?
            .ok_or_else(|| Error::NotFound(format!("voter {}", voter_id)))
    }

    /// Fetch a voter if present
    pub(crate) fn try_get(&self, voter_id: &VoterId) -> Result<Option<Voter>> {
        match self.store.get(Keyspace::Entities, &voter_id.record_key())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Overwrite a voter record in place (single-key write)
    pub(crate) fn put(&self, voter: &Voter) -> Result<()> {
        let value = serde_json::to_vec(voter)?;
        self.store
            .put(Keyspace::Entities, &voter.record_key(), &value)
    }

    /// Stage a voter record write into a batch
    pub(crate) fn stage_put(batch: &mut WriteBatch, voter: &Voter) -> Result<()> {
        let value = serde_json::to_vec(voter)?;
        batch.stage_put(Keyspace::Entities, voter.record_key(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::scan_voter_index;
    use crate::store::MemoryStore;

    fn test_ledger() -> (VoterLedger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (VoterLedger::new(store.clone()), store)
    }

    #[test]
    fn test_create_and_read() {
        let (ledger, _store) = test_ledger();

        ledger.create("v1", "50").unwrap();
        let voter = ledger.read("v1").unwrap();

        assert_eq!(voter.voter_id, VoterId::new("v1"));
        assert_eq!(voter.tokens_bought, 50);
        assert_eq!(voter.tokens_remaining, 50);
        assert!(voter.enabled);
        assert!(voter.tokens_used_per_candidate.is_empty());
    }

    #[test]
    fn test_create_duplicate_rejected() {
        let (ledger, store) = test_ledger();

        ledger.create("v1", "50").unwrap();
        let err = ledger.create("v1", "10").unwrap_err();
        assert_eq!(err.kind(), "AlreadyExists");

        // Original record untouched, and no second index entry
        assert_eq!(ledger.read("v1").unwrap().tokens_bought, 50);
        let entries = scan_voter_index(store.as_ref()).unwrap();
        assert_eq!(entries, vec![(VoterId::new("v1"), 50)]);
    }

    #[test]
    fn test_create_writes_index_entry() {
        let (ledger, store) = test_ledger();

        ledger.create("v1", "50").unwrap();
        ledger.create("v2", "30").unwrap();

        let entries = scan_voter_index(store.as_ref()).unwrap();
        assert_eq!(
            entries,
            vec![(VoterId::new("v1"), 50), (VoterId::new("v2"), 30)]
        );
    }

    #[test]
    fn test_create_validates_arguments() {
        let (ledger, _store) = test_ledger();

        assert_eq!(ledger.create("", "50").unwrap_err().kind(), "InvalidArgument");
        assert_eq!(
            ledger.create("v1", "fifty").unwrap_err().kind(),
            "InvalidArgument"
        );
        assert_eq!(
            ledger.create(&"x".repeat(33), "50").unwrap_err().kind(),
            "InvalidArgument"
        );
        assert_eq!(
            ledger.create("v1", "-5").unwrap_err().kind(),
            "InvalidArgument"
        );
    }

    #[test]
    fn test_create_zero_budget() {
        let (ledger, _store) = test_ledger();

        ledger.create("v0", "0").unwrap();
        let voter = ledger.read("v0").unwrap();
        assert_eq!(voter.tokens_remaining, 0);
        assert!(voter.enabled);
    }

    #[test]
    fn test_read_missing() {
        let (ledger, _store) = test_ledger();
        assert_eq!(ledger.read("v9").unwrap_err().kind(), "NotFound");
    }

    #[test]
    fn test_disable_requires_exhaustion() {
        let (ledger, _store) = test_ledger();

        ledger.create("v1", "50").unwrap();
        let err = ledger.disable("v1").unwrap_err();
        assert_eq!(err.kind(), "InvariantViolation");
        assert!(ledger.read("v1").unwrap().enabled);
    }

    #[test]
    fn test_disable_exhausted_voter() {
        let (ledger, _store) = test_ledger();

        ledger.create("v0", "0").unwrap();
        ledger.disable("v0").unwrap();
        assert!(!ledger.read("v0").unwrap().enabled);

        // Second disable is a no-op
        ledger.disable("v0").unwrap();
        assert!(!ledger.read("v0").unwrap().enabled);
    }

    #[test]
    fn test_disable_missing() {
        let (ledger, _store) = test_ledger();
        assert_eq!(ledger.disable("v9").unwrap_err().kind(), "NotFound");
    }

    #[test]
    fn test_delete_removes_record_and_index() {
        let (ledger, store) = test_ledger();

        ledger.create("v1", "50").unwrap();
        ledger.create("v2", "30").unwrap();

        ledger.delete("v1").unwrap();

        assert_eq!(ledger.read("v1").unwrap_err().kind(), "NotFound");
        let entries = scan_voter_index(store.as_ref()).unwrap();
        assert_eq!(entries, vec![(VoterId::new("v2"), 30)]);

        // Deletion is not idempotent
        assert_eq!(ledger.delete("v1").unwrap_err().kind(), "NotFound");
    }

    #[test]
    fn test_read_range() {
        let (ledger, _store) = test_ledger();

        for (id, tokens) in [("v1", "10"), ("v2", "20"), ("v3", "30"), ("v4", "40")] {
            ledger.create(id, tokens).unwrap();
        }

        let voters = ledger.read_range("v2", "v4").unwrap();
        let ids: Vec<&str> = voters.iter().map(|v| v.voter_id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v3"]);
    }

    #[test]
    fn test_read_range_open_bounds() {
        let (ledger, _store) = test_ledger();

        for (id, tokens) in [("v1", "10"), ("v2", "20"), ("v3", "30")] {
            ledger.create(id, tokens).unwrap();
        }

        let all = ledger.read_range("", "").unwrap();
        assert_eq!(all.len(), 3);

        let tail = ledger.read_range("v2", "").unwrap();
        let ids: Vec<&str> = tail.iter().map(|v| v.voter_id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v3"]);

        let head = ledger.read_range("", "v2").unwrap();
        let ids: Vec<&str> = head.iter().map(|v| v.voter_id.as_str()).collect();
        assert_eq!(ids, vec!["v1"]);
    }

    #[test]
    fn test_read_range_skips_candidate_records() {
        let (ledger, store) = test_ledger();

        ledger.create("v1", "10").unwrap();
        // A candidate record sharing the entities keyspace
        let candidate = crate::types::Candidate::new(crate::types::CandidateId::new("zz"), "Z");
        let value = serde_json::to_vec(&candidate).unwrap();
        store
            .put(Keyspace::Entities, &candidate.record_key(), &value)
            .unwrap();

        let all = ledger.read_range("", "").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].voter_id.as_str(), "v1");
    }

    #[test]
    fn test_read_range_inverted_is_empty() {
        let (ledger, _store) = test_ledger();
        ledger.create("v1", "10").unwrap();
        assert!(ledger.read_range("v9", "v1").unwrap().is_empty());
    }
}
