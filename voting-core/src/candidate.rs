//! Candidate registration and tallies
//!
//! Candidates carry no secondary index, so their writes are plain
//! single-key operations. The tally itself is only ever mutated by the
//! transfer engine.

use crate::store::{KeyValueStore, Keyspace, WriteBatch};
use crate::types::{Candidate, CandidateId};
use crate::{validate, Error, Result};
use std::sync::Arc;

/// Candidate-side operations on the ledger
#[derive(Clone)]
pub struct CandidateLedger {
    store: Arc<dyn KeyValueStore>,
}

impl CandidateLedger {
    /// Create a ledger view over the given store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Register a new candidate with an empty tally
    pub fn create(&self, id: &str, name: &str) -> Result<()> {
        validate::require_arg("candidateID", id)?;
        validate::require_arg("name", name)?;

        let candidate_id = CandidateId::new(id);
        if self.try_get(&candidate_id)?.is_some() {
            return Err(Error::AlreadyExists(format!("candidate {}", candidate_id)));
        }

        let candidate = Candidate::new(candidate_id, name);
        self.put(&candidate)?;

        tracing::info!(
            candidate_id = %candidate.candidate_id,
            name = %candidate.name,
            "Candidate created"
        );

        Ok(())
    }

    /// Read a candidate record
    pub fn read(&self, id: &str) -> Result<Candidate> {
        validate::require_arg("candidateID", id)?;
        self.get(&CandidateId::new(id))
    }

    /// Delete a candidate record.
    ///
    /// A second delete fails with `NotFound`.
    pub fn delete(&self, id: &str) -> Result<()> {
        validate::require_arg("candidateID", id)?;
        let candidate_id = CandidateId::new(id);
        let candidate = self.get(&candidate_id)?;

        self.store
            .delete(Keyspace::Entities, &candidate.record_key())?;

        tracing::info!(candidate_id = %candidate_id, "Candidate deleted");
        Ok(())
    }

    /// Fetch a candidate, failing with `NotFound` when absent
    pub(crate) fn get(&self, candidate_id: &CandidateId) -> Result<Candidate> {
        self.try_get(candidate_id)?
            .ok_or_else(|| Error::NotFound(format!("candidate {}", candidate_id)))
    }

    /// Fetch a candidate if present
    pub(crate) fn try_get(&self, candidate_id: &CandidateId) -> Result<Option<Candidate>> {
        match self
            .store
            .get(Keyspace::Entities, &candidate_id.record_key())?
        {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Overwrite a candidate record in place (single-key write)
    pub(crate) fn put(&self, candidate: &Candidate) -> Result<()> {
        let value = serde_json::to_vec(candidate)?;
        self.store
            .put(Keyspace::Entities, &candidate.record_key(), &value)
    }

    /// Stage a candidate record write into a batch
    pub(crate) fn stage_put(batch: &mut WriteBatch, candidate: &Candidate) -> Result<()> {
        let value = serde_json::to_vec(candidate)?;
        batch.stage_put(Keyspace::Entities, candidate.record_key(), value);
        Ok(())
    }
}
