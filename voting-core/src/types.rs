//! Core types for the voting ledger
//!
//! Two entity kinds live in the ledger:
//! - [`Voter`]: a registered participant holding a token budget
//! - [`Candidate`]: a recipient accumulating transferred tokens
//!
//! Records are stored as JSON. Token counts serialize as decimal
//! strings so host tooling never loses precision on large values,
//! matching the wire format consumed by the reporting stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key tag prefixing voter records in the entities keyspace
pub(crate) const VOTER_TAG: u8 = b'v';

/// Key tag prefixing candidate records in the entities keyspace
pub(crate) const CANDIDATE_TAG: u8 = b'c';

/// Unique voter identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoterId(String);

impl VoterId {
    /// Create a new voter ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this voter's record
    pub fn record_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + self.0.len());
        key.push(VOTER_TAG);
        key.extend_from_slice(self.0.as_bytes());
        key
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique candidate identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(String);

impl CandidateId {
    /// Create a new candidate ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for this candidate's record
    pub fn record_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + self.0.len());
        key.push(CANDIDATE_TAG);
        key.extend_from_slice(self.0.as_bytes());
        key
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered voter and their token budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Voter ID (unique across the ledger)
    #[serde(rename = "voterID")]
    pub voter_id: VoterId,

    /// Tokens purchased at registration (fixed for the voter's lifetime)
    #[serde(rename = "tokensBought", with = "token_count")]
    pub tokens_bought: u64,

    /// Tokens still available for transfers
    #[serde(rename = "tokensRemaining", with = "token_count")]
    pub tokens_remaining: u64,

    /// Tokens spent so far, keyed by candidate
    #[serde(rename = "tokensUsedPerCandidate", with = "token_count_map")]
    pub tokens_used_per_candidate: BTreeMap<CandidateId, u64>,

    /// Whether the voter may still transfer tokens
    pub enabled: bool,
}

impl Voter {
    /// Create a freshly registered voter.
    ///
    /// The full budget is available and the voter starts enabled,
    /// even with a zero budget. A zero-budget voter is disabled on
    /// their first transfer attempt instead.
    pub fn new(voter_id: VoterId, tokens_bought: u64) -> Self {
        Self {
            voter_id,
            tokens_bought,
            tokens_remaining: tokens_bought,
            tokens_used_per_candidate: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Total tokens spent across all candidates
    pub fn tokens_spent(&self) -> u64 {
        self.tokens_used_per_candidate.values().sum()
    }

    /// Storage key for this voter's record
    pub fn record_key(&self) -> Vec<u8> {
        self.voter_id.record_key()
    }
}

/// A candidate accumulating transferred tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate ID (unique across the ledger)
    #[serde(rename = "candidateID")]
    pub candidate_id: CandidateId,

    /// Human-readable display name
    pub name: String,

    /// Running total of tokens received
    #[serde(rename = "votesReceived", with = "token_count")]
    pub votes_received: u64,
}

impl Candidate {
    /// Create a candidate with an empty tally
    pub fn new(candidate_id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            candidate_id,
            name: name.into(),
            votes_received: 0,
        }
    }

    /// Storage key for this candidate's record
    pub fn record_key(&self) -> Vec<u8> {
        self.candidate_id.record_key()
    }
}

/// Serialize a token count as a decimal string
mod token_count {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(de::Error::custom)
    }
}

/// Serialize a per-candidate spend map with string-encoded counts
mod token_count_map {
    use super::CandidateId;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        map: &BTreeMap<CandidateId, u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let as_strings: BTreeMap<&str, String> = map
            .iter()
            .map(|(id, count)| (id.as_str(), count.to_string()))
            .collect();
        as_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<CandidateId, u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(id, count)| {
                let count = count.parse::<u64>().map_err(de::Error::custom)?;
                Ok((CandidateId::new(id), count))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_voter_has_full_budget() {
        let voter = Voter::new(VoterId::new("v1"), 50);
        assert_eq!(voter.tokens_bought, 50);
        assert_eq!(voter.tokens_remaining, 50);
        assert!(voter.tokens_used_per_candidate.is_empty());
        assert!(voter.enabled);
    }

    #[test]
    fn test_zero_budget_voter_starts_enabled() {
        let voter = Voter::new(VoterId::new("v0"), 0);
        assert_eq!(voter.tokens_remaining, 0);
        assert!(voter.enabled);
    }

    #[test]
    fn test_tokens_spent() {
        let mut voter = Voter::new(VoterId::new("v1"), 50);
        voter
            .tokens_used_per_candidate
            .insert(CandidateId::new("c1"), 10);
        voter
            .tokens_used_per_candidate
            .insert(CandidateId::new("c2"), 7);
        assert_eq!(voter.tokens_spent(), 17);
    }

    #[test]
    fn test_voter_json_field_names() {
        let mut voter = Voter::new(VoterId::new("v1"), 50);
        voter.tokens_remaining = 40;
        voter
            .tokens_used_per_candidate
            .insert(CandidateId::new("c1"), 10);

        let value = serde_json::to_value(&voter).unwrap();
        assert_eq!(value["voterID"], "v1");
        assert_eq!(value["tokensBought"], "50");
        assert_eq!(value["tokensRemaining"], "40");
        assert_eq!(value["tokensUsedPerCandidate"]["c1"], "10");
        assert_eq!(value["enabled"], true);
    }

    #[test]
    fn test_voter_json_round_trip() {
        let mut voter = Voter::new(VoterId::new("v1"), 100);
        voter.tokens_remaining = 60;
        voter
            .tokens_used_per_candidate
            .insert(CandidateId::new("c1"), 25);
        voter
            .tokens_used_per_candidate
            .insert(CandidateId::new("c2"), 15);
        voter.enabled = false;

        let encoded = serde_json::to_vec(&voter).unwrap();
        let decoded: Voter = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, voter);
    }

    #[test]
    fn test_candidate_json_field_names() {
        let mut candidate = Candidate::new(CandidateId::new("c1"), "North Ward");
        candidate.votes_received = 12;

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["candidateID"], "c1");
        assert_eq!(value["name"], "North Ward");
        assert_eq!(value["votesReceived"], "12");
    }

    #[test]
    fn test_token_count_rejects_non_numeric() {
        let raw = r#"{"candidateID":"c1","name":"X","votesReceived":"12x"}"#;
        let result: std::result::Result<Candidate, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_keys_are_tagged() {
        let voter_key = VoterId::new("v1").record_key();
        assert_eq!(voter_key[0], b'v');
        assert_eq!(&voter_key[1..], b"v1");

        let candidate_key = CandidateId::new("c1").record_key();
        assert_eq!(candidate_key[0], b'c');
        assert_eq!(&candidate_key[1..], b"c1");
    }

    #[test]
    fn test_large_counts_survive_string_encoding() {
        let mut candidate = Candidate::new(CandidateId::new("c1"), "X");
        candidate.votes_received = u64::MAX;

        let encoded = serde_json::to_vec(&candidate).unwrap();
        let decoded: Candidate = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded.votes_received, u64::MAX);
    }
}
