//! Secondary index maintenance
//!
//! Voters carry one composite-key index, `vID~tokensBought`, pairing
//! each voter ID with the token count bought at registration. Entries
//! are staged into the same write batch as the record they mirror, so
//! the index can never point at a missing voter.
//!
//! Attributes are stored as strings, so scan order is lexicographic
//! per attribute, not numeric.

use crate::store::{composite_key, split_composite_key, KeyValueStore, Keyspace, WriteBatch};
use crate::types::{Voter, VoterId};
use crate::{Error, Result};

/// Name of the voter-by-tokens-bought index
pub const VOTER_TOKENS_INDEX: &str = "vID~tokensBought";

/// Sentinel value stored under index keys.
///
/// The key carries all the payload; the value only needs to exist.
pub const INDEX_SENTINEL: [u8; 1] = [0x00];

/// Index key for a voter record
pub fn voter_index_key(voter: &Voter) -> Vec<u8> {
    composite_key(
        VOTER_TOKENS_INDEX,
        &[voter.voter_id.as_str(), &voter.tokens_bought.to_string()],
    )
}

/// Stage the index entry mirroring a voter record
pub fn stage_voter_index_put(batch: &mut WriteBatch, voter: &Voter) {
    batch.stage_put(
        Keyspace::Index,
        voter_index_key(voter),
        INDEX_SENTINEL.to_vec(),
    );
}

/// Stage removal of a voter's index entry
pub fn stage_voter_index_delete(batch: &mut WriteBatch, voter: &Voter) {
    batch.stage_delete(Keyspace::Index, voter_index_key(voter));
}

/// Decode `(voterID, tokensBought)` from an index key
pub fn decode_voter_index_key(key: &[u8]) -> Result<(VoterId, u64)> {
    let (name, attributes) = split_composite_key(key)?;
    if name != VOTER_TOKENS_INDEX || attributes.len() != 2 {
        return Err(Error::Storage(format!(
            "unexpected entry under index {:?}",
            name
        )));
    }

    let tokens_bought = attributes[1].parse::<u64>().map_err(|_| {
        Error::Storage(format!("corrupt index attribute {:?}", attributes[1]))
    })?;

    Ok((VoterId::new(attributes[0].as_str()), tokens_bought))
}

/// All `(voterID, tokensBought)` pairs currently indexed, in key order
pub fn scan_voter_index(store: &dyn KeyValueStore) -> Result<Vec<(VoterId, u64)>> {
    let prefix = composite_key(VOTER_TOKENS_INDEX, &[]);
    let entries = store.scan_prefix(Keyspace::Index, &prefix)?;
    entries
        .iter()
        .map(|(key, _)| decode_voter_index_key(key))
        .collect()
}
