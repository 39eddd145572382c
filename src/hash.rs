//! Hashing primitives and the toy proof-of-work predicate
//!
//! Every hash in the simulation is the lowercase hex encoding of a SHA-256
//! digest over a string preimage. Nothing here is salted, so the same inputs
//! always produce the same hashes.

use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// Number of hex characters kept from a nonce hash.
pub const NONCE_LENGTH: usize = 5;

/// Preimage hashed to produce the hash of
/// [`BlockLink::Empty`](crate::blockchain::BlockLink::Empty).
pub const GENESIS_PREIMAGE: &str = "0";

/// Returns the SHA-256 hash of `input` as a lowercase hex string.
pub fn hash_str(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash of the genesis predecessor.
pub fn genesis_hash() -> String {
    hash_str(GENESIS_PREIMAGE)
}

/// Hash of `amount ++ sender.hash ++ receiver.hash`.
pub fn transaction_hash(tx: &Transaction) -> String {
    hash_str(&format!("{}{}{}", tx.amount, tx.sender.hash, tx.receiver.hash))
}

/// A single proof-of-work attempt for the miner at `miner_index` in the round
/// seeded by `seed`.
pub fn nonce(miner_index: usize, seed: u64) -> String {
    let sum = seed.wrapping_add(miner_index as u64);
    let mut hash = hash_str(&sum.to_string());
    hash.truncate(NONCE_LENGTH);

    hash
}

/// Hash of a block built from `tx`, a parent whose hash is `previous_hash`,
/// and `nonce`.
pub fn block_hash(tx: &Transaction, previous_hash: &str, nonce: &str) -> String {
    hash_str(&format!("{}{}{}", transaction_hash(tx), previous_hash, nonce))
}

/// Toy difficulty: the number of leading `'0'` characters a block hash needs.
///
/// This stands in for real proof-of-work and offers no security. With the
/// default of one leading zero, a single attempt succeeds with probability
/// 1/16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(pub usize);

impl Difficulty {
    /// Returns true iff `hash` starts with the required number of `'0'`s.
    pub fn is_met_by(&self, hash: &str) -> bool {
        hash.len() >= self.0 && hash.chars().take(self.0).all(|c| c == '0')
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(1)
    }
}

/// True iff the first character of `hash` is `'0'`.
#[inline]
pub fn meets_difficulty(hash: &str) -> bool {
    Difficulty::default().is_met_by(hash)
}
