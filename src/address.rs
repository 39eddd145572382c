//! Addresses and the address book

use crate::hash::hash_str;

/// A participant in the simulated economy.
///
/// `balance` is the amount this address holds before any block is mined. The
/// balance at any later point is derived by replaying a chain with
/// [`balance_for`](crate::ledger::balance_for); this field is never updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    /// Human readable label.
    pub name: String,
    /// Stable identifier. Two addresses are the same identity iff their hashes
    /// are equal.
    pub hash: String,
    /// Pre-chain baseline balance.
    pub balance: i64,
}

impl Address {
    pub fn new<N, H>(name: N, hash: H, balance: i64) -> Self
    where
        N: Into<String>,
        H: Into<String>,
    {
        Address { name: name.into(), hash: hash.into(), balance }
    }

    /// Creates an address whose hash is derived once from `seed`.
    pub fn from_seed<N: Into<String>>(name: N, seed: &str, balance: i64) -> Self {
        Address { name: name.into(), hash: hash_str(seed), balance }
    }

    /// The sentinel returned by failed address lookups.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if this is the [`Address::empty`] sentinel.
    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    #[inline]
    pub fn same_identity(&self, other: &Address) -> bool {
        self.hash == other.hash
    }
}

/// Returns the address in `book` whose hash equals `hash`, or the
/// [`Address::empty`] sentinel if there is none.
pub fn find_address(hash: &str, book: &[Address]) -> Address {
    book.iter()
        .find(|address| address.hash == hash)
        .cloned()
        .unwrap_or_else(Address::empty)
}
