use crate::address::Address;

/// A transfer of `amount` from `sender` to `receiver`.
///
/// Construction performs no checks. A transaction only becomes minable once
/// [`validate_tx`](crate::ledger::validate_tx) accepts it against some chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub sender: Address,
    pub receiver: Address,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: Address, receiver: Address, amount: i64) -> Self {
        Transaction { sender, receiver, amount }
    }
}
