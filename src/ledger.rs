//! Balances and transaction validation derived from chain history

use thiserror::Error;

use crate::{address::Address, chain::Chain, transaction::Transaction};

/// Reasons a [`Transaction`] cannot be mined on top of a chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxValidationError {
    #[error("amount {0} is not positive")]
    NonPositiveAmount(i64),
    #[error("sender and receiver are the same address ({0})")]
    SelfTransfer(String),
    #[error("sender balance {balance} is below the amount {amount}")]
    InsufficientBalance { balance: i64, amount: i64 },
}

/// Drops the `confirmations_required` newest links from `chain`.
#[inline]
pub fn confirmed_chain<'a>(
    chain: &Chain<'a>,
    confirmations_required: usize,
) -> Chain<'a> {
    chain.confirmed(confirmations_required)
}

/// Balance of `address` after every transaction on `chain`, starting from the
/// address's baseline balance.
pub fn balance_for(chain: &Chain<'_>, address: &Address) -> i64 {
    chain.blocks().fold(address.balance, |balance, block| {
        let tx = block.transaction();
        let mut balance = balance;

        if tx.sender.same_identity(address) {
            balance = balance.saturating_sub(tx.amount);
        }
        if tx.receiver.same_identity(address) {
            balance = balance.saturating_add(tx.amount);
        }

        balance
    })
}

/// Checks whether `tx` can be mined on top of `chain`.
pub fn validate_tx(
    chain: &Chain<'_>,
    tx: &Transaction,
) -> Result<(), TxValidationError> {
    use TxValidationError::*;

    if tx.amount <= 0 {
        return Err(NonPositiveAmount(tx.amount));
    }
    if tx.sender.same_identity(&tx.receiver) {
        return Err(SelfTransfer(tx.sender.hash.clone()));
    }

    let balance = balance_for(chain, &tx.sender);
    if balance < tx.amount {
        return Err(InsufficientBalance { balance, amount: tx.amount });
    }

    Ok(())
}

#[inline]
pub fn is_valid_tx(chain: &Chain<'_>, tx: &Transaction) -> bool {
    validate_tx(chain, tx).is_ok()
}

/// Returns the first transaction in `pool` which is valid on `chain`, along
/// with its position in the pool.
pub fn next_tx<'p, I>(
    chain: &Chain<'_>,
    pool: I,
) -> Option<(usize, &'p Transaction)>
where
    I: IntoIterator<Item = &'p Transaction>,
{
    pool.into_iter().enumerate().find(|(_, tx)| is_valid_tx(chain, tx))
}
