/*!
Miners and the choice of which block to extend

A [`Miner`] is honest until it is given a block to erase. Honest miners extend
the tip of the longest chain. Attacking miners extend whichever branch
[`malicious_block_to_mine`] selects, trying to grow a chain which excludes
their target.
*/

use std::fmt::Display;

use crate::{
    blockchain::{BlockLink, BlockTree},
    fork::{malicious_block_to_mine, ForkPreference},
    tie_breaker::TieBreaker,
};

/// A participant in the mining game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Miner {
    /// [`BlockLink::Empty`] for honest miners. Otherwise the block this miner
    /// tries to remove from the longest chain.
    pub block_to_erase: BlockLink,
}

impl Miner {
    /// Creates a new honest miner.
    pub fn honest() -> Self {
        Self::default()
    }

    /// Creates a miner which tries to erase `target`.
    pub fn erasing(target: BlockLink) -> Self {
        Miner { block_to_erase: target }
    }

    #[inline]
    pub fn is_honest(&self) -> bool {
        self.block_to_erase.is_empty()
    }

    /// Returns the parent this miner attempts to extend, given the currently
    /// known tips. Returns `None` if this miner's target is not in `tree`.
    pub fn block_to_mine(
        &self,
        tree: &BlockTree,
        tips: &[BlockLink],
        preference: ForkPreference,
        tie_breaker: TieBreaker,
    ) -> Option<BlockLink> {
        match self.block_to_erase {
            BlockLink::Empty => Some(
                tree.longest_chain(tips, tie_breaker)
                    .head()
                    .unwrap_or(BlockLink::Empty),
            ),
            target => malicious_block_to_mine(
                tree,
                tips,
                target,
                preference,
                tie_breaker,
            ),
        }
    }
}

/// Index of a [`Miner`] within a [`Model`](crate::model::Model). The index
/// also seeds the miner's nonce in every round.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinerId(pub(crate) usize);

impl MinerId {
    /// Returns the [`usize`] corresponding to this [`MinerId`].
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for MinerId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl Display for MinerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}
