//! Fork search for miners trying to erase a block from history
//!
//! An attacking miner picks a block on the canonical chain and tries to
//! out-race it: it mines on a branch which forks off right before the target
//! and grows that branch until it becomes the longest chain.

use std::cmp::Reverse;

use log::trace;

use crate::{
    blockchain::{BlockLink, BlockTree},
    chain::Chain,
    tie_breaker::TieBreaker,
};

/// Which qualifying branch an attacker extends when several exist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForkPreference {
    /// Extend the branch with the fewest links between its tip and the fork
    /// point.
    #[default]
    Nearest,
    /// Extend the branch with the most links between its tip and the fork
    /// point.
    Farthest,
}

/// Returns the parent an attacker should mine on to erase `block_to_erase`,
/// or `None` if `block_to_erase` is not a block of `tree`.
///
/// Among the chains of tips in `links` which contain the target's parent but
/// not the target, the one preferred by `preference` wins, with ties decided
/// by `tie_breaker`. Without such a chain the attacker mines directly on the
/// target's parent.
pub fn malicious_block_to_mine(
    tree: &BlockTree,
    links: &[BlockLink],
    block_to_erase: BlockLink,
    preference: ForkPreference,
    tie_breaker: TieBreaker,
) -> Option<BlockLink> {
    let target = block_to_erase
        .block_id()
        .filter(|&id| tree.get(id).is_some())?;
    let fork_point = tree[target].block.previous();

    let candidates = tree.tip_chains(links).into_iter().filter(|chain| {
        chain.contains_block(fork_point) && !chain.contains_block(block_to_erase)
    });

    let distance = |chain: &Chain<'_>| chain.distance_to_block(fork_point);
    let chosen = match preference {
        ForkPreference::Nearest => {
            tie_breaker.choose(candidates, |chain| Reverse(distance(chain)))
        }
        ForkPreference::Farthest => tie_breaker.choose(candidates, distance),
    };

    let parent = chosen.and_then(|chain| chain.head()).unwrap_or(fork_point);
    trace!(
        "fork search for block {}: fork point {:?}, parent {:?}",
        target,
        fork_point,
        parent
    );

    Some(parent)
}

/// Blocks of the longest chain which an attacker could target, newest first.
pub fn erasable_blocks(
    tree: &BlockTree,
    links: &[BlockLink],
    tie_breaker: TieBreaker,
) -> Vec<BlockLink> {
    tree.longest_chain(links, tie_breaker).without_empty()
}
