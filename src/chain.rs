//! Chains reconstructed from a [`BlockTree`]

use crate::blockchain::{Block, BlockLink, BlockTree};

/// A sequence of [`BlockLink`]s in tip-to-root order, borrowed from the
/// [`BlockTree`] holding its blocks.
///
/// Chains built by [`BlockTree::chain_for_block`] end at
/// [`BlockLink::Empty`]. Chains shortened with [`Chain::confirmed`] may not.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    tree: &'a BlockTree,
    links: Vec<BlockLink>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(tree: &'a BlockTree, links: Vec<BlockLink>) -> Self {
        Chain { tree, links }
    }

    /// Number of links, including [`BlockLink::Empty`] if present.
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The newest link of the chain.
    #[inline]
    pub fn head(&self) -> Option<BlockLink> {
        self.links.first().copied()
    }

    #[inline]
    pub fn links(&self) -> &[BlockLink] {
        &self.links
    }

    pub fn tree(&self) -> &'a BlockTree {
        self.tree
    }

    /// Blocks of the chain from newest to oldest, skipping
    /// [`BlockLink::Empty`].
    pub fn blocks(&self) -> impl Iterator<Item = &'a Block> + '_ {
        let tree = self.tree;

        self.links
            .iter()
            .filter_map(|link| link.block_id())
            .map(move |id| &tree[id].block)
    }

    /// True iff some link of the chain has the same hash as `target`.
    pub fn contains_block(&self, target: BlockLink) -> bool {
        if !self.tree.contains(target) {
            return false;
        }

        let hash = self.tree.link_hash(target);
        self.links.iter().any(|&link| self.tree.link_hash(link) == hash)
    }

    /// Number of links from the head up to and including `target`. Returns
    /// [`Chain::len`] if `target` is not on the chain, so callers should check
    /// [`Chain::contains_block`] first.
    pub fn distance_to_block(&self, target: BlockLink) -> usize {
        if !self.tree.contains(target) {
            return self.len();
        }

        let hash = self.tree.link_hash(target);
        self.links
            .iter()
            .position(|&link| self.tree.link_hash(link) == hash)
            .map_or(self.len(), |i| i + 1)
    }

    /// Drops the newest `confirmations_required` links. Blocks that recent are
    /// not considered final.
    pub fn confirmed(&self, confirmations_required: usize) -> Chain<'a> {
        let links = self
            .links
            .iter()
            .skip(confirmations_required)
            .copied()
            .collect();

        Chain::new(self.tree, links)
    }

    /// The real blocks of the chain, newest first.
    pub fn without_empty(&self) -> Vec<BlockLink> {
        self.links.iter().filter(|link| !link.is_empty()).copied().collect()
    }
}
