//! The block tree and chain traversal

use std::{collections::HashMap, fmt::Display, ops::Index};

use log::debug;
use thiserror::Error;

use crate::{
    chain::Chain,
    hash::{self, genesis_hash},
    miner::MinerId,
    tie_breaker::TieBreaker,
    transaction::Transaction,
};

/// Unique identifier of a [`Block`] within a [`BlockTree`]. Corresponds to the
/// order in which blocks were published.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Returns the [`usize`] corresponding to this [`BlockId`].
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for BlockId {
    fn from(value: usize) -> Self {
        BlockId(value)
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A shared, read-only reference to a block, or the sentinel preceding the
/// first block of every chain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockLink {
    /// The genesis predecessor.
    #[default]
    Empty,
    /// A block held by a [`BlockTree`].
    Block(BlockId),
}

impl BlockLink {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the referenced block's ID, or `None` for [`BlockLink::Empty`].
    #[inline]
    pub fn block_id(&self) -> Option<BlockId> {
        match self {
            Self::Empty => None,
            Self::Block(id) => Some(*id),
        }
    }
}

impl From<BlockId> for BlockLink {
    fn from(value: BlockId) -> Self {
        Self::Block(value)
    }
}

/// An immutable block recording a single transaction.
///
/// The hash is computed once in [`Block::new`] and never changes, because no
/// field can be modified after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    transaction: Transaction,
    previous: BlockLink,
    nonce: String,
    hash: String,
}

impl Block {
    /// Creates a block on top of `previous`, whose hash is `previous_hash`.
    pub fn new(
        transaction: Transaction,
        previous: BlockLink,
        previous_hash: &str,
        nonce: String,
    ) -> Self {
        let hash = hash::block_hash(&transaction, previous_hash, &nonce);

        Block { transaction, previous, nonce, hash }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn previous(&self) -> BlockLink {
        self.previous
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// The hash cached at creation.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// A block and its associated metadata as held within a [`BlockTree`].
#[derive(Debug, Clone)]
pub struct BlockData {
    pub block: Block,
    /// Number of blocks on the path from `block` to [`BlockLink::Empty`],
    /// including `block` itself.
    pub depth: usize,
    /// All blocks which directly point to `block`. A block without children is
    /// a tip.
    pub children: Vec<BlockId>,
    /// The miner which produced `block`.
    pub miner: MinerId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockInsertionError {
    #[error("block's parent {0} was not found in this tree")]
    ParentNotFound(BlockId),
    #[error("a block with hash {0} already exists in this tree")]
    DuplicateHash(String),
}

/// Append-only arena of every block ever mined.
///
/// Blocks can only point to blocks which were published before them, so the
/// tree is acyclic and every chain of parents ends at [`BlockLink::Empty`].
#[derive(Debug, Clone)]
pub struct BlockTree {
    genesis_hash: String,
    blocks: Vec<BlockData>,
    by_hash: HashMap<String, BlockId>,
}

impl BlockTree {
    /// Creates a tree containing no blocks.
    pub fn new() -> Self {
        BlockTree {
            genesis_hash: genesis_hash(),
            blocks: vec![],
            by_hash: HashMap::new(),
        }
    }

    /// Number of blocks in the tree.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns true iff `link` is [`BlockLink::Empty`] or refers to a block in
    /// this tree.
    #[inline]
    pub fn contains(&self, link: BlockLink) -> bool {
        match link {
            BlockLink::Empty => true,
            BlockLink::Block(id) => id.0 < self.blocks.len(),
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&BlockData> {
        self.blocks.get(id.0)
    }

    /// Returns the ID of the block with the given hash.
    #[inline]
    pub fn find_by_hash(&self, hash: &str) -> Option<BlockId> {
        self.by_hash.get(hash).copied()
    }

    /// Iterates over all blocks in publication order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockData)> {
        self.blocks.iter().enumerate().map(|(i, data)| (BlockId(i), data))
    }

    /// Returns the predecessor of `link`. [`BlockLink::Empty`] has none.
    #[inline]
    pub fn previous(&self, link: BlockLink) -> Option<BlockLink> {
        link.block_id()
            .and_then(|id| self.get(id))
            .map(|data| data.block.previous())
    }

    /// Returns the hash of `link`. Blocks return their cached hash.
    ///
    /// ## Panics
    /// If `link` refers to a block outside of this tree.
    pub fn link_hash(&self, link: BlockLink) -> &str {
        match link {
            BlockLink::Empty => &self.genesis_hash,
            BlockLink::Block(id) => self[id].block.hash(),
        }
    }

    /// Hash a block would have if it recorded `tx` on top of `previous` with
    /// the nonce of `miner_index` in the round seeded by `seed`.
    pub fn candidate_block_hash(
        &self,
        tx: &Transaction,
        previous: BlockLink,
        miner_index: usize,
        seed: u64,
    ) -> String {
        hash::block_hash(
            tx,
            self.link_hash(previous),
            &hash::nonce(miner_index, seed),
        )
    }

    /// Recomputes the hash of block `id` from its contents.
    pub fn recompute_hash(&self, id: BlockId) -> String {
        let block = &self[id].block;

        hash::block_hash(
            block.transaction(),
            self.link_hash(block.previous()),
            block.nonce(),
        )
    }

    /// Adds `block`, mined by `miner`, to the tree and returns its ID.
    pub fn publish(
        &mut self,
        block: Block,
        miner: MinerId,
    ) -> Result<BlockId, BlockInsertionError> {
        use BlockInsertionError::*;

        if self.by_hash.contains_key(block.hash()) {
            return Err(DuplicateHash(block.hash().to_string()));
        }

        let depth = match block.previous() {
            BlockLink::Empty => 1,
            BlockLink::Block(parent) => match self.blocks.get(parent.0) {
                None => return Err(ParentNotFound(parent)),
                Some(data) => data.depth + 1,
            },
        };

        let id = BlockId(self.blocks.len());
        if let BlockLink::Block(parent) = block.previous() {
            self.blocks[parent.0].children.push(id);
        }

        debug!(
            "published block {} (hash={}, depth={}, miner={})",
            id,
            block.hash(),
            depth,
            miner
        );

        self.by_hash.insert(block.hash().to_string(), id);
        self.blocks.push(BlockData { block, depth, children: vec![], miner });

        Ok(id)
    }

    /// [`BlockLink::Empty`] is always a tip. A block is a tip iff no block
    /// points to it. Blocks outside of this tree are never tips.
    pub fn is_tip(&self, link: BlockLink) -> bool {
        match link {
            BlockLink::Empty => true,
            BlockLink::Block(id) => {
                self.get(id).map_or(false, |data| data.children.is_empty())
            }
        }
    }

    /// Returns every tip in the tree, in publication order. An empty tree has
    /// the single tip [`BlockLink::Empty`].
    pub fn tips(&self) -> Vec<BlockLink> {
        if self.is_empty() {
            return vec![BlockLink::Empty];
        }

        self.iter()
            .filter(|(_, data)| data.children.is_empty())
            .map(|(id, _)| BlockLink::Block(id))
            .collect()
    }

    /// Returns the links from `link` back to [`BlockLink::Empty`], both
    /// included, in tip-to-root order.
    pub fn chain_for_block(&self, link: BlockLink) -> Chain<'_> {
        let mut links = vec![link];

        let mut curr = link;
        while let Some(prev) = self.previous(curr) {
            links.push(prev);
            curr = prev;
        }

        Chain::new(self, links)
    }

    /// Chains of every tip among `links`, in the order the tips appear.
    pub fn tip_chains(&self, links: &[BlockLink]) -> Vec<Chain<'_>> {
        links
            .iter()
            .filter(|&&link| self.is_tip(link))
            .map(|&link| self.chain_for_block(link))
            .collect()
    }

    /// Returns the longest chain ending at a tip among `links`. Chains of equal
    /// length are decided by `tie_breaker`. Returns an empty chain if `links`
    /// holds no tip.
    pub fn longest_chain(
        &self,
        links: &[BlockLink],
        tie_breaker: TieBreaker,
    ) -> Chain<'_> {
        tie_breaker
            .choose(self.tip_chains(links), |chain| chain.len())
            .unwrap_or_else(|| Chain::new(self, vec![]))
    }
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<BlockId> for BlockTree {
    type Output = BlockData;

    fn index(&self, index: BlockId) -> &Self::Output {
        &self.blocks[index.0]
    }
}
