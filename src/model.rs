/*!
Simulation state and its event-driven transitions

A [`Model`] holds everything the simulation knows: the block tree, the
currently known tips, the miners, the pending transactions and the address
book. It only changes through [`Model::advance`], which applies one [`Event`]
and returns the next state. Invalid input never aborts a transition; it
degrades to a logged no-op or a sentinel value.

# Example
```
use rewrite_sim::prelude::*;

let mut model = Model::new(Config::default(), 3);
model = model.advance(Event::ProvideNames(vec!["Alice".into(), "Bob".into()]));

let alice = model.address_book[0].hash.clone();
let bob = model.address_book[1].hash.clone();
model = model.advance(Event::SubmitTransaction {
    sender: alice,
    receiver: bob,
    amount: 5,
});

for seed in 0..20 {
    model = model.advance(Event::SeedRandom(seed)).advance(Event::AdvanceRound);
}
assert_eq!(model.round, 20);
```
*/

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::{
    address::{find_address, Address},
    blockchain::{Block, BlockLink, BlockTree},
    chain::Chain,
    fork::{erasable_blocks, ForkPreference},
    hash::{self, Difficulty},
    ledger::next_tx,
    miner::{Miner, MinerId},
    tie_breaker::TieBreaker,
    transaction::Transaction,
};

/// Parameters which stay fixed for the lifetime of a [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of newest blocks ignored when computing balances.
    pub confirmations_required: usize,
    pub difficulty: Difficulty,
    /// Baseline balance of every address created from
    /// [`Event::ProvideNames`].
    pub initial_balance: i64,
    /// Decides between equally long chains and equally distant forks.
    pub tie_breaker: TieBreaker,
    pub fork_preference: ForkPreference,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            confirmations_required: 0,
            difficulty: Difficulty::default(),
            initial_balance: 100,
            tie_breaker: TieBreaker::default(),
            fork_preference: ForkPreference::default(),
        }
    }
}

/// Input driving a [`Model`] forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Mine one round using the current round seed and the first valid
    /// pending transaction.
    AdvanceRound,
    /// Queue a transfer between the addresses with the given hashes. Unknown
    /// hashes resolve to [`Address::empty`].
    SubmitTransaction { sender: String, receiver: String, amount: i64 },
    /// Make `miner` try to erase `target`. [`BlockLink::Empty`] makes the
    /// miner honest again.
    SelectEraseTarget { miner: MinerId, target: BlockLink },
    /// Set the seed of the following rounds.
    SeedRandom(u64),
    /// Create one address per name.
    ProvideNames(Vec<String>),
}

/// A successful proof-of-work attempt, not yet part of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedBlock {
    pub miner: MinerId,
    pub nonce: String,
    pub hash: String,
    pub parent: BlockLink,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub config: Config,
    pub tree: BlockTree,
    pub miners: Vec<Miner>,
    /// The known tip set. Holds only [`BlockLink::Empty`] until the first
    /// block is mined.
    pub discovered_blocks: Vec<BlockLink>,
    pub transaction_pool: VecDeque<Transaction>,
    pub address_book: Vec<Address>,
    pub round_seed: u64,
    /// Number of [`Event::AdvanceRound`] events applied so far.
    pub round: usize,
}

impl Model {
    /// Creates a model with an empty block tree and `num_miners` honest
    /// miners.
    pub fn new(config: Config, num_miners: usize) -> Self {
        Model {
            config,
            tree: BlockTree::new(),
            miners: vec![Miner::honest(); num_miners],
            discovered_blocks: vec![BlockLink::Empty],
            transaction_pool: VecDeque::new(),
            address_book: vec![],
            round_seed: 0,
            round: 0,
        }
    }

    /// Applies `event` and returns the resulting state.
    pub fn advance(mut self, event: Event) -> Self {
        match event {
            Event::AdvanceRound => self.mine_round(),
            Event::SubmitTransaction { sender, receiver, amount } => {
                self.submit_transaction(&sender, &receiver, amount)
            }
            Event::SelectEraseTarget { miner, target } => {
                self.select_erase_target(miner, target)
            }
            Event::SeedRandom(seed) => self.round_seed = seed,
            Event::ProvideNames(names) => self.add_addresses(names),
        }

        self
    }

    /// The longest chain among the known tips.
    pub fn longest_chain(&self) -> Chain<'_> {
        self.tree
            .longest_chain(&self.discovered_blocks, self.config.tie_breaker)
    }

    /// Blocks an attacker could currently target, newest first.
    pub fn erasable_blocks(&self) -> Vec<BlockLink> {
        erasable_blocks(
            &self.tree,
            &self.discovered_blocks,
            self.config.tie_breaker,
        )
    }

    /// The parent `miner` attempts to extend this round.
    pub fn block_to_mine(&self, miner: &Miner) -> Option<BlockLink> {
        miner.block_to_mine(
            &self.tree,
            &self.discovered_blocks,
            self.config.fork_preference,
            self.config.tie_breaker,
        )
    }

    /// Runs one proof-of-work attempt per miner for a block recording `tx`,
    /// and returns the attempts which meet the difficulty.
    pub fn mined_blocks_for(&self, tx: &Transaction) -> Vec<MinedBlock> {
        self.miners
            .iter()
            .enumerate()
            .filter_map(|(index, miner)| {
                let parent = self.block_to_mine(miner)?;
                let hash = self.tree.candidate_block_hash(
                    tx,
                    parent,
                    index,
                    self.round_seed,
                );

                self.config.difficulty.is_met_by(&hash).then(|| MinedBlock {
                    miner: MinerId(index),
                    nonce: hash::nonce(index, self.round_seed),
                    hash,
                    parent,
                })
            })
            .collect()
    }

    /// Balance of the address with hash `address` on the confirmed part of
    /// the longest chain. Unknown hashes have balance 0.
    pub fn balance_of(&self, address: &str) -> i64 {
        let address = find_address(address, &self.address_book);
        let chain =
            self.longest_chain().confirmed(self.config.confirmations_required);

        crate::ledger::balance_for(&chain, &address)
    }

    fn mine_round(&mut self) {
        self.round += 1;

        let selected = {
            let chain = self
                .longest_chain()
                .confirmed(self.config.confirmations_required);

            next_tx(&chain, &self.transaction_pool)
                .map(|(index, tx)| (index, tx.clone()))
        };
        let Some((index, tx)) = selected else {
            debug!("round {}: no valid transaction, skipping", self.round);
            return;
        };

        let mined = self.mined_blocks_for(&tx);
        debug!(
            "round {}: {} of {} miners met the difficulty",
            self.round,
            mined.len(),
            self.miners.len()
        );

        let mut accepted = 0;
        for candidate in mined {
            let block = Block::new(
                tx.clone(),
                candidate.parent,
                self.tree.link_hash(candidate.parent),
                candidate.nonce,
            );
            debug_assert_eq!(block.hash(), candidate.hash);

            match self.tree.publish(block, candidate.miner) {
                Ok(id) => {
                    self.discovered_blocks
                        .retain(|&link| link != candidate.parent);
                    self.discovered_blocks.push(id.into());
                    accepted += 1;
                }
                Err(e) => {
                    warn!("round {}: dropped candidate: {}", self.round, e)
                }
            }
        }

        if accepted > 0 {
            self.transaction_pool.remove(index);
            info!(
                "round {}: {} block(s) accepted, longest chain has {} links",
                self.round,
                accepted,
                self.longest_chain().len()
            );
        }
    }

    fn submit_transaction(&mut self, sender: &str, receiver: &str, amount: i64) {
        let tx = Transaction::new(
            find_address(sender, &self.address_book),
            find_address(receiver, &self.address_book),
            amount,
        );

        if tx.sender.is_empty() || tx.receiver.is_empty() {
            warn!("queued transaction with an unknown address: {:?}", tx);
        }
        self.transaction_pool.push_back(tx);
    }

    fn select_erase_target(&mut self, miner: MinerId, target: BlockLink) {
        if !self.tree.contains(target) {
            warn!("miner {} targets unknown block {:?}", miner, target);
            return;
        }

        match self.miners.get_mut(miner.0) {
            Some(m) => {
                info!("miner {} now targets {:?}", miner, target);
                m.block_to_erase = target;
            }
            None => warn!("no miner with ID {}", miner),
        }
    }

    fn add_addresses(&mut self, names: Vec<String>) {
        for name in names {
            let seed =
                format!("{}:{}", self.round_seed, self.address_book.len());
            let address =
                Address::from_seed(name, &seed, self.config.initial_balance);

            debug!("new address {} ({})", address.name, address.hash);
            self.address_book.push(address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(names: &[&str], miners: usize) -> Model {
        Model::new(Config::default(), miners).advance(Event::ProvideNames(
            names.iter().map(|n| n.to_string()).collect(),
        ))
    }

    fn hash_of(model: &Model, i: usize) -> String {
        model.address_book[i].hash.clone()
    }

    /// Returns the first seed at or after `from` for which some miner mines.
    fn winning_seed(model: &Model, tx: &Transaction, from: u64) -> u64 {
        (from..)
            .find(|&seed| {
                let mut m = model.clone();
                m.round_seed = seed;
                !m.mined_blocks_for(tx).is_empty()
            })
            .unwrap()
    }

    #[test]
    fn provide_names_builds_distinct_addresses() {
        let model = model_with(&["A", "B", "C"], 1);

        assert_eq!(model.address_book.len(), 3);
        assert_ne!(hash_of(&model, 0), hash_of(&model, 1));
        assert!(model.address_book.iter().all(|a| a.balance == 100));
    }

    #[test]
    fn submit_resolves_addresses() {
        let model = model_with(&["A", "B"], 1);
        let (a, b) = (hash_of(&model, 0), hash_of(&model, 1));
        let model = model
            .advance(Event::SubmitTransaction {
                sender: a.clone(),
                receiver: b,
                amount: 5,
            })
            .advance(Event::SubmitTransaction {
                sender: "nobody".into(),
                receiver: a,
                amount: 5,
            });

        assert_eq!(model.transaction_pool.len(), 2);
        assert_eq!(model.transaction_pool[0].sender.name, "A");
        assert!(model.transaction_pool[1].sender.is_empty());
    }

    #[test]
    fn round_without_transaction_is_skipped() {
        let model = model_with(&["A"], 4).advance(Event::AdvanceRound);

        assert_eq!(model.round, 1);
        assert!(model.tree.is_empty());
        assert_eq!(model.discovered_blocks, vec![BlockLink::Empty]);
    }

    #[test]
    fn mined_blocks_meet_difficulty() {
        let model = model_with(&["A", "B"], 8);
        let tx = Transaction::new(
            model.address_book[0].clone(),
            model.address_book[1].clone(),
            1,
        );

        for seed in 0..50 {
            let mut m = model.clone();
            m.round_seed = seed;
            for mined in m.mined_blocks_for(&tx) {
                assert!(hash::meets_difficulty(&mined.hash));
                assert_eq!(mined.parent, BlockLink::Empty);
                assert_eq!(mined.nonce, hash::nonce(mined.miner.get(), seed));
            }
        }
    }

    #[test]
    fn successful_round_appends_blocks_and_updates_balances() {
        let model = model_with(&["A", "B"], 3);
        let (a, b) = (hash_of(&model, 0), hash_of(&model, 1));
        let model = model.advance(Event::SubmitTransaction {
            sender: a.clone(),
            receiver: b.clone(),
            amount: 30,
        });

        let seed = winning_seed(&model, &model.transaction_pool[0], 0);
        let model =
            model.advance(Event::SeedRandom(seed)).advance(Event::AdvanceRound);

        assert!(!model.tree.is_empty());
        assert!(model.transaction_pool.is_empty());
        assert!(!model.discovered_blocks.contains(&BlockLink::Empty));
        assert_eq!(model.discovered_blocks, model.tree.tips());
        assert_eq!(model.balance_of(&a), 70);
        assert_eq!(model.balance_of(&b), 130);
    }

    #[test]
    fn failed_round_keeps_transaction() {
        let model = model_with(&["A", "B"], 1);
        let (a, b) = (hash_of(&model, 0), hash_of(&model, 1));
        let model = model.advance(Event::SubmitTransaction {
            sender: a,
            receiver: b,
            amount: 1,
        });

        let tx = model.transaction_pool[0].clone();
        let seed = (0..)
            .find(|&seed| {
                let mut m = model.clone();
                m.round_seed = seed;
                m.mined_blocks_for(&tx).is_empty()
            })
            .unwrap();
        let model =
            model.advance(Event::SeedRandom(seed)).advance(Event::AdvanceRound);

        assert!(model.tree.is_empty());
        assert_eq!(model.transaction_pool.len(), 1);
    }

    #[test]
    fn confirmations_delay_spending() {
        let config = Config { confirmations_required: 1, ..Config::default() };
        let model = Model::new(config, 4)
            .advance(Event::ProvideNames(vec!["A".into(), "B".into()]));
        let (a, b) = (hash_of(&model, 0), hash_of(&model, 1));
        let model = model.advance(Event::SubmitTransaction {
            sender: a.clone(),
            receiver: b,
            amount: 10,
        });

        let seed = winning_seed(&model, &model.transaction_pool[0], 0);
        let model =
            model.advance(Event::SeedRandom(seed)).advance(Event::AdvanceRound);

        assert!(!model.tree.is_empty());
        assert_eq!(model.balance_of(&a), 100);
    }

    #[test]
    fn select_erase_target_switches_miner() {
        let model = model_with(&["A"], 2);
        let target = BlockLink::Empty;

        let model = model.advance(Event::SelectEraseTarget {
            miner: MinerId(1),
            target,
        });
        assert!(model.miners[1].is_honest());

        let model = model.advance(Event::SelectEraseTarget {
            miner: MinerId(9),
            target,
        });
        assert_eq!(model.miners.len(), 2);
    }

    #[test]
    fn attacker_with_unknown_target_contributes_nothing() {
        let mut model = model_with(&["A", "B"], 1);
        let tx = Transaction::new(
            model.address_book[0].clone(),
            model.address_book[1].clone(),
            1,
        );
        model.miners[0] =
            Miner::erasing(BlockLink::Block(crate::blockchain::BlockId(5)));

        for seed in 0..64 {
            model.round_seed = seed;
            assert!(model.mined_blocks_for(&tx).is_empty());
        }
    }

    #[test]
    fn unknown_erase_target_is_ignored() {
        let mut model = model_with(&["A", "B"], 2).advance(
            Event::SelectEraseTarget {
                miner: MinerId(1),
                target: BlockLink::Block(crate::blockchain::BlockId(0)),
            },
        );
        assert!(model.miners[1].is_honest());

        let (a, b) = (hash_of(&model, 0), hash_of(&model, 1));
        model = model.advance(Event::SubmitTransaction {
            sender: a,
            receiver: b,
            amount: 1,
        });
        let tx = model.transaction_pool[0].clone();
        let seed = winning_seed(&model, &tx, 0);
        let model =
            model.advance(Event::SeedRandom(seed)).advance(Event::AdvanceRound);

        // Block 0 now exists, but nothing ever selected it.
        let block0 = BlockLink::Block(crate::blockchain::BlockId(0));
        assert!(model.tree.contains(block0));
        assert!(model.miners[1].is_honest());
        assert_eq!(
            model.block_to_mine(&model.miners[1]),
            model.longest_chain().head()
        );
    }
}
