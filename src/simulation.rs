//! Running repeated erase attacks and collecting their outcomes

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use log::{debug, info};

use crate::{
    blockchain::BlockLink,
    miner::MinerId,
    model::{Config, Event, Model},
    results::ResultsBuilder,
    seed::{NameSource, RandomSeeds, SeedSource},
};

pub mod builder;

pub use builder::{SimulationBuildError, SimulationBuilder};

/// Container for a group of simulations which share the same parameters,
/// apart from the number of attacking miners. Simulations should be run using
/// this struct's `run_all` method.
#[derive(Debug, Clone)]
pub struct SimulationGroup {
    pub(crate) config: Config,
    pub(crate) honest_miners: usize,
    pub(crate) attacker_counts: Vec<usize>,
    pub(crate) rounds: usize,
    pub(crate) repeat_all: usize,
    pub(crate) attack_round: usize,
    pub(crate) target_depth: usize,
    pub(crate) addresses: usize,
    pub(crate) max_transfer: i64,
    pub(crate) names: Box<dyn NameSource>,
    pub(crate) seeds: Box<dyn SeedSource>,
}

impl SimulationGroup {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Runs every configured simulation `repeat_all` times. Each run draws one
    /// seed from the group's [`SeedSource`] and derives all of its randomness
    /// from it.
    pub fn run_all(self) -> ResultsBuilder {
        let SimulationGroup {
            config,
            honest_miners,
            attacker_counts,
            rounds,
            repeat_all,
            attack_round,
            target_depth,
            addresses,
            max_transfer,
            names,
            mut seeds,
        } = self;

        let mut sims = vec![];
        for attackers in attacker_counts {
            for _ in 0..repeat_all {
                let seed = seeds.next_seed();
                sims.push(Simulation {
                    model: Model::new(
                        config.clone(),
                        honest_miners + attackers,
                    ),
                    attackers,
                    rounds,
                    attack_round,
                    target_depth,
                    addresses,
                    max_transfer,
                    names: names.clone(),
                    seeds: Box::new(RandomSeeds::from_seed(seed)),
                    traffic: StdRng::seed_from_u64(!seed),
                });
            }
        }

        info!("running {} simulations", sims.len());

        #[cfg(feature = "rayon")]
        let outputs = sims.into_par_iter().map(Simulation::run).collect();
        #[cfg(not(feature = "rayon"))]
        let outputs = sims.into_iter().map(Simulation::run).collect();

        ResultsBuilder::new(outputs, repeat_all)
    }
}

/// A single run of the mining game, in which the last `attackers` miners try
/// to erase a block of the longest chain once `attack_round` is reached.
///
/// Every round, one random transfer between two known addresses is submitted
/// before the round is mined.
#[derive(Debug, Clone)]
struct Simulation {
    model: Model,
    attackers: usize,
    rounds: usize,
    attack_round: usize,
    target_depth: usize,
    addresses: usize,
    max_transfer: i64,
    names: Box<dyn NameSource>,
    seeds: Box<dyn SeedSource>,
    traffic: StdRng,
}

/// Contains the output data from a simulation.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub model: Model,
    pub honest_miners: usize,
    pub attackers: usize,
    pub rounds: usize,
    /// The block the attackers tried to erase. `None` if no attack was
    /// launched.
    pub target: Option<BlockLink>,
}

impl SimulationOutput {
    /// True iff an attack was launched and its target is no longer on the
    /// longest chain.
    pub fn target_erased(&self) -> bool {
        match self.target {
            None => false,
            Some(target) => !self.model.longest_chain().contains_block(target),
        }
    }

    /// Fraction of the blocks on the longest chain mined by attackers.
    pub fn attacker_share(&self) -> f64 {
        let chain = self.model.longest_chain();
        let blocks: Vec<_> =
            chain.links().iter().filter_map(|link| link.block_id()).collect();
        if blocks.is_empty() {
            return 0.0;
        }

        let mined = blocks
            .iter()
            .filter(|&&id| self.is_attacker(self.model.tree[id].miner))
            .count();

        mined as f64 / blocks.len() as f64
    }

    #[inline]
    pub fn is_attacker(&self, miner: MinerId) -> bool {
        miner.get() >= self.honest_miners
    }
}

impl Simulation {
    /// Executes the configured simulation.
    fn run(self) -> SimulationOutput {
        let Simulation {
            mut model,
            attackers,
            rounds,
            attack_round,
            target_depth,
            addresses,
            max_transfer,
            mut names,
            mut seeds,
            mut traffic,
        } = self;

        let honest_miners = model.miners.len() - attackers;

        model = model
            .advance(Event::SeedRandom(seeds.next_seed()))
            .advance(Event::ProvideNames(names.names(addresses)));

        let mut target = None;
        for round in 1..=rounds {
            let from = traffic.gen_range(0..addresses);
            let to = (from + traffic.gen_range(1..addresses)) % addresses;
            let transfer = Event::SubmitTransaction {
                sender: model.address_book[from].hash.clone(),
                receiver: model.address_book[to].hash.clone(),
                amount: traffic.gen_range(1..=max_transfer),
            };
            model = model.advance(transfer);

            if round == attack_round && attackers > 0 {
                target = model.erasable_blocks().get(target_depth).copied();

                match target {
                    Some(link) => {
                        for miner in honest_miners..model.miners.len() {
                            model = model.advance(Event::SelectEraseTarget {
                                miner: miner.into(),
                                target: link,
                            });
                        }
                    }
                    None => debug!(
                        "round {}: no block at depth {} to attack",
                        round, target_depth
                    ),
                }
            }

            model = model
                .advance(Event::SeedRandom(seeds.next_seed()))
                .advance(Event::AdvanceRound);
        }

        SimulationOutput { model, honest_miners, attackers, rounds, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::FixedSeeds;

    fn output(attackers: usize) -> SimulationOutput {
        SimulationBuilder::new()
            .honest_miners(3)
            .attackers(attackers)
            .rounds(40)
            .attack_at_round(20)
            .seeds(FixedSeeds::new([5]))
            .build()
            .expect("valid simulation build")
            .run_all()
            .data()
            .remove(0)
    }

    #[test]
    fn honest_run_never_attacks() {
        let out = output(0);

        assert_eq!(out.target, None);
        assert!(!out.target_erased());
        assert_eq!(out.attacker_share(), 0.0);
        assert_eq!(out.model.round, 40);
        assert_eq!(out.model.address_book.len(), 4);
    }

    #[test]
    fn runs_are_reproducible() {
        let a = output(2);
        let b = output(2);

        assert_eq!(a.target, b.target);
        assert_eq!(a.model.tree.num_blocks(), b.model.tree.num_blocks());
        assert_eq!(
            a.model.longest_chain().links(),
            b.model.longest_chain().links()
        );
    }

    #[test]
    fn attackers_are_the_last_miners() {
        let out = output(2);

        assert_eq!(out.honest_miners, 3);
        assert!(!out.is_attacker(MinerId(2)));
        assert!(out.is_attacker(MinerId(3)));
        if let Some(target) = out.target {
            for miner in &out.model.miners[3..] {
                assert_eq!(miner.block_to_erase, target);
            }
        }
    }
}
