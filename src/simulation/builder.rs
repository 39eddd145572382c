use crate::{
    fork::ForkPreference,
    hash::Difficulty,
    model::Config,
    seed::{NameSource, NumberedNames, RandomSeeds, SeedSource},
    tie_breaker::TieBreaker,
};

use super::SimulationGroup;

/// Builds a [`SimulationGroup`].
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    config: Config,
    honest_miners: Option<usize>,
    attacker_counts: Vec<usize>,
    rounds: Option<usize>,
    repeat_all: Option<usize>,
    attack_round: Option<usize>,
    target_depth: usize,
    addresses: Option<usize>,
    max_transfer: Option<i64>,
    names: Option<Box<dyn NameSource>>,
    seeds: Option<Box<dyn SeedSource>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SimulationBuildError {
    #[error("simulation with {0} attacker(s) would have no miners")]
    NoMinersGiven(usize),
    #[error("number of simulation rounds must be greater than 0")]
    ZeroRounds,
    #[error("cannot repeat simulations 0 times")]
    ZeroRepeats,
    #[error("attack round {0} is outside of rounds 1..={1}")]
    AttackRoundOutOfRange(usize, usize),
    #[error("random transfers need at least 2 addresses, got {0}")]
    TooFewAddresses(usize),
    #[error("maximum transfer amount {0} is not positive")]
    NonPositiveTransfer(i64),
}

impl SimulationBuilder {
    const DEFAULT_HONEST_MINERS: usize = 4;
    const DEFAULT_ROUNDS: usize = 100;
    const DEFAULT_ADDRESSES: usize = 4;
    const DEFAULT_MAX_TRANSFER: i64 = 5;

    /// Creates a new [`SimulationBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of honest miners in every simulation (default 4).
    pub fn honest_miners(mut self, num: usize) -> Self {
        self.honest_miners = Some(num);

        self
    }

    /// Add a simulation in which `num` additional miners attack. Can be called
    /// several times to compare attacker counts. Without any call, no miner
    /// attacks.
    pub fn attackers(mut self, num: usize) -> Self {
        self.attacker_counts.push(num);

        self
    }

    /// Call [`SimulationBuilder::attackers`] once for each element of `nums`.
    pub fn attackers_iter<I>(mut self, nums: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.attacker_counts.extend(nums);

        self
    }

    /// Sets the number of rounds each simulation lasts for (default 100).
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = Some(rounds);

        self
    }

    /// Each simulation will run `num` times (default 1).
    pub fn repeat_all(mut self, num: usize) -> Self {
        self.repeat_all = Some(num);

        self
    }

    /// Attackers pick their target at the start of round `round`. Defaults to
    /// halfway through the simulation.
    pub fn attack_at_round(mut self, round: usize) -> Self {
        self.attack_round = Some(round);

        self
    }

    /// Attackers target the block `depth` links below the tip of the longest
    /// chain (default 0, the tip itself).
    pub fn target_depth(mut self, depth: usize) -> Self {
        self.target_depth = depth;

        self
    }

    /// Number of addresses trading with each other (default 4).
    pub fn addresses(mut self, num: usize) -> Self {
        self.addresses = Some(num);

        self
    }

    /// Random transfers move between 1 and `amount` units (default 5).
    pub fn max_transfer(mut self, amount: i64) -> Self {
        self.max_transfer = Some(amount);

        self
    }

    /// Source of address names ([`NumberedNames`] otherwise).
    pub fn names<N: NameSource + 'static>(mut self, names: N) -> Self {
        self.names = Some(Box::new(names));

        self
    }

    /// Source of the per-run seeds ([`RandomSeeds::new`] otherwise).
    pub fn seeds<S: SeedSource + 'static>(mut self, seeds: S) -> Self {
        self.seeds = Some(Box::new(seeds));

        self
    }

    /// Replaces the whole model [`Config`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;

        self
    }

    /// Number of newest blocks ignored when validating transactions
    /// (default 0).
    pub fn confirmations(mut self, num: usize) -> Self {
        self.config.confirmations_required = num;

        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.config.difficulty = difficulty;

        self
    }

    /// Baseline balance of every address (default 100).
    pub fn initial_balance(mut self, balance: i64) -> Self {
        self.config.initial_balance = balance;

        self
    }

    pub fn tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.config.tie_breaker = tie_breaker;

        self
    }

    pub fn fork_preference(mut self, preference: ForkPreference) -> Self {
        self.config.fork_preference = preference;

        self
    }

    /// Creates a [`SimulationGroup`] from the specified parameters.
    pub fn build(self) -> Result<SimulationGroup, SimulationBuildError> {
        use SimulationBuildError::*;

        let SimulationBuilder {
            config,
            honest_miners,
            mut attacker_counts,
            rounds,
            repeat_all,
            attack_round,
            target_depth,
            addresses,
            max_transfer,
            names,
            seeds,
        } = self;

        let honest_miners = honest_miners.unwrap_or(Self::DEFAULT_HONEST_MINERS);
        if attacker_counts.is_empty() {
            attacker_counts.push(0);
        }
        if let Some(&attackers) =
            attacker_counts.iter().find(|&&n| n + honest_miners == 0)
        {
            return Err(NoMinersGiven(attackers));
        }

        let rounds = match rounds {
            Some(0) => return Err(ZeroRounds),
            Some(x) => x,
            None => Self::DEFAULT_ROUNDS,
        };
        let repeat_all = match repeat_all {
            Some(0) => return Err(ZeroRepeats),
            Some(x) => x,
            None => 1,
        };
        let attack_round = match attack_round {
            Some(r) if r == 0 || r > rounds => {
                return Err(AttackRoundOutOfRange(r, rounds))
            }
            Some(r) => r,
            None => (rounds / 2).max(1),
        };
        let addresses = match addresses {
            Some(n) if n < 2 => return Err(TooFewAddresses(n)),
            Some(n) => n,
            None => Self::DEFAULT_ADDRESSES,
        };
        let max_transfer = match max_transfer {
            Some(a) if a <= 0 => return Err(NonPositiveTransfer(a)),
            Some(a) => a,
            None => Self::DEFAULT_MAX_TRANSFER,
        };

        Ok(SimulationGroup {
            config,
            honest_miners,
            attacker_counts,
            rounds,
            repeat_all,
            attack_round,
            target_depth,
            addresses,
            max_transfer,
            names: names.unwrap_or_else(|| Box::new(NumberedNames::new())),
            seeds: seeds.unwrap_or_else(|| Box::new(RandomSeeds::new())),
        })
    }
}
