/*!
Sources of round seeds and address names

The simulation never generates randomness or names on its own. A
[`Simulation`](crate::simulation::Simulation) pulls them from a
[`SeedSource`] and a [`NameSource`] and feeds them to its
[`Model`](crate::model::Model) as events.
*/

use std::fmt::Debug;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Supplies the seed of each mining round.
pub trait SeedSource: Debug + dyn_clone::DynClone + Send + Sync {
    /// Returns the seed of the next round.
    fn next_seed(&mut self) -> u64;
}

dyn_clone::clone_trait_object!(SeedSource);

/// Supplies human readable labels for new addresses.
pub trait NameSource: Debug + dyn_clone::DynClone + Send + Sync {
    /// Returns `count` names.
    fn names(&mut self, count: usize) -> Vec<String>;
}

dyn_clone::clone_trait_object!(NameSource);

/// Replays a fixed list of seeds, starting over after the last one.
#[derive(Debug, Clone)]
pub struct FixedSeeds {
    seeds: Vec<u64>,
    next: usize,
}

impl FixedSeeds {
    /// ## Panics
    /// Panics if `seeds` is empty.
    pub fn new<I: IntoIterator<Item = u64>>(seeds: I) -> Self {
        let seeds: Vec<_> = seeds.into_iter().collect();
        assert!(!seeds.is_empty(), "FixedSeeds needs at least one seed");

        FixedSeeds { seeds, next: 0 }
    }
}

impl SeedSource for FixedSeeds {
    fn next_seed(&mut self) -> u64 {
        let seed = self.seeds[self.next];
        self.next = (self.next + 1) % self.seeds.len();

        seed
    }
}

/// Draws seeds from a [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomSeeds {
    rng: StdRng,
}

impl RandomSeeds {
    /// Seeds drawn from an entropy-seeded generator.
    pub fn new() -> Self {
        RandomSeeds { rng: StdRng::from_entropy() }
    }

    /// Reproducible seeds derived from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        RandomSeeds { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomSeeds {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedSource for RandomSeeds {
    fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Names of the form "Address 1", "Address 2", and so on.
#[derive(Debug, Default, Clone)]
pub struct NumberedNames {
    issued: usize,
}

impl NumberedNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameSource for NumberedNames {
    fn names(&mut self, count: usize) -> Vec<String> {
        let start = self.issued + 1;
        self.issued += count;

        (start..=self.issued).map(|n| format!("Address {}", n)).collect()
    }
}

/// Hands out the listed names in order. Once exhausted, falls back to
/// [`NumberedNames`].
impl NameSource for Vec<String> {
    fn names(&mut self, count: usize) -> Vec<String> {
        let take = count.min(self.len());
        let mut names: Vec<_> = self.drain(..take).collect();
        names.extend(
            NumberedNames { issued: names.len() }.names(count - take),
        );

        names
    }
}
