/*!
Re-export of common values and datatypes

Must be imported manually.

```
use rewrite_sim::prelude::*;
```
*/

use crate::{
    address, blockchain, chain, fork, hash, ledger, miner, model, results,
    seed, simulation, tie_breaker, transaction,
};

pub use address::{find_address, Address};

pub use blockchain::{
    Block, BlockData, BlockId, BlockInsertionError, BlockLink, BlockTree,
};

pub use chain::Chain;

pub use fork::{erasable_blocks, malicious_block_to_mine, ForkPreference};

pub use hash::{meets_difficulty, Difficulty};

pub use ledger::{
    balance_for, confirmed_chain, is_valid_tx, next_tx, validate_tx,
    TxValidationError,
};

pub use miner::{Miner, MinerId};

pub use model::{Config, Event, MinedBlock, Model};

pub use results::{Average, Format, ResultsBuilder, ResultsTable};

pub use seed::{FixedSeeds, NameSource, NumberedNames, RandomSeeds, SeedSource};

pub use simulation::{
    SimulationBuildError, SimulationBuilder, SimulationGroup, SimulationOutput,
};

pub use tie_breaker::TieBreaker;

pub use transaction::Transaction;
