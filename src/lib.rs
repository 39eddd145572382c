/*!
Simulator for longest-chain mining and history-rewriting attacks.

Miners extend a tree of blocks, each recording one transfer between addresses.
Honest miners always extend the longest chain. Attacking miners pick a block
on the longest chain and try to grow a competing branch which excludes it.
Balances are never stored; they are replayed from chain history whenever a
transaction is validated.

The [`model`] module holds the simulation state and its event-driven
transitions. The [`simulation`] and [`results`] modules run repeated attacks
and summarize how often they succeed.
*/

pub mod address;
pub mod blockchain;
pub mod chain;
pub mod fork;
pub mod hash;
pub mod ledger;
pub mod miner;
pub mod model;
pub mod prelude;
pub mod results;
pub mod seed;
pub mod simulation;
pub mod tie_breaker;
pub mod transaction;

pub(crate) mod utils;
