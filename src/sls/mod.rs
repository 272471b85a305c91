//! Heuristic optimizer: stochastic local search.
//!
//! Mutates one complete assignment by random single-segment moves,
//! maximizing aggregate speed subject to a violation budget. Moves that
//! push violations over budget are usually reverted but occasionally kept,
//! which lets the search leave plateaus.
//!
//! All randomness comes from a caller-supplied generator or seed.
//!
//! # References
//!
//! Hoos & Stützle (2004), "Stochastic Local Search: Foundations and Applications"

mod config;
mod runner;

pub use config::SlsConfig;
pub use runner::{LocalSearch, SlsOutcome, SlsResult, SlsRunner, SlsStats};
