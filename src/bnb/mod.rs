//! Exact optimizer: depth-first branch-and-bound.
//!
//! Explores assignments in a fixed variable order and prunes every branch
//! whose partial cost cannot beat the incumbent. Guarantees the global
//! optimum when run to completion; exponential in the worst case.
//!
//! # References
//!
//! Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"

mod config;
mod runner;

pub use config::{BnbConfig, ValueOrder};
pub use runner::{BnbResult, BnbRunner, BnbStats, BranchAndBound, Termination};
