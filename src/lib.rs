//! Road-network speed planning as weighted constraint optimization.
//!
//! A road network is a set of segments, each with a legal limit and a
//! danger classification, joined by adjacency. The crate recommends one
//! speed per segment:
//!
//! - **Network**: segments, speed domains, danger resolution and
//!   adjacency, built through [`network::NetworkBuilder`].
//! - **Constraint model**: limit, continuity and efficiency cost
//!   functions compiled into a [`constraint::ConstraintModel`] behind the
//!   [`constraint::CostModel`] trait.
//! - **Branch-and-bound (B&B)**: exact depth-first search that returns the
//!   minimum-cost assignment below a bound.
//! - **Stochastic local search (SLS)**: random single-segment moves that
//!   maximize aggregate speed under a violation budget.
//!
//! Both solvers are generic over [`constraint::CostModel`] and know
//! nothing about roads.
//!
//! # Example
//!
//! ```
//! use u_speedplan::bnb::{BnbConfig, BnbRunner};
//! use u_speedplan::constraint::{ConstraintConfig, ConstraintModel};
//! use u_speedplan::network::{Network, SegmentSpec};
//!
//! let network = Network::builder()
//!     .segment(SegmentSpec::limited("A", 90))
//!     .segment(SegmentSpec::dangerous("B"))
//!     .build()
//!     .unwrap();
//! let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
//!
//! let result = BnbRunner::run(&model, &BnbConfig::default()).unwrap();
//! let best = result.solution.unwrap();
//! assert!(best.values[1] <= 50);
//! ```

pub mod bnb;
pub mod constraint;
pub mod error;
pub mod network;
pub mod sls;
pub mod solution;

#[cfg(test)]
mod testing;

pub use error::{ConfigResult, ConfigurationError};
