//! Weighted constraint model.
//!
//! Derives unary limit, pairwise continuity and one global efficiency
//! constraint from a [`Network`](crate::network::Network), and exposes them
//! through the [`CostModel`] contract that both solvers consume.
//!
//! # Key Components
//!
//! - [`CostFunction`]: closed set of plain-data cost curves
//! - [`Constraint`]: scope + cost function + label
//! - [`ConstraintModel`]: the derived model, owning its network
//! - [`CostModel`]: additive evaluation contract

mod config;
mod cost;
mod model;
mod types;

pub use config::ConstraintConfig;
pub use cost::{CostFunction, HARD_VIOLATION_COST};
pub use model::{Constraint, ConstraintModel};
pub use types::CostModel;
