//! Depth-first branch-and-bound.
//!
//! # Algorithm
//!
//! 1. Assign variables in index order, one recursion level per variable.
//! 2. For each domain value, add the cost of every constraint that just
//!    became fully covered to the running partial cost.
//! 3. Prune when the partial cost (plus the optional lookahead estimate)
//!    is not strictly below the incumbent bound. Costs are non-negative,
//!    so a pruned branch can never beat the incumbent.
//! 4. At a leaf, a cheaper assignment becomes the incumbent and tightens
//!    the bound.
//!
//! Run to completion, the incumbent is the global optimum below the
//! caller's initial bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::config::{BnbConfig, ValueOrder};
use crate::constraint::CostModel;
use crate::error::ConfigResult;
use crate::solution::{Assignment, Solution};

/// Nodes between two wall-clock checks.
const CLOCK_CHECK_INTERVAL: u64 = 128;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The whole tree was explored or pruned.
    Exhausted,
    /// An incumbent reached the configured target cost.
    TargetReached,
    /// The cancellation flag was raised.
    Cancelled,
    /// The time limit elapsed.
    TimeLimit,
}

/// Search statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbStats {
    /// Recursive calls made.
    pub nodes_explored: u64,
    /// Branches cut because they could not beat the bound.
    pub prunings_bound: u64,
    /// Incumbent improvements.
    pub solutions_found: u64,
    /// Deepest level reached.
    pub max_depth: usize,
    /// Wall-clock time in milliseconds.
    pub elapsed_ms: u64,
}

/// Result of a branch-and-bound run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbResult {
    /// Best solution below the initial bound, if any.
    pub solution: Option<Solution>,
    /// Why the search stopped.
    pub termination: Termination,
    /// Search statistics.
    pub stats: BnbStats,
}

impl BnbResult {
    /// The solution (or its absence) is proven optimal below the bound.
    pub fn is_proven_optimal(&self) -> bool {
        self.termination == Termination::Exhausted
    }
}

/// Exact optimizer over a [`CostModel`].
///
/// # Examples
///
/// ```
/// use u_speedplan::bnb::BranchAndBound;
/// use u_speedplan::constraint::{ConstraintConfig, ConstraintModel};
/// use u_speedplan::network::{Network, SpeedDomain};
///
/// let network = Network::from_limits(&[50, 50, 90, 130], SpeedDomain::default()).unwrap();
/// let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
///
/// let best = BranchAndBound::new(&model).optimize(f64::INFINITY).unwrap();
/// assert_eq!(best.values, vec![50, 50, 70, 90]);
/// ```
#[derive(Debug)]
pub struct BranchAndBound<'a, M: CostModel + ?Sized> {
    model: &'a M,
    config: BnbConfig,
}

impl<'a, M: CostModel + ?Sized> BranchAndBound<'a, M> {
    /// Creates a solver with the default configuration.
    pub fn new(model: &'a M) -> Self {
        Self::with_config(model, BnbConfig::default())
    }

    /// Creates a solver with `config`. Its initial bound is replaced by the one passed to [`optimize`](Self::optimize).
    pub fn with_config(model: &'a M, config: BnbConfig) -> Self {
        Self { model, config }
    }

    /// Searches for the cheapest assignment strictly below `bound`.
    ///
    /// Returns `None` when no assignment beats `bound`. This is a normal
    /// outcome; retry with a larger bound if needed.
    pub fn optimize(&self, bound: f64) -> Option<Solution> {
        let config = BnbConfig {
            initial_bound: bound,
            ..self.config.clone()
        };
        Search::new(self.model, &config, None).run().solution
    }
}

/// Executes branch-and-bound with limits and cancellation.
#[derive(Debug)]
pub struct BnbRunner;

impl BnbRunner {
    /// Runs the exact solver.
    pub fn run<M: CostModel + ?Sized>(model: &M, config: &BnbConfig) -> ConfigResult<BnbResult> {
        Self::run_with_cancel(model, config, None)
    }

    /// Runs the exact solver with an optional cancellation token.
    ///
    /// The token is checked at every recursive call.
    pub fn run_with_cancel<M: CostModel + ?Sized>(
        model: &M,
        config: &BnbConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> ConfigResult<BnbResult> {
        config.validate()?;
        Ok(Search::new(model, config, cancel.as_deref()).run())
    }
}

struct Search<'a, M: CostModel + ?Sized> {
    model: &'a M,
    config: &'a BnbConfig,
    cancel: Option<&'a AtomicBool>,
    deadline: Option<Instant>,
    started: Instant,
    assignment: Assignment,
    bound: f64,
    incumbent: Option<Vec<u32>>,
    stats: BnbStats,
    stop: Option<Termination>,
}

impl<'a, M: CostModel + ?Sized> Search<'a, M> {
    fn new(model: &'a M, config: &'a BnbConfig, cancel: Option<&'a AtomicBool>) -> Self {
        let started = Instant::now();
        Self {
            model,
            config,
            cancel,
            deadline: config
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
            started,
            assignment: Assignment::empty(model.variable_count()),
            bound: config.initial_bound,
            incumbent: None,
            stats: BnbStats::default(),
            stop: None,
        }
    }

    fn run(mut self) -> BnbResult {
        self.descend(0, 0.0);

        let termination = self.stop.unwrap_or(Termination::Exhausted);
        self.stats.elapsed_ms = self.started.elapsed().as_millis() as u64;
        let solution = self
            .incumbent
            .map(|values| Solution::evaluate(self.model, values));

        info!(
            "branch-and-bound finished ({:?}): {} nodes, {} prunings, best cost {:?}",
            termination,
            self.stats.nodes_explored,
            self.stats.prunings_bound,
            solution.as_ref().map(|s| s.total_cost)
        );

        BnbResult {
            solution,
            termination,
            stats: self.stats,
        }
    }

    fn descend(&mut self, var: usize, partial: f64) {
        if self.should_stop() {
            return;
        }
        self.stats.nodes_explored += 1;
        self.stats.max_depth = self.stats.max_depth.max(var);

        let model = self.model;
        if var == model.variable_count() {
            self.record(partial);
            return;
        }

        let domain = model.domain(var);
        for k in 0..domain.len() {
            let value = match self.config.value_order {
                ValueOrder::Ascending => domain[k],
                ValueOrder::Descending => domain[domain.len() - 1 - k],
            };
            self.assignment.assign(var, value);

            let cost = partial + model.evaluate_completed_by(&self.assignment, var);
            let estimate = if self.config.lookahead {
                cost + model.remaining_lower_bound(&self.assignment)
            } else {
                cost
            };
            if estimate >= self.bound {
                self.stats.prunings_bound += 1;
                continue;
            }

            self.descend(var + 1, cost);
            if self.stop.is_some() {
                break;
            }
        }
        self.assignment.unassign(var);
    }

    fn record(&mut self, cost: f64) {
        if cost.is_nan() || cost >= self.bound {
            return;
        }
        self.bound = cost;
        self.incumbent = self.assignment.to_values();
        self.stats.solutions_found += 1;
        debug!(
            "new incumbent #{} with cost {:.4} after {} nodes",
            self.stats.solutions_found, cost, self.stats.nodes_explored
        );

        if self.config.target_cost.is_some_and(|target| cost <= target) {
            self.stop = Some(Termination::TargetReached);
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.stop.is_some() {
            return true;
        }
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            self.stop = Some(Termination::Cancelled);
            return true;
        }
        if let Some(deadline) = self.deadline {
            if self.stats.nodes_explored % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                self.stop = Some(Termination::TimeLimit);
                return true;
            }
        }
        false
    }
}
