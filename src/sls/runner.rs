//! Local search loop and multi-restart runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::SlsConfig;
use crate::constraint::CostModel;
use crate::error::{ConfigResult, ConfigurationError};
use crate::solution::{Assignment, Solution};

/// Move counters of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlsStats {
    /// Within budget and a new best aggregate speed.
    pub improving_moves: usize,
    /// Within budget without improving the best.
    pub sideways_moves: usize,
    /// Over budget, kept anyway.
    pub accepted_worse_moves: usize,
    /// Over budget, undone.
    pub reverted_moves: usize,
    /// Stopped by the cancellation flag.
    pub cancelled: bool,
}

/// Result of one [`LocalSearch::search`] call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlsOutcome {
    /// Best solution observed. Over budget when no state within budget
    /// was ever reached.
    pub solution: Solution,
    /// Steps executed.
    pub steps: usize,
    /// Move counters.
    pub stats: SlsStats,
}

impl SlsOutcome {
    /// True when the solution carries at most `max_violations` violations.
    pub fn is_within(&self, max_violations: usize) -> bool {
        self.solution.violation_count <= max_violations
    }
}

/// Single-trajectory local search over a [`CostModel`].
///
/// The current assignment is always complete. The generator is owned by
/// the search; seed it for reproducible runs.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use u_speedplan::constraint::{ConstraintConfig, ConstraintModel};
/// use u_speedplan::network::{Network, SpeedDomain};
/// use u_speedplan::sls::LocalSearch;
///
/// let network = Network::from_limits(&[50, 70, 90], SpeedDomain::default()).unwrap();
/// let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
///
/// let mut search = LocalSearch::new(&model, StdRng::seed_from_u64(7));
/// let outcome = search.search(20_000, 0);
/// assert!(outcome.steps <= 20_000);
/// ```
#[derive(Debug)]
pub struct LocalSearch<'a, M: CostModel + ?Sized, R: Rng> {
    model: &'a M,
    rng: R,
    accept_worse_probability: f64,
    current: Assignment,
}

impl<'a, M: CostModel + ?Sized, R: Rng> LocalSearch<'a, M, R> {
    /// Creates a search and draws a random initial assignment.
    ///
    /// # Panics
    ///
    /// Panics if a variable of `model` has an empty domain.
    pub fn new(model: &'a M, rng: R) -> Self {
        let mut search = Self {
            model,
            rng,
            accept_worse_probability: SlsConfig::default().accept_worse_probability,
            current: Assignment::empty(model.variable_count()),
        };
        search.restart();
        search
    }

    /// Sets the probability of keeping an over-budget move. Clamped to `[0, 1]`.
    pub fn with_accept_worse_probability(mut self, p: f64) -> Self {
        self.accept_worse_probability = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self
    }

    /// Assigns every variable a value drawn uniformly from its domain.
    pub fn restart(&mut self) {
        let model = self.model;
        for var in 0..model.variable_count() {
            let domain = model.domain(var);
            let value = domain[self.rng.random_range(0..domain.len())];
            self.current.assign(var, value);
        }
    }

    /// The current assignment. Always complete.
    pub fn current(&self) -> &Assignment {
        &self.current
    }

    /// Searches for the fastest assignment with at most `max_violations`
    /// violations.
    ///
    /// Returns immediately if the current assignment is already within
    /// budget. Otherwise runs `max_steps` moves and returns the best
    /// solution observed, even if it never reached the budget.
    pub fn search(&mut self, max_steps: usize, max_violations: usize) -> SlsOutcome {
        self.search_with_cancel(max_steps, max_violations, None)
    }

    /// Like [`search`](Self::search), checking `cancel` before every step.
    pub fn search_with_cancel(
        &mut self,
        max_steps: usize,
        max_violations: usize,
        cancel: Option<&AtomicBool>,
    ) -> SlsOutcome {
        let model = self.model;
        let mut stats = SlsStats::default();
        let mut violations = model.violation_count(&self.current);
        let mut aggregate = self.current.aggregate_speed();

        if violations <= max_violations {
            debug!("initial assignment within budget: {violations} violations");
            return SlsOutcome {
                solution: self.snapshot(),
                steps: 0,
                stats,
            };
        }

        let n = model.variable_count();
        let mut best_within: Option<(Vec<u32>, u64)> = None;
        let mut least_violating = (self.values(), violations, aggregate);
        let mut steps = 0;

        while steps < max_steps {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                stats.cancelled = true;
                break;
            }
            steps += 1;

            let var = self.rng.random_range(0..n);
            let Some(old) = self.current.get(var) else {
                continue;
            };
            let Some(new) = self.propose(var, old) else {
                continue;
            };

            let before = model.violations_involving(&self.current, var);
            self.current.assign(var, new);
            let after = model.violations_involving(&self.current, var);
            let next_violations = violations + after - before;
            let next_aggregate = aggregate + u64::from(new) - u64::from(old);

            if next_violations <= max_violations {
                violations = next_violations;
                aggregate = next_aggregate;
                let improves = match &best_within {
                    Some((_, best)) => aggregate > *best,
                    None => true,
                };
                if improves {
                    debug!("step {steps}: new best aggregate speed {aggregate}");
                    best_within = Some((self.values(), aggregate));
                    stats.improving_moves += 1;
                } else {
                    stats.sideways_moves += 1;
                }
            } else if self.rng.random_bool(self.accept_worse_probability) {
                violations = next_violations;
                aggregate = next_aggregate;
                stats.accepted_worse_moves += 1;
            } else {
                self.current.assign(var, old);
                stats.reverted_moves += 1;
            }

            if violations < least_violating.1
                || (violations == least_violating.1 && aggregate > least_violating.2)
            {
                least_violating = (self.values(), violations, aggregate);
            }
        }

        let values = match best_within {
            Some((values, _)) => values,
            None => least_violating.0,
        };
        SlsOutcome {
            solution: Solution::evaluate(model, values),
            steps,
            stats,
        }
    }

    /// A value of `var`'s domain other than `old`, uniformly at random.
    fn propose(&mut self, var: usize, old: u32) -> Option<u32> {
        let model = self.model;
        let domain = model.domain(var);
        if domain.len() < 2 {
            return None;
        }
        match domain.binary_search(&old) {
            Ok(current) => {
                let mut k = self.rng.random_range(0..domain.len() - 1);
                if k >= current {
                    k += 1;
                }
                Some(domain[k])
            }
            Err(_) => Some(domain[self.rng.random_range(0..domain.len())]),
        }
    }

    fn values(&self) -> Vec<u32> {
        self.current.to_values().unwrap_or_default()
    }

    fn snapshot(&self) -> Solution {
        Solution::evaluate(self.model, self.values())
    }
}

/// Result of a multi-restart run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlsResult {
    /// Best solution across restarts: fewest violations, then highest
    /// aggregate speed, then lowest restart index.
    pub best: Solution,
    /// Index of the restart that produced `best`.
    pub best_restart: usize,
    /// Base seed actually used.
    pub seed: u64,
    /// Per-restart outcomes, in restart order.
    pub outcomes: Vec<SlsOutcome>,
}

impl SlsResult {
    /// Steps executed across all restarts.
    pub fn total_steps(&self) -> usize {
        self.outcomes.iter().map(|o| o.steps).sum()
    }
}

/// Executes independent, seeded local-search restarts.
///
/// With the `parallel` feature the restarts run on the rayon thread pool.
/// Results are identical either way.
#[derive(Debug)]
pub struct SlsRunner;

impl SlsRunner {
    /// Runs local search as configured.
    pub fn run<M: CostModel + Sync + ?Sized>(
        model: &M,
        config: &SlsConfig,
    ) -> ConfigResult<SlsResult> {
        Self::run_with_cancel(model, config, None)
    }

    /// Runs local search with an optional cancellation token, checked
    /// between steps.
    pub fn run_with_cancel<M: CostModel + Sync + ?Sized>(
        model: &M,
        config: &SlsConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> ConfigResult<SlsResult> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let cancel = cancel.as_deref();

        let run_one = |restart: usize| {
            let rng = StdRng::seed_from_u64(seed.wrapping_add(restart as u64));
            let mut search = LocalSearch::new(model, rng)
                .with_accept_worse_probability(config.accept_worse_probability);
            let outcome =
                search.search_with_cancel(config.max_steps, config.max_violations, cancel);
            debug!(
                "restart {restart}: {} violations, aggregate speed {}, {} steps",
                outcome.solution.violation_count, outcome.solution.aggregate_speed, outcome.steps
            );
            outcome
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<SlsOutcome> = (0..config.restarts).into_par_iter().map(run_one).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<SlsOutcome> = (0..config.restarts).map(run_one).collect();

        let (best_restart, best) = outcomes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.solution.cmp_by_throughput(&b.solution))
            .map(|(i, o)| (i, o.solution.clone()))
            .ok_or_else(|| {
                ConfigurationError::InvalidParameter(
                    "restarts must be at least 1".into(),
                )
            })?;

        info!(
            "local search finished: best restart {} of {}, {} violations, aggregate speed {}",
            best_restart,
            outcomes.len(),
            best.violation_count,
            best.aggregate_speed
        );

        Ok(SlsResult {
            best,
            best_restart,
            seed,
            outcomes,
        })
    }
}
