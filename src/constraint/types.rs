//! The evaluation contract shared by both solvers.

use crate::solution::Assignment;

/// Additive cost model over a fixed set of finite-domain variables.
///
/// Only constraints whose scope is fully covered by an assignment
/// contribute to its cost. Costs are non-negative, so extending an
/// assignment never lowers its cost; branch-and-bound pruning relies on
/// this.
///
/// [`ConstraintModel`](super::ConstraintModel) is the implementation used
/// for road networks. Solvers are generic over this trait.
pub trait CostModel {
    /// Number of decision variables.
    fn variable_count(&self) -> usize;

    /// Ascending domain of `var`.
    fn domain(&self, var: usize) -> &[u32];

    /// Total cost of every covered constraint.
    fn evaluate(&self, assignment: &Assignment) -> f64;

    /// Cost of the covered constraints whose scope contains `var`.
    ///
    /// Called right after `var` is assigned, this is exactly the cost
    /// added by constraints that just became fully covered.
    fn evaluate_completed_by(&self, assignment: &Assignment, var: usize) -> f64;

    /// Number of covered constraints in violation.
    fn violation_count(&self, assignment: &Assignment) -> usize;

    /// Number of covered, violated constraints whose scope contains `var`.
    fn violations_involving(&self, assignment: &Assignment, var: usize) -> usize;

    /// Optimistic cost of the constraints not yet covered.
    ///
    /// Must never exceed the cost any completion adds. The default is the
    /// trivial bound.
    fn remaining_lower_bound(&self, _assignment: &Assignment) -> f64 {
        0.0
    }
}
