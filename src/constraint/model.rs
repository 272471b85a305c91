//! Constraint model derived from a road network.

use std::collections::BTreeMap;

use log::debug;

use super::config::ConstraintConfig;
use super::cost::CostFunction;
use super::types::CostModel;
use crate::error::ConfigResult;
use crate::network::Network;
use crate::solution::{Assignment, Recommendation, Solution};

/// A weighted constraint over an ordered scope of segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    scope: Vec<usize>,
    function: CostFunction,
    label: String,
}

impl Constraint {
    /// Creates a constraint over `scope`.
    pub fn new(scope: Vec<usize>, function: CostFunction, label: impl Into<String>) -> Self {
        Self {
            scope,
            function,
            label: label.into(),
        }
    }

    /// Variables the constraint reads, in order.
    pub fn scope(&self) -> &[usize] {
        &self.scope
    }

    /// The cost function.
    pub fn function(&self) -> &CostFunction {
        &self.function
    }

    /// Human-readable label such as `limit(Seg_0)`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cost under `assignment`, or `None` while a scope member is unassigned.
    #[inline]
    pub fn cost(&self, assignment: &Assignment) -> Option<f64> {
        match self.function {
            CostFunction::UnaryLimit { .. } => {
                Some(self.function.unary(assignment.get(self.scope[0])?))
            }
            CostFunction::Continuity { .. } => Some(self.function.pair(
                assignment.get(self.scope[0])?,
                assignment.get(self.scope[1])?,
            )),
            CostFunction::GlobalEfficiency { .. } => {
                let mut sum = 0u64;
                for &var in &self.scope {
                    sum += u64::from(assignment.get(var)?);
                }
                Some(self.function.aggregate(sum))
            }
        }
    }

    /// Covered, not an objective, and costing more than `threshold`.
    #[inline]
    pub fn is_violated(&self, assignment: &Assignment, threshold: f64) -> bool {
        !self.function.is_objective()
            && self
                .cost(assignment)
                .is_some_and(|cost| cost > threshold)
    }

    /// Lowest cost any completion of `assignment` can give this constraint.
    /// Zero once the scope is covered, since the cost is then already known.
    fn optimistic_cost(&self, assignment: &Assignment, domain_max: &[u64]) -> f64 {
        match self.function {
            CostFunction::GlobalEfficiency { .. } => {
                let mut sum = 0u64;
                let mut open = false;
                for &var in &self.scope {
                    match assignment.get(var) {
                        Some(v) => sum += u64::from(v),
                        None => {
                            open = true;
                            sum += domain_max[var];
                        }
                    }
                }
                if open {
                    self.function.aggregate(sum)
                } else {
                    0.0
                }
            }
            CostFunction::UnaryLimit { .. } | CostFunction::Continuity { .. } => 0.0,
        }
    }
}

/// The road network together with its derived constraints.
///
/// Built deterministically: one limit constraint per segment (in segment
/// order), one continuity constraint per adjacent pair (in pair order),
/// then one global efficiency constraint over every segment.
///
/// # Examples
///
/// ```
/// use u_speedplan::constraint::{ConstraintConfig, ConstraintModel, CostModel};
/// use u_speedplan::network::{Network, SpeedDomain};
/// use u_speedplan::solution::Assignment;
///
/// let network = Network::from_limits(&[50, 90], SpeedDomain::default()).unwrap();
/// let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
/// assert_eq!(model.constraints().len(), 4);
///
/// let cost = model.evaluate(&Assignment::complete(&[50, 70]));
/// assert!(cost > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    network: Network,
    constraints: Vec<Constraint>,
    by_variable: Vec<Vec<usize>>,
    objectives: Vec<usize>,
    domain_max: Vec<u64>,
    violation_threshold: f64,
}

impl ConstraintModel {
    /// Derives the constraint set of `network`.
    pub fn build(network: Network, config: &ConstraintConfig) -> ConfigResult<Self> {
        config.validate()?;

        let n = network.len();
        let mut constraints = Vec::with_capacity(n + network.adjacent_pairs().len() + 1);

        for (i, segment) in network.segments().iter().enumerate() {
            constraints.push(Constraint::new(
                vec![i],
                CostFunction::UnaryLimit {
                    limit: segment.limit(),
                    hard: segment.danger().is_hard(),
                    offset: config.limit_offset,
                },
                format!("limit({})", segment.id()),
            ));
        }

        for &(a, b) in network.adjacent_pairs() {
            constraints.push(Constraint::new(
                vec![a, b],
                CostFunction::Continuity {
                    cap: config.continuity_cap,
                    penalty: config.jump_penalty,
                },
                format!(
                    "continuity({},{})",
                    network.segment(a).id(),
                    network.segment(b).id()
                ),
            ));
        }

        // Raising the base keeps the efficiency cost non-negative even at
        // the fastest possible assignment.
        let base = config
            .efficiency_base
            .max(network.max_aggregate_speed() as f64 / config.efficiency_divisor);
        constraints.push(Constraint::new(
            (0..n).collect(),
            CostFunction::GlobalEfficiency {
                base,
                divisor: config.efficiency_divisor,
            },
            "efficiency",
        ));

        let mut by_variable = vec![Vec::new(); n];
        let mut objectives = Vec::new();
        for (c, constraint) in constraints.iter().enumerate() {
            for &var in constraint.scope() {
                by_variable[var].push(c);
            }
            if constraint.function().is_objective() {
                objectives.push(c);
            }
        }

        let domain_max = network
            .segments()
            .iter()
            .map(|s| u64::from(s.domain().max().unwrap_or(0)))
            .collect();

        debug!(
            "built constraint model: {} variables, {} constraints",
            n,
            constraints.len()
        );

        Ok(Self {
            network,
            constraints,
            by_variable,
            objectives,
            domain_max,
            violation_threshold: config.violation_threshold,
        })
    }

    /// The network the model was built from.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// All constraints in build order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints whose scope contains `var`.
    pub fn constraints_of(&self, var: usize) -> impl Iterator<Item = &Constraint> + '_ {
        self.by_variable[var].iter().map(|&c| &self.constraints[c])
    }

    /// Cost above which a constraint counts as violated.
    pub fn violation_threshold(&self) -> f64 {
        self.violation_threshold
    }

    /// Evaluates a complete set of speeds.
    pub fn solution(&self, values: Vec<u32>) -> Solution {
        Solution::evaluate(self, values)
    }

    /// `(label, cost)` for every covered constraint, in model order.
    pub fn breakdown(&self, assignment: &Assignment) -> Vec<(&str, f64)> {
        self.constraints
            .iter()
            .filter_map(|c| c.cost(assignment).map(|cost| (c.label(), cost)))
            .collect()
    }

    /// Covered constraints in violation, in model order.
    pub fn violated(&self, assignment: &Assignment) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.is_violated(assignment, self.violation_threshold))
            .collect()
    }

    /// `{segment_id -> speed}` view of a solution.
    pub fn speeds_by_id(&self, solution: &Solution) -> BTreeMap<String, u32> {
        self.network
            .segments()
            .iter()
            .zip(&solution.values)
            .map(|(segment, &speed)| (segment.id().to_string(), speed))
            .collect()
    }

    /// One recommended-speed record per segment.
    pub fn recommendations(&self, solution: &Solution) -> Vec<Recommendation> {
        self.network
            .segments()
            .iter()
            .zip(&solution.values)
            .map(|(segment, &speed)| Recommendation {
                segment_id: segment.id().to_string(),
                speed,
                legal_limit: segment.legal_limit(),
                danger: segment.danger(),
                exceeds_limit: speed > segment.limit(),
            })
            .collect()
    }
}

impl CostModel for ConstraintModel {
    fn variable_count(&self) -> usize {
        self.network.len()
    }

    fn domain(&self, var: usize) -> &[u32] {
        self.network.segment(var).domain().values()
    }

    fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.constraints
            .iter()
            .filter_map(|c| c.cost(assignment))
            .sum()
    }

    fn evaluate_completed_by(&self, assignment: &Assignment, var: usize) -> f64 {
        self.by_variable[var]
            .iter()
            .filter_map(|&c| self.constraints[c].cost(assignment))
            .sum()
    }

    fn violation_count(&self, assignment: &Assignment) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.is_violated(assignment, self.violation_threshold))
            .count()
    }

    fn violations_involving(&self, assignment: &Assignment, var: usize) -> usize {
        self.by_variable[var]
            .iter()
            .filter(|&&c| self.constraints[c].is_violated(assignment, self.violation_threshold))
            .count()
    }

    fn remaining_lower_bound(&self, assignment: &Assignment) -> f64 {
        self.objectives
            .iter()
            .map(|&c| self.constraints[c].optimistic_cost(assignment, &self.domain_max))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Danger, SegmentSpec, SpeedDomain};
    use proptest::prelude::*;

    fn scenario() -> ConstraintModel {
        let network = Network::from_limits(&[50, 50, 90, 130], SpeedDomain::default()).unwrap();
        ConstraintModel::build(network, &ConstraintConfig::default()).unwrap()
    }

    #[test]
    fn test_constraint_layout() {
        let model = scenario();
        let labels: Vec<&str> = model.constraints().iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "limit(Seg_0)",
                "limit(Seg_1)",
                "limit(Seg_2)",
                "limit(Seg_3)",
                "continuity(Seg_0,Seg_1)",
                "continuity(Seg_1,Seg_2)",
                "continuity(Seg_2,Seg_3)",
                "efficiency",
            ]
        );
        assert_eq!(model.constraints()[7].scope(), &[0, 1, 2, 3]);
        assert_eq!(model.constraints_of(1).count(), 4);
    }

    #[test]
    fn test_single_segment_has_no_continuity() {
        let network = Network::from_limits(&[70], SpeedDomain::default()).unwrap();
        let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
        assert_eq!(model.constraints().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let network = Network::from_limits(&[70], SpeedDomain::default()).unwrap();
        let config = ConstraintConfig::default().with_efficiency_divisor(-2.0);
        assert!(ConstraintModel::build(network, &config).is_err());
    }

    #[test]
    fn test_evaluate_scenario_assignment() {
        let model = scenario();
        let a = Assignment::complete(&[50, 50, 70, 90]);
        let expected = 2.0 * 20.0 / 21.0 + (1000.0 - 260.0 / 5.0);
        assert!((model.evaluate(&a) - expected).abs() < 1e-9);
        assert_eq!(model.violation_count(&a), 0);
    }

    #[test]
    fn test_partial_assignment_skips_uncovered() {
        let model = scenario();
        let mut a = Assignment::empty(4);
        a.assign(0, 60);
        // limit(Seg_0) only: 50 + 10
        assert!((model.evaluate(&a) - 60.0).abs() < 1e-12);
        a.assign(1, 100);
        assert!((model.evaluate_completed_by(&a, 1) - (50.0 + 50.0 + 100.0)).abs() < 1e-12);
    }

    #[test]
    fn test_violations() {
        let model = scenario();
        let a = Assignment::complete(&[60, 50, 90, 90]);
        let labels: Vec<&str> = model.violated(&a).iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["limit(Seg_0)", "continuity(Seg_1,Seg_2)"]);
        assert_eq!(model.violation_count(&a), 2);
        assert_eq!(model.violations_involving(&a, 2), 1);
        assert_eq!(model.violations_involving(&a, 3), 0);
    }

    #[test]
    fn test_hard_limit_violation_is_infinite() {
        let network = Network::builder()
            .segment(SegmentSpec::dangerous("d"))
            .build()
            .unwrap();
        let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
        let a = Assignment::complete(&[60]);
        assert!(model.evaluate(&a).is_infinite());
        assert_eq!(model.violation_count(&a), 1);
    }

    #[test]
    fn test_efficiency_never_negative() {
        let network = Network::builder()
            .segments((0..50).map(|i| SegmentSpec::unrestricted(format!("s{i}"))))
            .build()
            .unwrap();
        let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
        let fastest = Assignment::complete(&[130; 50]);
        assert!(model.evaluate(&fastest) >= 0.0);
    }

    #[test]
    fn test_breakdown_and_recommendations() {
        let model = scenario();
        let solution = model.solution(vec![60, 50, 70, 90]);
        let breakdown = model.breakdown(&Assignment::complete(&solution.values));
        assert_eq!(breakdown.len(), model.constraints().len());
        assert_eq!(breakdown[0], ("limit(Seg_0)", 60.0));

        let recs = model.recommendations(&solution);
        assert!(recs[0].exceeds_limit);
        assert!(!recs[1].exceeds_limit);
        assert_eq!(recs[2].legal_limit, Some(90));
        assert_eq!(recs[3].danger, Danger::Soft);

        let speeds = model.speeds_by_id(&solution);
        assert_eq!(speeds["Seg_2"], 70);
    }

    #[test]
    fn test_remaining_lower_bound_is_admissible() {
        let model = scenario();
        let mut a = Assignment::empty(4);
        a.assign(0, 50);
        a.assign(1, 40);
        let bound = model.remaining_lower_bound(&a);
        for v2 in model.domain(2) {
            for v3 in model.domain(3) {
                let full = Assignment::complete(&[50, 40, *v2, *v3]);
                let added = model.evaluate(&full) - model.evaluate(&a);
                assert!(bound <= added + 1e-9);
            }
        }
        assert_eq!(model.remaining_lower_bound(&Assignment::complete(&[10; 4])), 0.0);
    }

    fn arb_network() -> impl Strategy<Value = Network> {
        prop::collection::vec((10u32..=130, any::<bool>()), 1..6).prop_map(|specs| {
            Network::builder()
                .segments(specs.into_iter().enumerate().map(|(i, (limit, dangerous))| {
                    if dangerous {
                        SegmentSpec::dangerous_with_limit(format!("s{i}"), limit)
                    } else {
                        SegmentSpec::limited(format!("s{i}"), limit)
                    }
                }))
                .build()
                .unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(network in arb_network(), seed_values in prop::collection::vec(1u32..=13, 6)) {
            let first = ConstraintModel::build(network.clone(), &ConstraintConfig::default()).unwrap();
            let second = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
            prop_assert_eq!(first.constraints(), second.constraints());

            let n = first.variable_count();
            let values: Vec<u32> = seed_values.iter().take(n).map(|k| k * 10).collect();
            let a = Assignment::complete(&values);
            prop_assert_eq!(first.evaluate(&a).to_bits(), second.evaluate(&a).to_bits());
        }

        #[test]
        fn prop_cost_monotone_under_extension(network in arb_network(), seed_values in prop::collection::vec(1u32..=13, 6)) {
            let model = ConstraintModel::build(network, &ConstraintConfig::default()).unwrap();
            let n = model.variable_count();
            let mut a = Assignment::empty(n);
            let mut previous = model.evaluate(&a);
            for (var, k) in seed_values.iter().take(n).enumerate() {
                a.assign(var, k * 10);
                let current = model.evaluate(&a);
                prop_assert!(current >= previous);
                previous = current;
            }
        }
    }
}
