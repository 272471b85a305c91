//! Assignments and solver results.

use std::cmp::Ordering;

use crate::constraint::CostModel;
use crate::network::Danger;

/// Mapping from segment index to chosen speed.
///
/// Partial while the exact solver descends, complete at a leaf. The local
/// search always works on complete assignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: Vec<Option<u32>>,
}

impl Assignment {
    /// An assignment with every segment unassigned.
    pub fn empty(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// A complete assignment.
    pub fn complete(values: &[u32]) -> Self {
        Self {
            values: values.iter().copied().map(Some).collect(),
        }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `var`, if assigned.
    #[inline]
    pub fn get(&self, var: usize) -> Option<u32> {
        self.values[var]
    }

    /// Assigns `value` to `var`.
    #[inline]
    pub fn assign(&mut self, var: usize, value: u32) {
        self.values[var] = Some(value);
    }

    /// Clears `var`.
    #[inline]
    pub fn unassign(&mut self, var: usize) {
        self.values[var] = None;
    }

    /// Number of assigned variables.
    pub fn assigned_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// True when every variable is assigned.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Whether every variable in `scope` is assigned.
    pub fn covers(&self, scope: &[usize]) -> bool {
        scope.iter().all(|&var| self.values[var].is_some())
    }

    /// Sum of the assigned speeds.
    pub fn aggregate_speed(&self) -> u64 {
        self.values.iter().flatten().map(|&v| u64::from(v)).sum()
    }

    /// The speeds, if the assignment is complete.
    pub fn to_values(&self) -> Option<Vec<u32>> {
        self.values.iter().copied().collect()
    }
}

/// A complete assignment with its quality metrics.
///
/// `total_cost` sums every constraint and is never negative (it is
/// infinite when a hard limit is exceeded).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Speed per segment, indexed like the network's segments.
    pub values: Vec<u32>,
    /// Sum of all constraint costs. Serialized as `null` when infinite.
    #[cfg_attr(feature = "serde", serde(with = "crate::solution::cost_serde"))]
    pub total_cost: f64,
    /// Number of violated constraints.
    pub violation_count: usize,
    /// Sum of all speeds.
    pub aggregate_speed: u64,
}

impl Solution {
    /// Evaluates a complete set of speeds against `model`.
    pub fn evaluate<M: CostModel + ?Sized>(model: &M, values: Vec<u32>) -> Self {
        let assignment = Assignment::complete(&values);
        Self {
            total_cost: model.evaluate(&assignment),
            violation_count: model.violation_count(&assignment),
            aggregate_speed: assignment.aggregate_speed(),
            values,
        }
    }

    /// Speed of segment `var`.
    pub fn speed(&self, var: usize) -> u32 {
        self.values[var]
    }

    /// Mean speed over all segments.
    pub fn mean_speed(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.aggregate_speed as f64 / self.values.len() as f64
        }
    }

    /// Ascending total cost, the order the exact solver optimizes.
    pub fn cmp_by_cost(&self, other: &Self) -> Ordering {
        self.total_cost.total_cmp(&other.total_cost)
    }

    /// Fewer violations first, then higher aggregate speed: the order the
    /// local search optimizes.
    pub fn cmp_by_throughput(&self, other: &Self) -> Ordering {
        self.violation_count
            .cmp(&other.violation_count)
            .then_with(|| other.aggregate_speed.cmp(&self.aggregate_speed))
    }
}

/// Costs are non-negative, so a missing value stands for `+inf`.
#[cfg(feature = "serde")]
pub(crate) mod cost_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cost: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if cost.is_finite() {
            serializer.serialize_some(cost)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// A recommended speed for one segment, as a flat record.
///
/// This is the fact a downstream rule layer consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    /// Segment name.
    pub segment_id: String,
    /// Recommended speed.
    pub speed: u32,
    /// Legal limit, if the segment has one.
    pub legal_limit: Option<u32>,
    /// Danger classification.
    pub danger: Danger,
    /// The speed exceeds the effective limit of the segment.
    pub exceeds_limit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_lifecycle() {
        let mut a = Assignment::empty(3);
        assert!(!a.is_complete());
        a.assign(0, 50);
        a.assign(2, 70);
        assert_eq!(a.assigned_count(), 2);
        assert!(a.covers(&[0, 2]));
        assert!(!a.covers(&[0, 1]));
        assert_eq!(a.aggregate_speed(), 120);
        assert_eq!(a.to_values(), None);

        a.assign(1, 60);
        assert_eq!(a.to_values(), Some(vec![50, 60, 70]));
        a.unassign(1);
        assert_eq!(a.get(1), None);
    }

    fn sol(cost: f64, violations: usize, speed: u64) -> Solution {
        Solution {
            values: vec![],
            total_cost: cost,
            violation_count: violations,
            aggregate_speed: speed,
        }
    }

    #[test]
    fn test_orderings() {
        assert_eq!(sol(1.0, 0, 0).cmp_by_cost(&sol(2.0, 0, 0)), Ordering::Less);
        assert_eq!(
            sol(f64::INFINITY, 0, 0).cmp_by_cost(&sol(1e9, 0, 0)),
            Ordering::Greater
        );
        assert_eq!(
            sol(0.0, 0, 100).cmp_by_throughput(&sol(0.0, 0, 200)),
            Ordering::Greater
        );
        assert_eq!(
            sol(0.0, 0, 100).cmp_by_throughput(&sol(0.0, 1, 500)),
            Ordering::Less
        );
    }

    #[test]
    fn test_mean_speed() {
        let s = Solution {
            values: vec![50, 70],
            total_cost: 0.0,
            violation_count: 0,
            aggregate_speed: 120,
        };
        assert!((s.mean_speed() - 60.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_recommendation_serde() {
        let rec = Recommendation {
            segment_id: "Seg_0".into(),
            speed: 50,
            legal_limit: Some(50),
            danger: Danger::Soft,
            exceeds_limit: false,
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_solution_serde_keeps_infinite_cost() {
        let hard = Solution {
            values: vec![60],
            total_cost: f64::INFINITY,
            violation_count: 1,
            aggregate_speed: 60,
        };
        let json = serde_json::to_string(&hard).unwrap();
        assert!(json.contains("\"total_cost\":null"));
        let back: Solution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hard);

        let finite = sol(12.5, 0, 50);
        let back: Solution = serde_json::from_str(&serde_json::to_string(&finite).unwrap()).unwrap();
        assert_eq!(back, finite);
    }
}
