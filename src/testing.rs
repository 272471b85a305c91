//! Shared test fixtures.

use std::collections::BTreeMap;

use crate::constraint::{ConstraintConfig, ConstraintModel, CostModel};
use crate::network::{Adjacency, Network, SegmentSpec, SpeedDomain};
use crate::solution::Assignment;

/// Four soft-limited segments in a chain, limits `[50, 50, 90, 130]`.
pub(crate) fn scenario_model() -> ConstraintModel {
    let network = Network::from_limits(&[50, 50, 90, 130], SpeedDomain::default()).unwrap();
    ConstraintModel::build(network, &ConstraintConfig::default()).unwrap()
}

/// Five-segment chain with two dangerous segments and a coarse domain.
pub(crate) fn dangerous_chain_model() -> ConstraintModel {
    let network = Network::builder()
        .domain(SpeedDomain::new([30, 50, 70, 90]).unwrap())
        .segment(SegmentSpec::unrestricted("S0"))
        .segment(SegmentSpec::dangerous("S1"))
        .segment(SegmentSpec::unrestricted("S2"))
        .segment(SegmentSpec::dangerous("S3"))
        .segment(SegmentSpec::unrestricted("S4"))
        .build()
        .unwrap();
    ConstraintModel::build(network, &ConstraintConfig::default()).unwrap()
}

/// 2x2 grid with two dangerous segments.
pub(crate) fn grid_model() -> ConstraintModel {
    let mut map = BTreeMap::new();
    map.insert("A0".to_string(), vec!["A1".to_string(), "B0".to_string()]);
    map.insert("A1".to_string(), vec!["B1".to_string()]);
    map.insert("B0".to_string(), vec!["B1".to_string()]);
    let network = Network::builder()
        .domain(SpeedDomain::new([50, 70, 90, 110]).unwrap())
        .segment(SegmentSpec::limited("A0", 110))
        .segment(SegmentSpec::dangerous("A1"))
        .segment(SegmentSpec::limited("B0", 90))
        .segment(SegmentSpec::dangerous_with_limit("B1", 70))
        .adjacency(Adjacency::Explicit(map))
        .build()
        .unwrap();
    ConstraintModel::build(network, &ConstraintConfig::default()).unwrap()
}

/// Eight segments in two rows joined by cross links, three of them
/// dangerous. S2 and S6 have degree three.
pub(crate) fn crossed_rows_model() -> ConstraintModel {
    let links: [(&str, &[&str]); 6] = [
        ("S0", &["S1", "S5"]),
        ("S1", &["S2"]),
        ("S2", &["S3", "S6"]),
        ("S3", &["S4"]),
        ("S4", &["S7"]),
        ("S5", &["S6"]),
    ];
    let mut map: BTreeMap<String, Vec<String>> = links
        .iter()
        .map(|(from, to)| (from.to_string(), to.iter().map(|t| t.to_string()).collect()))
        .collect();
    map.insert("S6".to_string(), vec!["S7".to_string()]);

    let network = Network::builder()
        .domain(SpeedDomain::new([30, 50, 70, 90, 110]).unwrap())
        .segments((0..8).map(|i| {
            let id = format!("S{i}");
            if [1, 4, 7].contains(&i) {
                SegmentSpec::dangerous(id)
            } else {
                SegmentSpec::unrestricted(id)
            }
        }))
        .adjacency(Adjacency::Explicit(map))
        .build()
        .unwrap();
    ConstraintModel::build(network, &ConstraintConfig::default()).unwrap()
}

/// Calls `visit` with every complete assignment of `model`.
pub(crate) fn for_each_assignment<M: CostModel>(model: &M, mut visit: impl FnMut(&[u32])) {
    let n = model.variable_count();
    if (0..n).any(|var| model.domain(var).is_empty()) {
        return;
    }
    let mut digits = vec![0usize; n];
    let mut values: Vec<u32> = (0..n).map(|var| model.domain(var)[0]).collect();
    loop {
        visit(&values);
        let mut var = 0;
        loop {
            if var == n {
                return;
            }
            digits[var] += 1;
            if digits[var] < model.domain(var).len() {
                values[var] = model.domain(var)[digits[var]];
                break;
            }
            digits[var] = 0;
            values[var] = model.domain(var)[0];
            var += 1;
        }
    }
}

/// Lowest total cost over every complete assignment.
pub(crate) fn brute_force_min<M: CostModel>(model: &M) -> f64 {
    let mut best = f64::INFINITY;
    for_each_assignment(model, |values| {
        best = best.min(model.evaluate(&Assignment::complete(values)));
    });
    best
}

/// Graph colouring with a unit cost per monochrome edge. Exercises the
/// solvers through a model that is not built from a road network.
#[derive(Debug)]
pub(crate) struct ColoringModel {
    colors: Vec<Vec<u32>>,
    edges: Vec<(usize, usize)>,
}

impl ColoringModel {
    /// Three vertices, three colours, all edges present.
    pub(crate) fn triangle() -> Self {
        Self {
            colors: vec![vec![1, 2, 3]; 3],
            edges: vec![(0, 1), (1, 2), (0, 2)],
        }
    }

    fn clashes<'a>(
        &'a self,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = &'a (usize, usize)> + 'a {
        self.edges.iter().filter(move |&&(a, b)| {
            matches!((assignment.get(a), assignment.get(b)), (Some(x), Some(y)) if x == y)
        })
    }
}

impl CostModel for ColoringModel {
    fn variable_count(&self) -> usize {
        self.colors.len()
    }

    fn domain(&self, var: usize) -> &[u32] {
        &self.colors[var]
    }

    fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.clashes(assignment).count() as f64
    }

    fn evaluate_completed_by(&self, assignment: &Assignment, var: usize) -> f64 {
        self.violations_involving(assignment, var) as f64
    }

    fn violation_count(&self, assignment: &Assignment) -> usize {
        self.clashes(assignment).count()
    }

    fn violations_involving(&self, assignment: &Assignment, var: usize) -> usize {
        self.clashes(assignment)
            .filter(|&&(a, b)| a == var || b == var)
            .count()
    }
}
