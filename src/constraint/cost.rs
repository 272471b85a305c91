//! Closed set of cost functions.

/// Cost of exceeding a hard limit.
pub const HARD_VIOLATION_COST: f64 = f64::INFINITY;

/// A cost function tag carrying only plain data.
///
/// Every variant maps the values of its scope to a non-negative cost,
/// `0` meaning fully satisfied. All variants are dispatched through
/// [`CostFunction::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostFunction {
    /// Per-segment speed limit.
    ///
    /// `0` at or below `limit`. Above it: `offset + (v - limit)` when soft,
    /// [`HARD_VIOLATION_COST`] when hard.
    UnaryLimit { limit: u32, hard: bool, offset: f64 },

    /// Smooth transition between two adjacent segments.
    ///
    /// `|v1 - v2| / (cap + 1)` while the difference is at most `cap`, which
    /// keeps the cost in `[0, 1)`; a flat `penalty` beyond it.
    Continuity { cap: u32, penalty: f64 },

    /// Aggregate throughput over every segment.
    ///
    /// `base - sum / divisor`, clamped at zero. Higher total speed is cheaper.
    GlobalEfficiency { base: f64, divisor: f64 },
}

impl CostFunction {
    /// Evaluates the function on scope-ordered values.
    ///
    /// # Panics
    ///
    /// Panics if a unary or pairwise function gets fewer values than its
    /// arity.
    pub fn evaluate(&self, values: &[u32]) -> f64 {
        match *self {
            CostFunction::UnaryLimit { .. } => self.unary(values[0]),
            CostFunction::Continuity { .. } => self.pair(values[0], values[1]),
            CostFunction::GlobalEfficiency { .. } => {
                self.aggregate(values.iter().map(|&v| u64::from(v)).sum())
            }
        }
    }

    #[inline]
    pub(crate) fn unary(&self, value: u32) -> f64 {
        match *self {
            CostFunction::UnaryLimit {
                limit,
                hard,
                offset,
            } => {
                if value <= limit {
                    0.0
                } else if hard {
                    HARD_VIOLATION_COST
                } else {
                    offset + f64::from(value - limit)
                }
            }
            _ => 0.0,
        }
    }

    #[inline]
    pub(crate) fn pair(&self, a: u32, b: u32) -> f64 {
        match *self {
            CostFunction::Continuity { cap, penalty } => {
                let diff = a.abs_diff(b);
                if diff <= cap {
                    f64::from(diff) / (f64::from(cap) + 1.0)
                } else {
                    penalty
                }
            }
            _ => 0.0,
        }
    }

    #[inline]
    pub(crate) fn aggregate(&self, sum: u64) -> f64 {
        match *self {
            CostFunction::GlobalEfficiency { base, divisor } => {
                (base - sum as f64 / divisor).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// Objectives rank solutions but never count as violations.
    pub fn is_objective(&self) -> bool {
        matches!(self, CostFunction::GlobalEfficiency { .. })
    }

    /// Fixed scope size, or `None` for the global function.
    pub fn arity(&self) -> Option<usize> {
        match self {
            CostFunction::UnaryLimit { .. } => Some(1),
            CostFunction::Continuity { .. } => Some(2),
            CostFunction::GlobalEfficiency { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOFT: CostFunction = CostFunction::UnaryLimit {
        limit: 50,
        hard: false,
        offset: 50.0,
    };

    #[test]
    fn test_soft_limit_curve() {
        assert_eq!(SOFT.evaluate(&[30]), 0.0);
        assert_eq!(SOFT.evaluate(&[50]), 0.0);
        assert_eq!(SOFT.evaluate(&[60]), 60.0);
        assert_eq!(SOFT.evaluate(&[80]), 80.0);
    }

    #[test]
    fn test_hard_limit_curve() {
        let hard = CostFunction::UnaryLimit {
            limit: 50,
            hard: true,
            offset: 50.0,
        };
        assert_eq!(hard.evaluate(&[50]), 0.0);
        assert!(hard.evaluate(&[60]).is_infinite());
    }

    #[test]
    fn test_continuity_curve() {
        let f = CostFunction::Continuity {
            cap: 20,
            penalty: 100.0,
        };
        assert_eq!(f.evaluate(&[50, 50]), 0.0);
        let within = f.evaluate(&[50, 70]);
        assert!(within > 0.0 && within < 1.0);
        assert!(f.evaluate(&[70, 60]) < within);
        assert_eq!(f.evaluate(&[50, 80]), 100.0);
    }

    #[test]
    fn test_efficiency_decreases_with_speed() {
        let f = CostFunction::GlobalEfficiency {
            base: 1000.0,
            divisor: 5.0,
        };
        assert_eq!(f.evaluate(&[50, 50]), 980.0);
        assert!(f.evaluate(&[60, 50]) < f.evaluate(&[50, 50]));
        assert!(f.is_objective());
        assert_eq!(f.arity(), None);
    }
}
