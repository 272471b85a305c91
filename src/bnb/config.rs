//! Branch-and-bound configuration.

use crate::error::{ConfigResult, ConfigurationError};

/// Order in which a variable's domain values are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueOrder {
    /// Slowest speeds first.
    Ascending,
    /// Fastest speeds first. Reaches high-throughput incumbents early.
    #[default]
    Descending,
}

/// Configuration for the exact solver.
///
/// # Examples
///
/// ```
/// use u_speedplan::bnb::{BnbConfig, ValueOrder};
///
/// let config = BnbConfig::default()
///     .with_initial_bound(1_000.0)
///     .with_time_limit_ms(5_000)
///     .with_value_order(ValueOrder::Ascending);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbConfig {
    /// Only assignments strictly cheaper than this are accepted.
    #[cfg_attr(feature = "serde", serde(with = "crate::solution::cost_serde"))]
    pub initial_bound: f64,

    /// Stop as soon as an incumbent costs at most this much.
    /// Gives up the optimality guarantee.
    pub target_cost: Option<f64>,

    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Domain value order at every level.
    pub value_order: ValueOrder,

    /// Add an optimistic estimate of not-yet-covered constraints before
    /// comparing against the bound.
    pub lookahead: bool,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            initial_bound: f64::INFINITY,
            target_cost: None,
            time_limit_ms: None,
            value_order: ValueOrder::default(),
            lookahead: true,
        }
    }
}

impl BnbConfig {
    /// Sets the initial upper bound on total cost.
    pub fn with_initial_bound(mut self, bound: f64) -> Self {
        self.initial_bound = bound;
        self
    }

    /// Stops as soon as an incumbent costs at most `target`.
    pub fn with_target_cost(mut self, target: f64) -> Self {
        self.target_cost = Some(target);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the order in which domain values are tried.
    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    /// Enables or disables the lower-bound lookahead.
    pub fn with_lookahead(mut self, lookahead: bool) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_bound.is_nan() {
            return Err(ConfigurationError::InvalidParameter(
                "initial_bound must not be NaN".into(),
            ));
        }
        if let Some(target) = self.target_cost {
            if !target.is_finite() {
                return Err(ConfigurationError::InvalidParameter(format!(
                    "target_cost must be finite, got {target}"
                )));
            }
        }
        Ok(())
    }
}
