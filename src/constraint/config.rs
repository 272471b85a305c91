//! Constraint builder configuration.

use crate::error::{ConfigResult, ConfigurationError};

/// Tunable constants of the derived cost functions.
///
/// # Examples
///
/// ```
/// use u_speedplan::constraint::ConstraintConfig;
///
/// let config = ConstraintConfig::default()
///     .with_continuity_cap(30)
///     .with_jump_penalty(250.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintConfig {
    /// Flat part of the soft over-limit penalty.
    pub limit_offset: f64,

    /// Largest speed difference between adjacent segments that still
    /// counts as a smooth transition.
    pub continuity_cap: u32,

    /// Cost of an abrupt transition (difference above the cap).
    pub jump_penalty: f64,

    /// Efficiency cost of a network at zero speed.
    ///
    /// Raised automatically so the efficiency cost never goes negative.
    pub efficiency_base: f64,

    /// Speed units per unit of efficiency cost.
    pub efficiency_divisor: f64,

    /// A constraint costing more than this counts as violated.
    pub violation_threshold: f64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            limit_offset: 50.0,
            continuity_cap: 20,
            jump_penalty: 100.0,
            efficiency_base: 1000.0,
            efficiency_divisor: 5.0,
            violation_threshold: 1.0,
        }
    }
}

impl ConstraintConfig {
    /// Sets the fixed penalty added when a soft limit is exceeded.
    pub fn with_limit_offset(mut self, offset: f64) -> Self {
        self.limit_offset = offset;
        self
    }

    /// Sets the largest speed change between adjacent segments without a jump penalty.
    pub fn with_continuity_cap(mut self, cap: u32) -> Self {
        self.continuity_cap = cap;
        self
    }

    /// Sets the cost of a speed change beyond the cap.
    pub fn with_jump_penalty(mut self, penalty: f64) -> Self {
        self.jump_penalty = penalty;
        self
    }

    /// Sets the minimum base of the efficiency cost.
    pub fn with_efficiency_base(mut self, base: f64) -> Self {
        self.efficiency_base = base;
        self
    }

    /// Sets the divisor applied to aggregate speed.
    pub fn with_efficiency_divisor(mut self, divisor: f64) -> Self {
        self.efficiency_divisor = divisor;
        self
    }

    /// Sets the cost above which a constraint counts as violated.
    pub fn with_violation_threshold(mut self, threshold: f64) -> Self {
        self.violation_threshold = threshold;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let non_negative = [
            ("limit_offset", self.limit_offset),
            ("jump_penalty", self.jump_penalty),
            ("efficiency_base", self.efficiency_base),
            ("violation_threshold", self.violation_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidParameter(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.efficiency_divisor.is_finite() || self.efficiency_divisor <= 0.0 {
            return Err(ConfigurationError::InvalidParameter(format!(
                "efficiency_divisor must be positive, got {}",
                self.efficiency_divisor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConstraintConfig::default();
        assert_eq!(config.continuity_cap, 20);
        assert!((config.jump_penalty - 100.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_divisor() {
        let config = ConstraintConfig::default().with_efficiency_divisor(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_negative_penalty() {
        let config = ConstraintConfig::default().with_jump_penalty(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_nan_threshold() {
        let config = ConstraintConfig::default().with_violation_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }
}
