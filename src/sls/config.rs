//! Local search configuration.

use crate::error::{ConfigResult, ConfigurationError};

/// Configuration for the stochastic local search.
///
/// # Examples
///
/// ```
/// use u_speedplan::sls::SlsConfig;
///
/// let config = SlsConfig::default()
///     .with_max_steps(50_000)
///     .with_restarts(8)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlsConfig {
    /// Moves attempted per restart.
    pub max_steps: usize,

    /// Violations a solution may carry and still count as acceptable.
    pub max_violations: usize,

    /// Probability of keeping a move that pushes violations over budget.
    pub accept_worse_probability: f64,

    /// Independent restarts. Restart `i` uses seed `seed + i`.
    pub restarts: usize,

    /// Base random seed. `None` draws one at run time.
    pub seed: Option<u64>,
}

impl Default for SlsConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_violations: 0,
            accept_worse_probability: 0.3,
            restarts: 1,
            seed: None,
        }
    }
}

impl SlsConfig {
    /// Sets the moves attempted per restart.
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Sets the violation budget.
    pub fn with_max_violations(mut self, n: usize) -> Self {
        self.max_violations = n;
        self
    }

    /// Sets the probability of keeping an over-budget move.
    pub fn with_accept_worse_probability(mut self, p: f64) -> Self {
        self.accept_worse_probability = p;
        self
    }

    /// Sets the number of independent restarts.
    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.accept_worse_probability) {
            return Err(ConfigurationError::InvalidParameter(format!(
                "accept_worse_probability must be in [0, 1], got {}",
                self.accept_worse_probability
            )));
        }
        if self.restarts == 0 {
            return Err(ConfigurationError::InvalidParameter(
                "restarts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SlsConfig::default();
        assert_eq!(config.max_steps, 10_000);
        assert_eq!(config.max_violations, 0);
        assert!((config.accept_worse_probability - 0.3).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_probability() {
        let config = SlsConfig::default().with_accept_worse_probability(1.5);
        assert!(config.validate().is_err());
        let config = SlsConfig::default().with_accept_worse_probability(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_restarts() {
        assert!(SlsConfig::default().with_restarts(0).validate().is_err());
    }
}
