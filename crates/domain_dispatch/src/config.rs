//! Engine configuration
//!
//! One immutable configuration object, injected into the coordinator at
//! construction time. Per-scope overrides are the host's concern; the engine
//! sees exactly one resolved configuration per coordinator instance.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::priority::{PriorityWeights, UrgencyBands};
use crate::strategy::StrategyKind;

/// Capacity and availability thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Fallback capacity for workers without a declared maximum
    #[serde(default = "CapacityConfig::default_max_capacity")]
    pub default_max_capacity: u32,
    /// Load percentage at or above which a worker stops receiving work
    #[serde(default = "CapacityConfig::default_available_threshold")]
    pub available_threshold_pct: f64,
    /// Stricter threshold applied to High/Critical claims
    #[serde(default = "CapacityConfig::default_strict_threshold")]
    pub strict_threshold_pct: f64,
}

impl CapacityConfig {
    fn default_max_capacity() -> u32 {
        10
    }

    fn default_available_threshold() -> f64 {
        90.0
    }

    fn default_strict_threshold() -> f64 {
        70.0
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            default_max_capacity: Self::default_max_capacity(),
            available_threshold_pct: Self::default_available_threshold(),
            strict_threshold_pct: Self::default_strict_threshold(),
        }
    }
}

/// Floating pool and escalation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Consecutive assignment failures before an entry escalates
    #[serde(default = "PoolConfig::default_escalation_threshold")]
    pub escalation_threshold: u32,
    /// Priority boost applied on escalation
    #[serde(default = "PoolConfig::default_escalation_boost")]
    pub escalation_boost: f64,
    /// Billed amount at or above which a high-value boost is granted on entry
    #[serde(default = "PoolConfig::default_high_value_threshold")]
    pub high_value_threshold: Decimal,
    /// Boost granted to high-value claims on pool entry
    #[serde(default = "PoolConfig::default_high_value_boost")]
    pub high_value_boost: f64,
}

impl PoolConfig {
    fn default_escalation_threshold() -> u32 {
        3
    }

    fn default_escalation_boost() -> f64 {
        200.0
    }

    fn default_high_value_threshold() -> Decimal {
        dec!(10000)
    }

    fn default_high_value_boost() -> f64 {
        50.0
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: Self::default_escalation_threshold(),
            escalation_boost: Self::default_escalation_boost(),
            high_value_threshold: Self::default_high_value_threshold(),
            high_value_boost: Self::default_high_value_boost(),
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub weights: PriorityWeights,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub urgency: UrgencyBands,
    #[serde(default)]
    pub default_strategy: StrategyKind,
}

impl DispatchConfig {
    /// Validates the configuration.
    ///
    /// Invalid tuning that cannot fall back to a safe default aborts any
    /// batch before writes happen.
    pub fn validate(&self) -> Result<(), DispatchError> {
        self.weights.validate()?;

        if self.capacity.default_max_capacity == 0 {
            return Err(DispatchError::Configuration(
                "default_max_capacity must be at least 1".to_string(),
            ));
        }
        for (name, pct) in [
            ("available_threshold_pct", self.capacity.available_threshold_pct),
            ("strict_threshold_pct", self.capacity.strict_threshold_pct),
        ] {
            if !(pct > 0.0 && pct <= 100.0) {
                return Err(DispatchError::Configuration(format!(
                    "{name} must be within (0, 100], got {pct}"
                )));
            }
        }

        if self.pool.escalation_threshold == 0 {
            return Err(DispatchError::Configuration(
                "escalation_threshold must be at least 1".to_string(),
            ));
        }
        if self.pool.escalation_boost < 0.0 || self.pool.high_value_boost < 0.0 {
            return Err(DispatchError::Configuration(
                "priority boosts must be non-negative".to_string(),
            ));
        }

        self.urgency.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DispatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_default_capacity_rejected() {
        let mut config = DispatchConfig::default();
        config.capacity.default_max_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(DispatchError::Configuration(_))
        ));
    }

    #[test]
    fn test_threshold_bounds() {
        let mut config = DispatchConfig::default();
        config.capacity.available_threshold_pct = 0.0;
        assert!(config.validate().is_err());

        config.capacity.available_threshold_pct = 101.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserializes_from_partial_json() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"pool": {"escalation_threshold": 5}}"#).unwrap();
        assert_eq!(config.pool.escalation_threshold, 5);
        assert_eq!(config.capacity.default_max_capacity, 10);
    }
}
