//! Launch-time configuration — RNG seed, player senses, survival tuning.
//!
//! `SimConfig` is plain serde data so a harness can load it from JSON.
//! Validation collects every problem instead of stopping at the first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{player, survival};

/// Tunable parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the economy RNG.
    pub seed: u64,
    pub vision_radius: i32,
    pub pressure_sensor_radius: i32,
    pub energy_sensor_radius: i32,
    /// Maximum air reserve; the player spawns full.
    pub air_capacity: f64,
    /// Below this local air value the reserve drains.
    pub low_air: f64,
    /// At or above this local air value the reserve refills.
    pub medium_air: f64,
    pub vacuum_drain: f64,
    pub recovery_divisor: f64,
    pub starting_steel: u32,
    pub starting_copper: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            vision_radius: player::VISION_RADIUS,
            pressure_sensor_radius: player::PRESSURE_SENSOR_RADIUS,
            energy_sensor_radius: player::ENERGY_SENSOR_RADIUS,
            air_capacity: player::AIR_CAPACITY,
            low_air: survival::LOW_AIR,
            medium_air: survival::MEDIUM_AIR,
            vacuum_drain: survival::VACUUM_DRAIN,
            recovery_divisor: survival::RECOVERY_DIVISOR,
            starting_steel: player::STARTING_STEEL,
            starting_copper: player::STARTING_COPPER,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Vision radius must be at least one cell.
    VisionTooSmall(i32),
    /// Sensor radii cannot be negative.
    NegativeSensorRadius(i32),
    /// Vision and sensor radii are capped at `MAX_SENSE_RADIUS`.
    RadiusTooLarge(i32),
    /// Air capacity must be positive and finite.
    InvalidAirCapacity(f64),
    /// Thresholds must be non-negative and `low < medium`.
    ThresholdOrder { low: f64, medium: f64 },
    /// Vacuum drain must be positive, or the player could never die.
    InvalidVacuumDrain(f64),
    /// Recovery divisor must be positive.
    InvalidRecoveryDivisor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::VisionTooSmall(r) => write!(f, "vision radius {} is below 1", r),
            ConfigError::NegativeSensorRadius(r) => write!(f, "sensor radius {} is negative", r),
            ConfigError::RadiusTooLarge(r) => write!(
                f,
                "radius {} exceeds the maximum of {}",
                r,
                player::MAX_SENSE_RADIUS
            ),
            ConfigError::InvalidAirCapacity(c) => write!(f, "air capacity {} must be positive", c),
            ConfigError::ThresholdOrder { low, medium } => write!(
                f,
                "low air threshold {} must be below medium threshold {}",
                low, medium
            ),
            ConfigError::InvalidVacuumDrain(d) => write!(f, "vacuum drain {} must be positive", d),
            ConfigError::InvalidRecoveryDivisor(d) => {
                write!(f, "recovery divisor {} must be positive", d)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &SimConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.vision_radius < 1 {
        errors.push(ConfigError::VisionTooSmall(config.vision_radius));
    }
    for radius in [config.pressure_sensor_radius, config.energy_sensor_radius] {
        if radius < 0 {
            errors.push(ConfigError::NegativeSensorRadius(radius));
        }
    }
    for radius in [
        config.vision_radius,
        config.pressure_sensor_radius,
        config.energy_sensor_radius,
    ] {
        if radius > player::MAX_SENSE_RADIUS {
            errors.push(ConfigError::RadiusTooLarge(radius));
        }
    }
    if !(config.air_capacity.is_finite() && config.air_capacity > 0.0) {
        errors.push(ConfigError::InvalidAirCapacity(config.air_capacity));
    }
    if !(config.low_air >= 0.0 && config.low_air < config.medium_air) {
        errors.push(ConfigError::ThresholdOrder {
            low: config.low_air,
            medium: config.medium_air,
        });
    }
    if !(config.vacuum_drain.is_finite() && config.vacuum_drain > 0.0) {
        errors.push(ConfigError::InvalidVacuumDrain(config.vacuum_drain));
    }
    if !(config.recovery_divisor.is_finite() && config.recovery_divisor > 0.0) {
        errors.push(ConfigError::InvalidRecoveryDivisor(config.recovery_divisor));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SimConfig::default()).is_empty());
    }

    #[test]
    fn test_vision_too_small() {
        let config = SimConfig {
            vision_radius: 0,
            ..SimConfig::default()
        };
        assert!(validate_config(&config).contains(&ConfigError::VisionTooSmall(0)));
    }

    #[test]
    fn test_radius_is_capped() {
        let config = SimConfig {
            vision_radius: i32::MAX,
            energy_sensor_radius: player::MAX_SENSE_RADIUS + 1,
            ..SimConfig::default()
        };
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::RadiusTooLarge(i32::MAX)));
        assert!(errors.contains(&ConfigError::RadiusTooLarge(player::MAX_SENSE_RADIUS + 1)));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_threshold_order() {
        let config = SimConfig {
            low_air: 6.0,
            medium_air: 6.0,
            ..SimConfig::default()
        };
        assert!(validate_config(&config)
            .iter()
            .any(|e| matches!(e, ConfigError::ThresholdOrder { .. })));
    }

    #[test]
    fn test_collects_every_error() {
        let config = SimConfig {
            vision_radius: -1,
            pressure_sensor_radius: -2,
            air_capacity: 0.0,
            vacuum_drain: 0.0,
            recovery_divisor: f64::NAN,
            ..SimConfig::default()
        };
        assert_eq!(validate_config(&config).len(), 5);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "seed": 42, "vision_radius": 8 }"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.vision_radius, 8);
        assert_eq!(config.air_capacity, SimConfig::default().air_capacity);
    }

    #[test]
    fn test_error_display() {
        let msg = ConfigError::ThresholdOrder {
            low: 7.0,
            medium: 6.0,
        }
        .to_string();
        assert!(msg.contains("below medium"));
    }
}
