//! Engine configuration with documented constants
//!
//! The tunable numbers of the stats calculator live here so the rules that
//! depend on them can be found in one place.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{MusterError, Result};

/// Configuration for the evaluation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === MOTIVATION ===
    /// Split the ordinary rank tiers into half and whole points
    ///
    /// When enabled, ordinary units add 0.5 motivation and ordinary-elite
    /// units add 1, with the regiment total rounded up at the end.
    /// When disabled, both ordinary tiers add a whole point.
    pub motivation_half_step: bool,

    // === MAIN FORCE ===
    /// Activations added to the main force at read time
    pub main_force_activation_bonus: i32,

    /// Motivation added to the main force at read time
    pub main_force_motivation_bonus: i32,

    // === STRUCTURE ===
    /// Name of the structural group holding the regiment commander
    ///
    /// The first unit resolved from this group in the base category is the
    /// commander slot and receives the template's `commander_orders_bonus`.
    pub commander_group: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            motivation_half_step: true,
            main_force_activation_bonus: 1,
            main_force_motivation_bonus: 1,
            commander_group: "commander".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig =
            toml::from_str(&content).map_err(|e| MusterError::toml(path, e))?;
        config.validate().map_err(MusterError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.main_force_activation_bonus < 0 || self.main_force_motivation_bonus < 0 {
            return Err(format!(
                "main force bonuses must be non-negative (activation {}, motivation {})",
                self.main_force_activation_bonus, self.main_force_motivation_bonus
            ));
        }

        if self.commander_group.trim().is_empty() {
            return Err("commander_group must not be empty".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Get the process-wide engine config (initializes with defaults if not set)
pub fn config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

/// Set the process-wide engine config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: EngineConfig) -> std::result::Result<(), EngineConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_bonus_rejected() {
        let config = EngineConfig {
            main_force_activation_bonus: -1,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str("motivation_half_step = false").unwrap();
        assert!(!config.motivation_half_step);
        assert_eq!(config.main_force_activation_bonus, 1);
        assert_eq!(config.commander_group, "commander");
    }
}
