use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};

use crate::{
    database::db_structs::CheckoutSettings,
    error::{EngineError, EngineResult},
    model::{constants::OMR_WINDOW, player_rating::BlendWeights}
};

/// Tunables of the rating engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// PR blend weights (training rating vs OMR)
    pub blend_weights: BlendWeights,
    /// Number of recent eligible matches considered by OMR
    pub omr_window: usize,
    /// Checkout routine shape used when a level has no override
    pub checkout_defaults: CheckoutSettings
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blend_weights: BlendWeights::default(),
            omr_window: OMR_WINDOW,
            checkout_defaults: CheckoutSettings::default()
        }
    }
}

fn var_or<T: FromStr>(key: &'static str, default: T) -> EngineResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| EngineError::invalid(key, format!("'{raw}' could not be parsed"))),
        Err(_) => Ok(default)
    }
}

impl EngineConfig {
    /// Reads overrides from the environment, keeping defaults for unset keys
    pub fn from_env() -> EngineResult<Self> {
        let defaults = Self::default();

        let config = Self {
            blend_weights: BlendWeights {
                training: var_or("PR_TRAINING_WEIGHT", defaults.blend_weights.training)?,
                matches: var_or("PR_MATCH_WEIGHT", defaults.blend_weights.matches)?
            },
            omr_window: var_or("OMR_WINDOW", defaults.omr_window)?,
            checkout_defaults: CheckoutSettings {
                allowed_throws: var_or("CHECKOUT_THROWS", defaults.checkout_defaults.allowed_throws)?,
                attempt_count: var_or("CHECKOUT_ATTEMPTS", defaults.checkout_defaults.attempt_count)?
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let weights = self.blend_weights;
        if weights.training < 0.0 || weights.matches < 0.0 || weights.training + weights.matches <= 0.0 {
            return Err(EngineError::invalid("blend_weights", "must be non-negative with a positive sum"));
        }

        if self.omr_window == 0 {
            return Err(EngineError::invalid("omr_window", "must be positive"));
        }

        if self.checkout_defaults.allowed_throws < 1 || self.checkout_defaults.attempt_count < 0 {
            return Err(EngineError::invalid("checkout_defaults", "needs at least one throw and no negative attempts"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "PR_TRAINING_WEIGHT",
        "PR_MATCH_WEIGHT",
        "OMR_WINDOW",
        "CHECKOUT_THROWS",
        "CHECKOUT_ATTEMPTS"
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.omr_window, 10);
        assert_eq!(config.blend_weights.training, 1.0);
        assert_eq!(config.blend_weights.matches, 1.0);
        assert_eq!(config.checkout_defaults.allowed_throws, 9);
        assert_eq!(config.checkout_defaults.attempt_count, 9);
    }

    #[test]
    #[serial]
    fn test_from_env_without_overrides() {
        clear_env();
        assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_with_overrides() {
        clear_env();
        env::set_var("PR_TRAINING_WEIGHT", "2");
        env::set_var("OMR_WINDOW", "8");
        env::set_var("CHECKOUT_THROWS", "6");

        let config = EngineConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.blend_weights.training, 2.0);
        assert_eq!(config.omr_window, 8);
        assert_eq!(config.checkout_defaults.allowed_throws, 6);
        assert_eq!(config.checkout_defaults.attempt_count, 9);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        env::set_var("OMR_WINDOW", "ten");

        let err = EngineConfig::from_env().unwrap_err();
        clear_env();

        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_validate_zero_weights() {
        let config = EngineConfig {
            blend_weights: BlendWeights {
                training: 0.0,
                matches: 0.0
            },
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
