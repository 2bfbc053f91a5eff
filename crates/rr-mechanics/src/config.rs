//! Tunable rule constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Rule constants for cooperative and extended checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicsConfig {
    /// Net successes a helper needs to grant a bonus die on an assisted check.
    pub assist_threshold: i32,
    /// Extended check tuning.
    pub extended: ExtendedCheckConfig,
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self {
            assist_threshold: 2,
            extended: ExtendedCheckConfig::default(),
        }
    }
}

/// Extended check tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedCheckConfig {
    /// Rounds allowed when the caller does not choose.
    pub default_max_rounds: u32,
    /// Accumulated successes lost on a fumbled round.
    pub fumble_penalty: u32,
    /// Consecutive fumbles that end the check catastrophically.
    pub catastrophic_fumble_streak: u32,
}

impl Default for ExtendedCheckConfig {
    fn default() -> Self {
        Self {
            default_max_rounds: 10,
            fumble_penalty: 2,
            catastrophic_fumble_streak: 3,
        }
    }
}

impl MechanicsConfig {
    /// Set the assist threshold (at least 1).
    pub fn with_assist_threshold(mut self, threshold: i32) -> Self {
        self.assist_threshold = threshold.max(1);
        self
    }

    /// Set the default number of extended-check rounds (at least 1).
    pub fn with_default_max_rounds(mut self, rounds: u32) -> Self {
        self.extended.default_max_rounds = rounds.max(1);
        self
    }

    /// Set the fumble penalty for extended checks.
    pub fn with_fumble_penalty(mut self, penalty: u32) -> Self {
        self.extended.fumble_penalty = penalty;
        self
    }

    /// Set the consecutive-fumble streak that ends an extended check (at least 1).
    pub fn with_catastrophic_fumble_streak(mut self, streak: u32) -> Self {
        self.extended.catastrophic_fumble_streak = streak.max(1);
        self
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> MechResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MechError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_path(path: &Path) -> MechResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| MechError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> MechResult<()> {
        if self.assist_threshold < 1 {
            return Err(MechError::InvalidConfig(
                "assist_threshold must be at least 1".to_string(),
            ));
        }
        if self.extended.default_max_rounds < 1 {
            return Err(MechError::InvalidConfig(
                "extended.default_max_rounds must be at least 1".to_string(),
            ));
        }
        if self.extended.catastrophic_fumble_streak < 1 {
            return Err(MechError::InvalidConfig(
                "extended.catastrophic_fumble_streak must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
