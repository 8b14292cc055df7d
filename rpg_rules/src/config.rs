//! Tunable rules constants.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RulesError, RulesResult};

/// Constants consumed by dice, stats, checks and combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RulesConfig {
    /// Dice per set for checks, initiative and attack rolls.
    pub dice_per_set: u32,

    /// Absolute dice magnitude at or beyond which a roll is "critical".
    pub critical_magnitude: i32,

    /// Training points granted to the player per combat victory.
    pub victory_training_points: u32,

    /// Turn cap after which a fight is forced to end.
    pub max_combat_turns: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            dice_per_set: 4,
            critical_magnitude: 3,
            victory_training_points: 1,
            max_combat_turns: 500,
        }
    }
}

impl RulesConfig {
    /// Parse from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> RulesResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| RulesError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> RulesResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| RulesError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&input)
    }

    /// Reject values the rules cannot run with.
    pub fn validate(&self) -> RulesResult<()> {
        if self.dice_per_set == 0 {
            return Err(RulesError::config("dice_per_set must be at least 1"));
        }
        if self.max_combat_turns == 0 {
            return Err(RulesError::config("max_combat_turns must be at least 1"));
        }
        Ok(())
    }
}
