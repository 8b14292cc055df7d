//! Engine configuration.
//!
//! Every tunable constant lives here and is supplied by the caller, usually
//! from a TOML file. Missing keys fall back to the defaults below.

use rpg_rules::{RulesConfig, Tick};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::discovery::{DistanceBands, TierTable};
use crate::error::{QuestError, QuestResult};

/// Quest discovery tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub tiers: TierTable,
    pub bands: DistanceBands,
    /// Minimum distance for the any-tile fallback when a band has no tile.
    pub fallback_min_distance: u32,
    /// Ticks consumed by one search.
    pub search_tick_cost: Tick,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            bands: DistanceBands::default(),
            fallback_min_distance: 2,
            search_tick_cost: 1,
        }
    }
}

/// Merchant stock tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    /// Ticks between stock regenerations.
    pub refresh_interval: Tick,
    pub max_stock: usize,
    /// Ticks an instance stays on the shelf.
    pub item_lifetime: Tick,
    /// Percent of an item's value paid when the player sells it.
    pub sell_ratio_percent: u32,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 10,
            max_stock: 6,
            item_lifetime: 30,
            sell_ratio_percent: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub rest_ticks: Tick,
    pub travel_ticks_per_tile: Tick,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_ticks: 4,
            travel_ticks_per_tile: 1,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    pub discovery: DiscoveryConfig,
    pub merchant: MerchantConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(input: &str) -> QuestResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| QuestError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QuestResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| QuestError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&input)
    }

    /// Validate every section.
    pub fn validate(&self) -> QuestResult<()> {
        self.rules.validate()?;
        self.discovery.tiers.validate()?;
        self.discovery.bands.validate()?;
        if self.merchant.refresh_interval == 0 {
            return Err(QuestError::config("merchant.refresh_interval must be positive"));
        }
        Ok(())
    }
}
