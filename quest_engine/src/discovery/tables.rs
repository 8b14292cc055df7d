//! Data-driven probability tables for discovery.
//!
//! Both tables are ordered lists evaluated top-down and deserialize straight
//! from config, so they can be tuned and tested without the rest of the
//! engine.

use rpg_rules::RandomSource;
use serde::{Deserialize, Serialize};

use crate::error::{QuestError, QuestResult};

pub const MIN_SEARCH_ROLL: u8 = 1;
pub const MAX_SEARCH_ROLL: u8 = 10;

/// Clamp a raw search roll into `MIN_SEARCH_ROLL..=MAX_SEARCH_ROLL`.
pub fn clamp_roll(raw: i32) -> u8 {
    let clamped = raw.clamp(i32::from(MIN_SEARCH_ROLL), i32::from(MAX_SEARCH_ROLL));
    u8::try_from(clamped).unwrap_or(MIN_SEARCH_ROLL)
}

/// One row of the search-roll table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub min_roll: u8,
    pub max_roll: u8,
    pub min_count: usize,
    pub max_count: usize,
    /// Highest quest rarity eligible at this tier.
    pub max_rarity: u32,
}

impl TierRule {
    pub fn new(
        min_roll: u8,
        max_roll: u8,
        min_count: usize,
        max_count: usize,
        max_rarity: u32,
    ) -> Self {
        Self {
            min_roll,
            max_roll,
            min_count,
            max_count,
            max_rarity,
        }
    }

    /// Whether `roll` falls in this rule's range.
    pub fn matches(&self, roll: u8) -> bool {
        (self.min_roll..=self.max_roll).contains(&roll)
    }

    /// Number of quests to reveal. Fixed counts consume no randomness.
    pub fn draw_count(&self, rng: &mut impl RandomSource) -> usize {
        if self.min_count >= self.max_count {
            return self.min_count;
        }
        let lo = i32::try_from(self.min_count).unwrap_or(i32::MAX);
        let hi = i32::try_from(self.max_count).unwrap_or(i32::MAX);
        usize::try_from(rng.gen_range(lo, hi)).unwrap_or(self.min_count)
    }
}

/// Search roll to (quest count, max rarity). First match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierTable(Vec<TierRule>);

impl TierTable {
    pub fn new(rules: Vec<TierRule>) -> Self {
        Self(rules)
    }

    /// Rule covering `roll`.
    pub fn lookup(&self, roll: u8) -> Option<&TierRule> {
        self.0.iter().find(|rule| rule.matches(roll))
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.0
    }

    /// Every search roll must be covered by a rule with a sane count range.
    pub fn validate(&self) -> QuestResult<()> {
        if self.0.is_empty() {
            return Err(QuestError::config("discovery.tiers must not be empty"));
        }
        for (i, rule) in self.0.iter().enumerate() {
            if rule.min_roll > rule.max_roll {
                return Err(QuestError::config(format!(
                    "discovery.tiers[{}]: min_roll {} exceeds max_roll {}",
                    i, rule.min_roll, rule.max_roll
                )));
            }
            if rule.min_count == 0 || rule.min_count > rule.max_count {
                return Err(QuestError::config(format!(
                    "discovery.tiers[{}]: invalid count range {}..={}",
                    i, rule.min_count, rule.max_count
                )));
            }
        }
        let uncovered = (MIN_SEARCH_ROLL..=MAX_SEARCH_ROLL).find(|r| self.lookup(*r).is_none());
        if let Some(roll) = uncovered {
            return Err(QuestError::config(format!(
                "discovery.tiers does not cover search roll {}",
                roll
            )));
        }
        Ok(())
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self(vec![
            TierRule::new(1, 1, 1, 1, 1),
            TierRule::new(2, 3, 1, 2, 2),
            TierRule::new(4, 5, 2, 3, 3),
            TierRule::new(6, 7, 3, 4, 4),
            TierRule::new(8, 9, 4, 4, 5),
            TierRule::new(10, 10, 5, 5, 5),
        ])
    }
}

/// A named distance range with a draw weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub name: String,
    pub min: u32,
    pub max: u32,
    pub weight: u32,
}

impl DistanceBand {
    pub fn new(name: impl Into<String>, min: u32, max: u32, weight: u32) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            weight,
        }
    }

    /// Whether `distance` falls in the band.
    pub fn contains(&self, distance: u32) -> bool {
        (self.min..=self.max).contains(&distance)
    }
}

/// Ordered distance bands drawn by weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceBands(Vec<DistanceBand>);

impl DistanceBands {
    pub fn new(bands: Vec<DistanceBand>) -> Self {
        Self(bands)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistanceBand> {
        self.0.iter()
    }

    fn total_weight(&self) -> u64 {
        self.0.iter().map(|b| u64::from(b.weight)).sum()
    }

    /// Weighted draw over the bands in order.
    pub fn draw(&self, rng: &mut impl RandomSource) -> Option<&DistanceBand> {
        let total = i32::try_from(self.total_weight()).unwrap_or(i32::MAX);
        if total <= 0 {
            return None;
        }
        let mut ticket = i64::from(rng.gen_range(1, total));
        for band in &self.0 {
            ticket -= i64::from(band.weight);
            if ticket <= 0 {
                return Some(band);
            }
        }
        self.0.last()
    }

    /// Bands must be non-empty, each with a positive weight and `min <= max`.
    pub fn validate(&self) -> QuestResult<()> {
        if self.0.is_empty() {
            return Err(QuestError::config("discovery.bands must not be empty"));
        }
        for band in &self.0 {
            if band.weight == 0 {
                return Err(QuestError::config(format!(
                    "discovery band '{}' needs a positive weight",
                    band.name
                )));
            }
            if band.min > band.max {
                return Err(QuestError::config(format!(
                    "discovery band '{}': min {} exceeds max {}",
                    band.name, band.min, band.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for DistanceBands {
    fn default() -> Self {
        Self(vec![
            DistanceBand::new("near", 2, 4, 50),
            DistanceBand::new("medium", 5, 8, 30),
            DistanceBand::new("far", 9, 14, 15),
            DistanceBand::new("very far", 15, 24, 5),
        ])
    }
}
