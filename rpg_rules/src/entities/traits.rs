//! Attributes and skills.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named attributes and secondary skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    // Attributes
    Strength,
    Agility,
    Endurance,
    Intelligence,

    // Skills
    Persuade,
    Perception,
    Stealth,
    Survival,
    Athletics,
    Craft,
    Medicine,
}

impl Trait {
    pub const ALL: [Trait; 11] = [
        Trait::Strength,
        Trait::Agility,
        Trait::Endurance,
        Trait::Intelligence,
        Trait::Persuade,
        Trait::Perception,
        Trait::Stealth,
        Trait::Survival,
        Trait::Athletics,
        Trait::Craft,
        Trait::Medicine,
    ];

    /// Lowercase name used in content files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Strength => "strength",
            Trait::Agility => "agility",
            Trait::Endurance => "endurance",
            Trait::Intelligence => "intelligence",
            Trait::Persuade => "persuade",
            Trait::Perception => "perception",
            Trait::Stealth => "stealth",
            Trait::Survival => "survival",
            Trait::Athletics => "athletics",
            Trait::Craft => "craft",
            Trait::Medicine => "medicine",
        }
    }

    /// Whether this is one of the four primary attributes.
    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            Trait::Strength | Trait::Agility | Trait::Endurance | Trait::Intelligence
        )
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping of traits to non-negative values. Absent traits read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitSet {
    values: BTreeMap<Trait, u32>,
}

impl TraitSet {
    /// An empty set; every trait reads 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: Trait, value: u32) -> Self {
        self.set(key, value);
        self
    }

    /// Value of `key`, 0 when absent.
    pub fn get(&self, key: Trait) -> i32 {
        self.values
            .get(&key)
            .map(|v| i32::try_from(*v).unwrap_or(i32::MAX))
            .unwrap_or(0)
    }

    /// Overwrite the value of `key`.
    pub fn set(&mut self, key: Trait, value: u32) {
        self.values.insert(key, value);
    }

    /// Raise a trait by one and return the new value.
    pub fn increment(&mut self, key: Trait) -> u32 {
        let value = self.values.entry(key).or_insert(0);
        *value = value.saturating_add(1);
        *value
    }

    /// Stored traits in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Trait, u32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}
