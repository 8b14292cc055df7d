//! Skill checks against a difficulty class.

use serde::{Deserialize, Serialize};

use super::dice::{roll_set, Criticality, DiceRoll};
use crate::config::RulesConfig;
use crate::entities::{Trait, TraitSet};
use crate::random::RandomSource;

/// A check to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub skill_id: Trait,
    pub dc: i32,
    #[serde(default)]
    pub base_modifier: i32,
}

impl CheckRequest {
    /// A check with no base modifier.
    pub fn new(skill_id: Trait, dc: i32) -> Self {
        Self {
            skill_id,
            dc,
            base_modifier: 0,
        }
    }
}

/// Result of a resolved check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub success: bool,
    pub total: i32,
    /// `total - dc`; negative on failure.
    pub margin: i32,
    pub roll: DiceRoll,
    pub criticality: Criticality,
}

/// Roll and resolve a check.
pub fn resolve_check(
    traits: &TraitSet,
    request: &CheckRequest,
    rng: &mut impl RandomSource,
    config: &RulesConfig,
) -> CheckOutcome {
    let roll = roll_set(rng, config.dice_per_set);
    resolve_check_with_roll(traits, request, roll, config)
}

/// Resolve a check using dice already rolled by the caller.
pub fn resolve_check_with_roll(
    traits: &TraitSet,
    request: &CheckRequest,
    roll: DiceRoll,
    config: &RulesConfig,
) -> CheckOutcome {
    let skill_value = traits.get(request.skill_id);
    let total = roll.magnitude + skill_value + request.base_modifier;
    let margin = total - request.dc;
    let criticality = roll.criticality(config.critical_magnitude);

    tracing::debug!(
        skill = %request.skill_id,
        skill_value,
        magnitude = roll.magnitude,
        total,
        dc = request.dc,
        "resolved check"
    );

    CheckOutcome {
        success: total >= request.dc,
        total,
        margin,
        roll,
        criticality,
    }
}
