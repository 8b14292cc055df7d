//! Derived combat statistics.
//!
//! Derived stats are never stored. They are recomputed from traits, equipped
//! gear and flat modifiers on every read, so equipping or unequipping an item
//! is reflected immediately.

use serde::{Deserialize, Serialize};

use crate::entities::{EquipmentSlots, StatModifiers, Trait, TraitSet};

/// Max health granted per point of endurance.
pub const HEALTH_PER_ENDURANCE: i32 = 10;

/// Anything that carries the inputs of the stat formulas.
pub trait Loadout {
    fn traits(&self) -> &TraitSet;
    fn equipment(&self) -> &EquipmentSlots;
    fn modifiers(&self) -> &StatModifiers;
}

/// Stats derived from a [`Loadout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    pub initiative: i32,
    pub attack: i32,
    pub defense: i32,
    pub damage: i32,
    pub damage_reduction: i32,
    pub max_health: i32,
}

/// Compute derived stats. Missing equipment contributes 0.
pub fn derive_stats(loadout: &(impl Loadout + ?Sized)) -> DerivedStats {
    let traits = loadout.traits();
    let equipment = loadout.equipment();
    let modifiers = loadout.modifiers();

    let agility = traits.get(Trait::Agility);
    let intelligence = traits.get(Trait::Intelligence);
    let strength = traits.get(Trait::Strength);
    let endurance = traits.get(Trait::Endurance);

    let weapon = equipment.weapon_item();
    let armor = equipment.armor_item();
    let weapon_attack = weapon.map(|w| w.attack).unwrap_or(0);
    let weapon_defense = weapon.map(|w| w.defense).unwrap_or(0);
    let weapon_damage = weapon.map(|w| w.damage).unwrap_or(0);
    let armor_reduction = armor.map(|a| a.damage_reduction).unwrap_or(0);

    DerivedStats {
        initiative: agility + intelligence + modifiers.initiative,
        attack: agility + intelligence + weapon_attack + modifiers.attack,
        defense: agility + intelligence + weapon_defense + modifiers.defense,
        damage: strength + weapon_damage + modifiers.damage,
        damage_reduction: armor_reduction + modifiers.damage_reduction,
        max_health: endurance * HEALTH_PER_ENDURANCE + modifiers.health,
    }
}
