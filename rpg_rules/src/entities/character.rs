//! The player character.

use serde::{Deserialize, Serialize};

use super::{
    Combatant, EntityId, EquipSlot, EquipmentSlots, InstanceId, Inventory, ItemInstance,
    StatModifiers, Trait, TraitSet,
};
use crate::error::{RulesError, RulesResult};
use crate::mechanics::{derive_stats, Loadout};

/// The persistent player: traits, gear, health and progression.
///
/// Everything that feeds max health sits behind methods that re-clamp the
/// current health afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PlayerCharacterData")]
pub struct PlayerCharacter {
    pub id: EntityId,
    pub name: String,

    traits: TraitSet,
    pub inventory: Inventory,
    equipment: EquipmentSlots,
    #[serde(default)]
    modifiers: StatModifiers,

    current_health: i32,

    /// Unspent attribute/training points.
    pub training_points: u32,
    pub xp: u32,
    pub gold: u32,
}

impl PlayerCharacter {
    /// Create a new character at full health.
    pub fn new(name: impl Into<String>, traits: TraitSet) -> Self {
        let mut character = Self {
            id: EntityId::new(),
            name: name.into(),
            traits,
            inventory: Inventory::default(),
            equipment: EquipmentSlots::default(),
            modifiers: StatModifiers::default(),
            current_health: 0,
            training_points: 0,
            xp: 0,
            gold: 0,
        };
        character.current_health = character.max_health();
        character
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Health carried between encounters.
    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    /// Max health derived from traits, gear and modifiers; never negative.
    pub fn max_health(&self) -> i32 {
        derive_stats(self).max_health.max(0)
    }

    /// Set health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: i32) {
        self.current_health = health.clamp(0, self.max_health());
    }

    /// Subtract damage and return the amount actually removed.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let before = self.current_health;
        self.set_health(before - amount.max(0));
        before - self.current_health
    }

    /// Raw trait values.
    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    /// Equipped weapon and armor.
    pub fn equipment(&self) -> &EquipmentSlots {
        &self.equipment
    }

    pub fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }

    /// Overwrite one trait value, e.g. from a character creation screen.
    pub fn set_trait(&mut self, key: Trait, value: u32) {
        self.traits.set(key, value);
        self.set_health(self.current_health);
    }

    /// Replace the flat modifiers. Current health is clamped to the new max.
    pub fn set_modifiers(&mut self, modifiers: StatModifiers) {
        self.modifiers = modifiers;
        self.set_health(self.current_health);
    }

    /// Restore health to maximum.
    pub fn rest(&mut self) {
        self.current_health = self.max_health();
    }

    /// Spend one training point to raise a trait.
    pub fn allocate_point(&mut self, key: Trait) -> RulesResult<u32> {
        if self.training_points == 0 {
            return Err(RulesError::NoTrainingPoints(key));
        }
        self.training_points -= 1;
        let value = self.traits.increment(key);
        // Max health may have moved
        self.set_health(self.current_health);
        tracing::debug!(player = %self.name, trait_name = %key, value, "allocated training point");
        Ok(value)
    }

    /// Add unspent training points, saturating.
    pub fn grant_training_points(&mut self, points: u32) {
        self.training_points = self.training_points.saturating_add(points);
    }

    /// Add quest or battle rewards.
    pub fn gain(&mut self, xp: u32, gold: u32) {
        self.xp = self.xp.saturating_add(xp);
        self.gold = self.gold.saturating_add(gold);
    }

    /// Move an inventory item into its slot; a displaced item goes back to the inventory.
    pub fn equip(&mut self, id: InstanceId) -> RulesResult<()> {
        let instance = self.inventory.take(id)?;
        if instance.item.kind.slot().is_none() {
            self.inventory.add(instance);
            return Err(RulesError::NotEquippable(id));
        }
        if let Some(previous) = self.equipment.equip(instance)? {
            self.inventory.add(previous);
        }
        self.set_health(self.current_health);
        Ok(())
    }

    /// Move the item in `slot` back to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) -> RulesResult<InstanceId> {
        let instance: ItemInstance = self
            .equipment
            .unequip(slot)
            .ok_or(RulesError::SlotEmpty(slot))?;
        let id = instance.instance_id;
        self.inventory.add(instance);
        self.set_health(self.current_health);
        Ok(id)
    }

    /// Snapshot the player as fresh combat state for one encounter.
    pub fn to_combatant(&self) -> Combatant {
        let mut combatant = Combatant::new(
            &self.name,
            self.traits.clone(),
            self.equipment.clone(),
            self.modifiers,
        );
        combatant.id = self.id;
        combatant.set_health(self.current_health);
        combatant
    }
}

/// Wire form of [`PlayerCharacter`]; health is re-clamped on load.
#[derive(Deserialize)]
struct PlayerCharacterData {
    id: EntityId,
    name: String,
    traits: TraitSet,
    inventory: Inventory,
    equipment: EquipmentSlots,
    #[serde(default)]
    modifiers: StatModifiers,
    current_health: i32,
    training_points: u32,
    xp: u32,
    gold: u32,
}

impl From<PlayerCharacterData> for PlayerCharacter {
    fn from(data: PlayerCharacterData) -> Self {
        let mut character = Self {
            id: data.id,
            name: data.name,
            traits: data.traits,
            inventory: data.inventory,
            equipment: data.equipment,
            modifiers: data.modifiers,
            current_health: 0,
            training_points: data.training_points,
            xp: data.xp,
            gold: data.gold,
        };
        character.set_health(data.current_health);
        character
    }
}

impl Loadout for PlayerCharacter {
    fn traits(&self) -> &TraitSet {
        &self.traits
    }

    fn equipment(&self) -> &EquipmentSlots {
        &self.equipment
    }

    fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }
}
