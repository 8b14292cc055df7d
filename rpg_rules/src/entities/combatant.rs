//! Combatants and the enemy templates they are spawned from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{EntityId, EquipSlot, EquipmentSlots, Item, ItemInstance, TraitSet};
use crate::error::{RulesError, RulesResult};
use crate::mechanics::{derive_stats, Loadout};

/// Flat additive bonuses on top of traits and gear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatModifiers {
    pub initiative: i32,
    pub attack: i32,
    pub defense: i32,
    pub damage: i32,
    pub damage_reduction: i32,
    pub health: i32,
}

/// Per-encounter fighting state.
///
/// Built fresh for every encounter and discarded afterwards. Current health is
/// kept within `[0, max_health]` by every mutator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CombatantData")]
pub struct Combatant {
    pub id: EntityId,
    pub name: String,
    traits: TraitSet,
    equipment: EquipmentSlots,
    modifiers: StatModifiers,
    current_health: i32,
}

impl Combatant {
    /// Create a combatant at full health.
    pub fn new(
        name: impl Into<String>,
        traits: TraitSet,
        equipment: EquipmentSlots,
        modifiers: StatModifiers,
    ) -> Self {
        let mut combatant = Self {
            id: EntityId::new(),
            name: name.into(),
            traits,
            equipment,
            modifiers,
            current_health: 0,
        };
        combatant.current_health = combatant.max_health();
        combatant
    }

    /// Health left in this encounter.
    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    /// Max health from traits, gear and modifiers; never negative.
    pub fn max_health(&self) -> i32 {
        derive_stats(self).max_health.max(0)
    }

    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    pub fn equipment(&self) -> &EquipmentSlots {
        &self.equipment
    }

    pub fn modifiers(&self) -> &StatModifiers {
        &self.modifiers
    }

    /// Replace the flat modifiers, clamping current health to the new max.
    pub fn set_modifiers(&mut self, modifiers: StatModifiers) {
        self.modifiers = modifiers;
        self.set_health(self.current_health);
    }

    /// Put an item in its slot and return whatever it displaced.
    pub fn equip(&mut self, instance: ItemInstance) -> RulesResult<Option<ItemInstance>> {
        let previous = self.equipment.equip(instance)?;
        self.set_health(self.current_health);
        Ok(previous)
    }

    /// Empty `slot`, clamping current health to the new max.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemInstance> {
        let removed = self.equipment.unequip(slot);
        self.set_health(self.current_health);
        removed
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

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }
}

#[derive(Deserialize)]
struct CombatantData {
    id: EntityId,
    name: String,
    traits: TraitSet,
    equipment: EquipmentSlots,
    modifiers: StatModifiers,
    current_health: i32,
}

impl From<CombatantData> for Combatant {
    fn from(data: CombatantData) -> Self {
        let mut combatant = Self {
            id: data.id,
            name: data.name,
            traits: data.traits,
            equipment: data.equipment,
            modifiers: data.modifiers,
            current_health: 0,
        };
        combatant.set_health(data.current_health);
        combatant
    }
}

impl Loadout for Combatant {
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

/// Immutable enemy definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub traits: TraitSet,
    #[serde(default)]
    pub weapon: Option<Item>,
    #[serde(default)]
    pub armor: Option<Item>,
    #[serde(default)]
    pub modifiers: StatModifiers,
}

impl EnemyTemplate {
    /// A template with no gear and no modifiers.
    pub fn new(id: impl Into<String>, name: impl Into<String>, traits: TraitSet) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            traits,
            weapon: None,
            armor: None,
            modifiers: StatModifiers::default(),
        }
    }

    pub fn with_weapon(mut self, weapon: Item) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_armor(mut self, armor: Item) -> Self {
        self.armor = Some(armor);
        self
    }

    pub fn with_modifiers(mut self, modifiers: StatModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Produce fresh combat state for one encounter.
    pub fn spawn(&self) -> Combatant {
        let equipment = EquipmentSlots {
            weapon: self.weapon.as_ref().map(Item::instantiate),
            armor: self.armor.as_ref().map(Item::instantiate),
        };
        Combatant::new(&self.name, self.traits.clone(), equipment, self.modifiers)
    }

    /// Reject templates that could never fight.
    pub fn validate(&self) -> RulesResult<()> {
        let max_health = self.spawn().max_health();
        if max_health <= 0 {
            return Err(RulesError::invalid_template(
                &self.id,
                format!("max health must be positive, got {}", max_health),
            ));
        }
        Ok(())
    }
}

/// Validated enemy templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EnemyCatalog {
    templates: HashMap<String, EnemyTemplate>,
}

impl EnemyCatalog {
    /// Validate every template and index them by id.
    pub fn new(templates: Vec<EnemyTemplate>) -> RulesResult<Self> {
        let mut map = HashMap::with_capacity(templates.len());
        for template in templates {
            template.validate()?;
            if map.contains_key(&template.id) {
                return Err(RulesError::invalid_template(&template.id, "duplicate enemy id"));
            }
            map.insert(template.id.clone(), template);
        }
        Ok(Self { templates: map })
    }

    /// Load a JSON array of enemy templates.
    pub fn from_json_str(input: &str) -> RulesResult<Self> {
        let templates: Vec<EnemyTemplate> = serde_json::from_str(input)
            .map_err(|e| RulesError::invalid_template("enemies", e.to_string()))?;
        Self::new(templates)
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.get(id)
    }

    /// Like [`EnemyCatalog::get`], but a missing id is an error.
    pub fn require(&self, id: &str) -> RulesResult<&EnemyTemplate> {
        self.get(id).ok_or_else(|| RulesError::not_found("enemy", id))
    }

    /// Whether a template with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Trait;

    fn wolf() -> EnemyTemplate {
        EnemyTemplate::new("wolf", "Grey Wolf", TraitSet::new().with(Trait::Endurance, 2))
    }

    #[test]
    fn test_spawn_starts_at_full_health() {
        let combatant = wolf().spawn();
        assert_eq!(combatant.max_health(), 20);
        assert_eq!(combatant.current_health(), 20);
    }

    #[test]
    fn test_spawn_is_independent_of_template() {
        let template = wolf();
        let mut first = template.spawn();
        first.apply_damage(15);
        let second = template.spawn();
        assert_eq!(first.current_health(), 5);
        assert_eq!(second.current_health(), 20);
    }

    #[test]
    fn test_health_clamped() {
        let mut combatant = wolf().spawn();
        assert_eq!(combatant.apply_damage(50), 20);
        assert_eq!(combatant.current_health(), 0);
        assert!(!combatant.is_alive());

        combatant.set_health(999);
        assert_eq!(combatant.current_health(), 20);

        assert_eq!(combatant.apply_damage(-5), 0);
    }

    #[test]
    fn test_modifier_change_reclamps_health() {
        let mut combatant = wolf().spawn();
        combatant.set_modifiers(StatModifiers {
            health: -15,
            ..Default::default()
        });
        assert_eq!(combatant.max_health(), 5);
        assert_eq!(combatant.current_health(), 5);
    }

    #[test]
    fn test_deserialize_clamps_health() {
        let mut value = serde_json::to_value(wolf().spawn()).unwrap();
        value["current_health"] = serde_json::json!(500);
        let combatant: Combatant = serde_json::from_value(value).unwrap();
        assert_eq!(combatant.current_health(), 20);
    }

    #[test]
    fn test_non_positive_health_rejected() {
        let ghost = EnemyTemplate::new("ghost", "Ghost", TraitSet::new());
        assert!(ghost.validate().is_err());
        assert!(EnemyCatalog::new(vec![ghost]).is_err());

        let drained = wolf().with_modifiers(StatModifiers {
            health: -20,
            ..Default::default()
        });
        assert!(drained.validate().is_err());
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = EnemyCatalog::from_json_str(
            r#"[{
                "id": "bandit",
                "name": "Bandit",
                "traits": {"strength": 2, "agility": 1, "endurance": 1},
                "weapon": {"id": "club", "name": "Club", "kind": "weapon", "damage": 1}
            }]"#,
        )
        .unwrap();
        let bandit = catalog.require("bandit").unwrap().spawn();
        assert_eq!(bandit.max_health(), 10);
        assert!(catalog.require("dragon").is_err());
    }
}
