//! Items, inventory and equipment slots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::InstanceId;
use crate::error::{RulesError, RulesResult};

/// Item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Armor,
    Misc,
}

/// Equipment slots a combatant can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipSlot {
    Weapon,
    Armor,
}

impl ItemKind {
    /// Slot this kind of item occupies, if any.
    pub fn slot(&self) -> Option<EquipSlot> {
        match self {
            ItemKind::Weapon => Some(EquipSlot::Weapon),
            ItemKind::Armor => Some(EquipSlot::Armor),
            ItemKind::Misc => None,
        }
    }
}

/// Immutable item template with fixed stat contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub damage: i32,
    #[serde(default)]
    pub damage_reduction: i32,
    #[serde(default)]
    pub value: u32,
}

impl Item {
    /// A definition with zero bonuses and no value.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            attack: 0,
            defense: 0,
            damage: 0,
            damage_reduction: 0,
            value: 0,
        }
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_damage_reduction(mut self, damage_reduction: i32) -> Self {
        self.damage_reduction = damage_reduction;
        self
    }

    /// Base price in gold.
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Produce a new uniquely identified copy of this template.
    pub fn instantiate(&self) -> ItemInstance {
        ItemInstance {
            instance_id: InstanceId::new(),
            item: self.clone(),
        }
    }
}

/// A concrete copy of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInstance {
    pub instance_id: InstanceId,
    pub item: Item,
}

/// Items carried but not equipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<ItemInstance>,
}

impl Inventory {
    /// Add an instance to the bag.
    pub fn add(&mut self, instance: ItemInstance) {
        self.items.push(instance);
    }

    /// Remove and return an instance.
    pub fn take(&mut self, id: InstanceId) -> RulesResult<ItemInstance> {
        let index = self
            .items
            .iter()
            .position(|i| i.instance_id == id)
            .ok_or_else(|| RulesError::not_found("item instance", id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Find an instance by id.
    pub fn get(&self, id: InstanceId) -> Option<&ItemInstance> {
        self.items.iter().find(|i| i.instance_id == id)
    }

    /// Whether the bag holds `id`.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    /// Number of carried instances.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// At most one weapon and one armor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentSlots {
    pub weapon: Option<ItemInstance>,
    pub armor: Option<ItemInstance>,
}

impl EquipmentSlots {
    /// Item equipped in `slot`, if any.
    pub fn get(&self, slot: EquipSlot) -> Option<&ItemInstance> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
        }
    }

    /// Place an instance in its slot, returning whatever it displaced.
    pub fn equip(&mut self, instance: ItemInstance) -> RulesResult<Option<ItemInstance>> {
        let slot = instance
            .item
            .kind
            .slot()
            .ok_or(RulesError::NotEquippable(instance.instance_id))?;
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
        };
        Ok(target.replace(instance))
    }

    /// Empty `slot` and return what was there.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemInstance> {
        match slot {
            EquipSlot::Weapon => self.weapon.take(),
            EquipSlot::Armor => self.armor.take(),
        }
    }

    /// Definition of the equipped weapon.
    pub fn weapon_item(&self) -> Option<&Item> {
        self.weapon.as_ref().map(|i| &i.item)
    }

    /// Definition of the equipped armor.
    pub fn armor_item(&self) -> Option<&Item> {
        self.armor.as_ref().map(|i| &i.item)
    }
}

/// Item templates keyed by id, in authoring order.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    /// Index item definitions. Duplicate ids are rejected.
    pub fn new(items: Vec<Item>) -> RulesResult<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), i).is_some() {
                return Err(RulesError::invalid_template(&item.id, "duplicate item id"));
            }
        }
        Ok(Self { items, index })
    }

    /// Load a JSON array of item templates.
    pub fn from_json_str(input: &str) -> RulesResult<Self> {
        let items: Vec<Item> = serde_json::from_str(input)
            .map_err(|e| RulesError::invalid_template("items", e.to_string()))?;
        Self::new(items)
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|i| &self.items[*i])
    }

    /// Like [`ItemCatalog::get`], but a missing id is an error.
    pub fn require(&self, id: &str) -> RulesResult<&Item> {
        self.get(id).ok_or_else(|| RulesError::not_found("item", id))
    }

    /// Definitions in load order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
