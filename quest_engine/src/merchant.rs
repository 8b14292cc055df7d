//! Merchant stock.
//!
//! The shelf is regenerated on a tick interval: expired instances go first,
//! then random catalog items are stocked up to the configured maximum. Every
//! stocked copy gets its own instance id.

use rpg_rules::{
    InstanceId, ItemCatalog, ItemInstance, PlayerCharacter, RandomSource, RulesError, Tick,
};
use serde::{Deserialize, Serialize};

use crate::config::MerchantConfig;
use crate::error::QuestResult;

/// An item instance on the shelf until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantItem {
    pub instance: ItemInstance,
    pub expires_at: Tick,
}

impl MerchantItem {
    pub fn instance_id(&self) -> InstanceId {
        self.instance.instance_id
    }

    /// Buying price in gold.
    pub fn price(&self) -> u32 {
        self.instance.item.value
    }

    /// Whether the lifetime ran out before `tick`.
    pub fn is_expired(&self, tick: Tick) -> bool {
        self.expires_at < tick
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantStock {
    items: Vec<MerchantItem>,
    last_refresh: Option<Tick>,
}

impl MerchantStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shelf contents in stocking order.
    pub fn items(&self) -> &[MerchantItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_refresh(&self) -> Option<Tick> {
        self.last_refresh
    }

    /// Whether `refresh_interval` ticks passed since the last refresh.
    pub fn is_due(&self, tick: Tick, config: &MerchantConfig) -> bool {
        self.last_refresh
            .map_or(true, |last| tick.saturating_sub(last) >= config.refresh_interval)
    }

    /// Remove expired instances. Returns how many were dropped.
    pub fn prune_expired(&mut self, tick: Tick) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_expired(tick));
        before - self.items.len()
    }

    /// Regenerate the shelf if the refresh interval has elapsed.
    ///
    /// Returns whether a refresh happened.
    pub fn refresh(
        &mut self,
        tick: Tick,
        catalog: &ItemCatalog,
        config: &MerchantConfig,
        rng: &mut impl RandomSource,
    ) -> bool {
        if !self.is_due(tick, config) {
            return false;
        }
        let pruned = self.prune_expired(tick);
        let mut stocked = 0;
        while self.items.len() < config.max_stock {
            let Some(item) = rng
                .pick_index(catalog.len())
                .and_then(|i| catalog.items().get(i))
            else {
                break;
            };
            self.items.push(MerchantItem {
                instance: item.instantiate(),
                expires_at: tick.saturating_add(config.item_lifetime),
            });
            stocked += 1;
        }
        self.last_refresh = Some(tick);
        tracing::debug!(tick, pruned, stocked, total = self.items.len(), "merchant refreshed");
        true
    }

    /// Sell a shelf item to the player for its value.
    pub fn buy(
        &mut self,
        id: InstanceId,
        player: &mut PlayerCharacter,
    ) -> QuestResult<ItemInstance> {
        let index = self
            .items
            .iter()
            .position(|item| item.instance_id() == id)
            .ok_or_else(|| RulesError::not_found("merchant item", id.to_string()))?;
        let price = self.items[index].price();
        if player.gold < price {
            return Err(RulesError::InsufficientGold {
                needed: price,
                available: player.gold,
            }
            .into());
        }
        player.gold -= price;
        let instance = self.items.remove(index).instance;
        player.inventory.add(instance.clone());
        tracing::info!(item = %instance.item.id, price, "item bought");
        Ok(instance)
    }

    /// Buy an inventory item from the player. Returns the gold paid.
    ///
    /// The item goes on the shelf with a fresh lifetime if, after expired
    /// entries are pruned, there is room below `max_stock`. Otherwise the
    /// merchant keeps the gold flow but discards the item.
    pub fn sell(
        &mut self,
        id: InstanceId,
        player: &mut PlayerCharacter,
        tick: Tick,
        config: &MerchantConfig,
    ) -> QuestResult<u32> {
        let instance = player.inventory.take(id)?;
        let paid = sell_price(instance.item.value, config);
        player.gold = player.gold.saturating_add(paid);
        tracing::info!(item = %instance.item.id, paid, "item sold");
        self.prune_expired(tick);
        if self.items.len() < config.max_stock {
            self.items.push(MerchantItem {
                instance,
                expires_at: tick.saturating_add(config.item_lifetime),
            });
        } else {
            tracing::debug!(item = %instance.item.id, "shelf full; sold item discarded");
        }
        Ok(paid)
    }
}

/// Gold the merchant pays for an item of `value`.
pub fn sell_price(value: u32, config: &MerchantConfig) -> u32 {
    let paid = u64::from(value) * u64::from(config.sell_ratio_percent) / 100;
    u32::try_from(paid).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuestError;
    use rpg_rules::{FixedRandom, Item, ItemKind, TraitSet};

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(vec![
            Item::new("sword", "Sword", ItemKind::Weapon).with_value(40),
            Item::new("rope", "Rope", ItemKind::Misc).with_value(5),
        ])
        .unwrap()
    }

    fn config() -> MerchantConfig {
        MerchantConfig {
            refresh_interval: 10,
            max_stock: 3,
            item_lifetime: 15,
            sell_ratio_percent: 50,
        }
    }

    #[test]
    fn test_refresh_fills_to_max_with_distinct_instances() {
        let mut stock = MerchantStock::new();
        let mut rng = FixedRandom::new(vec![0, 1, 0]);
        assert!(stock.refresh(0, &catalog(), &config(), &mut rng));

        assert_eq!(stock.len(), 3);
        let ids: Vec<&str> = stock
            .items()
            .iter()
            .map(|i| i.instance.item.id.as_str())
            .collect();
        assert_eq!(ids, vec!["sword", "rope", "sword"]);
        assert_ne!(stock.items()[0].instance_id(), stock.items()[2].instance_id());
        assert!(stock.items().iter().all(|i| i.expires_at == 15));
    }

    #[test]
    fn test_refresh_is_interval_gated() {
        let mut stock = MerchantStock::new();
        let mut rng = FixedRandom::constant(0);
        assert!(stock.refresh(0, &catalog(), &config(), &mut rng));
        assert!(!stock.refresh(9, &catalog(), &config(), &mut rng));
        assert!(stock.refresh(10, &catalog(), &config(), &mut rng));
        assert_eq!(stock.last_refresh(), Some(10));
    }

    #[test]
    fn test_refresh_prunes_expired_first() {
        let mut stock = MerchantStock::new();
        let mut rng = FixedRandom::constant(0);
        stock.refresh(0, &catalog(), &config(), &mut rng);
        let old: Vec<InstanceId> = stock.items().iter().map(MerchantItem::instance_id).collect();

        stock.refresh(20, &catalog(), &config(), &mut rng);
        assert_eq!(stock.len(), 3);
        assert!(stock.items().iter().all(|i| !old.contains(&i.instance_id())));
    }

    #[test]
    fn test_empty_catalog_stocks_nothing() {
        let mut stock = MerchantStock::new();
        let empty = ItemCatalog::new(vec![]).unwrap();
        assert!(stock.refresh(0, &empty, &config(), &mut FixedRandom::constant(0)));
        assert!(stock.is_empty());
    }

    #[test]
    fn test_buy_and_sell() {
        let mut stock = MerchantStock::new();
        stock.refresh(0, &catalog(), &config(), &mut FixedRandom::constant(0));
        let mut player = PlayerCharacter::new("Hero", TraitSet::new());
        let sword = stock.items()[0].instance_id();

        let poor = stock.buy(sword, &mut player);
        assert_eq!(
            poor,
            Err(QuestError::Rules(RulesError::InsufficientGold {
                needed: 40,
                available: 0
            }))
        );

        player.gold = 50;
        let bought = stock.buy(sword, &mut player).unwrap();
        assert_eq!(player.gold, 10);
        assert_eq!(stock.len(), 2);
        assert!(player.inventory.contains(bought.instance_id));

        let paid = stock.sell(bought.instance_id, &mut player, 3, &config()).unwrap();
        assert_eq!(paid, 20);
        assert_eq!(player.gold, 30);
        assert!(player.inventory.is_empty());
        assert_eq!(stock.len(), 3);
        assert_eq!(stock.items()[2].expires_at, 18);
    }

    #[test]
    fn test_sell_onto_full_shelf_keeps_max_stock() {
        let config = MerchantConfig {
            max_stock: 2,
            ..config()
        };
        let mut stock = MerchantStock::new();
        stock.refresh(0, &catalog(), &config, &mut FixedRandom::constant(1));
        assert_eq!(stock.len(), 2);

        let mut player = PlayerCharacter::new("Hero", TraitSet::new());
        let rope = Item::new("rope", "Rope", ItemKind::Misc).with_value(5);
        for _ in 0..5 {
            let instance = rope.instantiate();
            let id = instance.instance_id;
            player.inventory.add(instance);
            assert_eq!(stock.sell(id, &mut player, 1, &config).unwrap(), 2);
        }

        assert_eq!(stock.len(), 2);
        assert_eq!(player.gold, 10);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_sell_reuses_slot_freed_by_expiry() {
        let config = MerchantConfig {
            max_stock: 1,
            ..config()
        };
        let mut stock = MerchantStock::new();
        stock.refresh(0, &catalog(), &config, &mut FixedRandom::constant(0));

        let mut player = PlayerCharacter::new("Hero", TraitSet::new());
        let rope = catalog().require("rope").unwrap().instantiate();
        let id = rope.instance_id;
        player.inventory.add(rope);
        stock.sell(id, &mut player, 16, &config).unwrap();

        assert_eq!(stock.len(), 1);
        assert_eq!(stock.items()[0].instance_id(), id);
    }

    #[test]
    fn test_sell_price_rounds_down() {
        assert_eq!(sell_price(5, &config()), 2);
        assert_eq!(sell_price(0, &config()), 0);
    }
}
