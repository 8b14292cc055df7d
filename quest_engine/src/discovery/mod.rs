//! Quest discovery.
//!
//! A search at a map location reveals a roll-gated subset of the quest
//! catalog. The roll picks a tier (how many quests, up to which rarity), the
//! highest-rarity eligible quests win, and each one is placed on a tile of its
//! required terrain at a distance drawn from weighted bands.
//!
//! A location only yields new quests when the roll strictly beats the best
//! roll already seen there.

mod location;
mod tables;

pub use location::*;
pub use tables::*;

use rpg_rules::{Coord, RandomSource, Tick, TileMap};
use std::collections::HashSet;

use crate::config::DiscoveryConfig;
use crate::quest::{Quest, QuestCatalog, QuestId};

/// Discovery over one catalog and map.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryEngine<'a> {
    catalog: &'a QuestCatalog,
    map: &'a TileMap,
    config: &'a DiscoveryConfig,
}

impl<'a> DiscoveryEngine<'a> {
    /// Borrow the content a search runs against.
    pub fn new(catalog: &'a QuestCatalog, map: &'a TileMap, config: &'a DiscoveryConfig) -> Self {
        Self {
            catalog,
            map,
            config,
        }
    }

    /// Pick the quests a clamped `roll` reveals at `location`.
    ///
    /// Excludes taken quests and quests already waiting at the location. When
    /// nothing fits the tier's rarity cap, falls back to the first
    /// lowest-rarity quest still available.
    pub fn select_candidates(
        &self,
        roll: u8,
        taken: &HashSet<QuestId>,
        location: &LocationRecord,
        rng: &mut impl RandomSource,
    ) -> Vec<&'a Quest> {
        let Some(tier) = self.config.tiers.lookup(roll) else {
            tracing::warn!(roll, "no discovery tier for roll");
            return Vec::new();
        };

        let remaining: Vec<&'a Quest> = self
            .catalog
            .quests()
            .iter()
            .filter(|q| !taken.contains(&q.id) && !location.contains(&q.id))
            .collect();

        let mut eligible: Vec<&'a Quest> = remaining
            .iter()
            .copied()
            .filter(|q| q.rarity <= tier.max_rarity)
            .collect();

        if eligible.is_empty() {
            return remaining.into_iter().min_by_key(|q| q.rarity).into_iter().collect();
        }

        eligible.sort_by(|a, b| b.rarity.cmp(&a.rarity));
        eligible.truncate(tier.draw_count(rng));
        eligible
    }

    /// Choose a tile for `quest` around `origin`.
    ///
    /// Draws a distance band and picks uniformly among matching tiles inside
    /// it (and inside the quest's `max_distance`). If the band is empty, any
    /// tile of the terrain at least `fallback_min_distance` away will do.
    pub fn assign_location(
        &self,
        quest: &Quest,
        origin: Coord,
        rng: &mut impl RandomSource,
    ) -> Option<Coord> {
        let terrain = quest.target_tile_type;

        if let Some(band) = self.config.bands.draw(rng) {
            let (lo, hi) = (band.min, band.max);
            let cap = quest.max_distance.unwrap_or(u32::MAX);
            let tiles: Vec<Coord> = self
                .map
                .tiles_matching(terrain, origin, move |d| d >= lo && d <= hi && d <= cap)
                .collect();
            if let Some(coord) = pick(&tiles, rng) {
                return Some(coord);
            }
            tracing::debug!(quest = %quest.id, band = %band.name, "no tile in band; falling back");
        }

        let min = self.config.fallback_min_distance;
        let tiles: Vec<Coord> = self
            .map
            .tiles_matching(terrain, origin, move |d| d >= min)
            .collect();
        pick(&tiles, rng)
    }

    /// Run a search at `origin` and commit the new records into `location`.
    ///
    /// Returns the records added by this search, which is empty when the roll
    /// does not improve on the location's best.
    pub fn discover(
        &self,
        origin: Coord,
        raw_roll: i32,
        tick: Tick,
        taken: &HashSet<QuestId>,
        location: &mut LocationRecord,
        rng: &mut impl RandomSource,
    ) -> Vec<DiscoveredQuestRecord> {
        let roll = clamp_roll(raw_roll);
        location.prune_expired(tick);

        if !location.is_improved_by(roll) {
            tracing::debug!(
                %origin,
                roll,
                best = ?location.best_roll(),
                "search roll does not improve location"
            );
            return Vec::new();
        }

        let candidates = self.select_candidates(roll, taken, location, rng);
        location.record_roll(roll, tick);

        let mut found = Vec::with_capacity(candidates.len());
        for quest in candidates {
            let Some(coord) = self.assign_location(quest, origin, rng) else {
                tracing::warn!(
                    quest = %quest.id,
                    terrain = ?quest.target_tile_type,
                    %origin,
                    "no tile for quest; skipping"
                );
                continue;
            };
            let record = DiscoveredQuestRecord {
                quest_id: quest.id.clone(),
                discovered_at: tick,
                coord,
                duration: quest.duration,
            };
            tracing::debug!(quest = %quest.id, %coord, rarity = quest.rarity, "quest discovered");
            location.insert(record.clone());
            found.push(record);
        }

        tracing::info!(%origin, roll, found = found.len(), "search resolved");
        found
    }
}

fn pick(tiles: &[Coord], rng: &mut impl RandomSource) -> Option<Coord> {
    rng.pick_index(tiles.len()).and_then(|i| tiles.get(i).copied())
}
