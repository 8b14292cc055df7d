//! Per-location discovery state.

use rpg_rules::{Coord, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quest::QuestId;

/// A quest revealed by a search, waiting at a map tile to be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredQuestRecord {
    pub quest_id: QuestId,
    pub discovered_at: Tick,
    /// Tile where the quest takes place.
    pub coord: Coord,
    /// Copied from the quest template.
    pub duration: Tick,
}

impl DiscoveredQuestRecord {
    /// Last tick on which the record is still offered.
    pub fn expires_at(&self) -> Tick {
        self.discovered_at.saturating_add(self.duration)
    }

    /// Whether the record lapsed before `tick`.
    pub fn is_expired(&self, tick: Tick) -> bool {
        self.expires_at() < tick
    }
}

/// Discovery state of one search location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    quests: BTreeMap<QuestId, DiscoveredQuestRecord>,
    best_roll: Option<u8>,
    /// Tick of the last search that improved the best roll.
    improved_at: Option<Tick>,
}

impl LocationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best search roll that committed here.
    pub fn best_roll(&self) -> Option<u8> {
        self.best_roll
    }

    /// Tick of the last committed improvement.
    pub fn improved_at(&self) -> Option<Tick> {
        self.improved_at
    }

    /// A roll only counts when it strictly beats every earlier roll here.
    pub fn is_improved_by(&self, roll: u8) -> bool {
        self.best_roll.map_or(true, |best| roll > best)
    }

    pub(crate) fn record_roll(&mut self, roll: u8, tick: Tick) {
        self.best_roll = Some(roll);
        self.improved_at = Some(tick);
    }

    /// Whether `quest_id` is waiting here.
    pub fn contains(&self, quest_id: &QuestId) -> bool {
        self.quests.contains_key(quest_id)
    }

    pub fn get(&self, quest_id: &QuestId) -> Option<&DiscoveredQuestRecord> {
        self.quests.get(quest_id)
    }

    /// Waiting records in discovery order.
    pub fn records(&self) -> impl Iterator<Item = &DiscoveredQuestRecord> {
        self.quests.values()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub(crate) fn insert(&mut self, record: DiscoveredQuestRecord) {
        self.quests.insert(record.quest_id.clone(), record);
    }

    /// Take a record out, e.g. when its quest is accepted.
    pub fn remove(&mut self, quest_id: &QuestId) -> Option<DiscoveredQuestRecord> {
        self.quests.remove(quest_id)
    }

    /// Drop records whose duration has elapsed. Returns the removed ids.
    pub fn prune_expired(&mut self, tick: Tick) -> Vec<QuestId> {
        let expired: Vec<QuestId> = self
            .quests
            .values()
            .filter(|r| r.is_expired(tick))
            .map(|r| r.quest_id.clone())
            .collect();
        for id in &expired {
            self.quests.remove(id);
        }
        expired
    }
}
