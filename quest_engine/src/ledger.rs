//! The player's quest ledger.

use rpg_rules::Tick;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{QuestError, QuestResult};
use crate::quest::QuestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub status: QuestStatus,
    /// Tick the status was set.
    pub since: Tick,
}

/// Every quest the player has accepted, with its current status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestLedger {
    entries: BTreeMap<QuestId, LedgerEntry>,
}

impl QuestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly accepted quest. A quest can only be accepted once.
    pub fn accept(&mut self, id: &QuestId, tick: Tick) -> QuestResult<()> {
        if self.entries.contains_key(id) {
            return Err(QuestError::QuestAlreadyTaken(id.clone()));
        }
        self.entries.insert(
            id.clone(),
            LedgerEntry {
                status: QuestStatus::Active,
                since: tick,
            },
        );
        tracing::info!(quest = %id, tick, "quest accepted");
        Ok(())
    }

    /// Mark `id` completed at `tick`.
    pub fn complete(&mut self, id: &QuestId, tick: Tick) {
        self.set_status(id, QuestStatus::Completed, tick);
    }

    /// Mark `id` failed at `tick`.
    pub fn fail(&mut self, id: &QuestId, tick: Tick) {
        self.set_status(id, QuestStatus::Failed, tick);
    }

    fn set_status(&mut self, id: &QuestId, status: QuestStatus, tick: Tick) {
        self.entries
            .insert(id.clone(), LedgerEntry { status, since: tick });
        tracing::info!(quest = %id, ?status, tick, "quest status changed");
    }

    /// Status and tick of the last change.
    pub fn entry(&self, id: &QuestId) -> Option<LedgerEntry> {
        self.entries.get(id).copied()
    }

    /// Current status of `id`, if it was ever accepted.
    pub fn status(&self, id: &QuestId) -> Option<QuestStatus> {
        self.entry(id).map(|e| e.status)
    }

    /// Whether `id` is in the ledger in any state.
    pub fn is_taken(&self, id: &QuestId) -> bool {
        self.entries.contains_key(id)
    }

    /// Ids that are active, completed or failed.
    pub fn taken_ids(&self) -> HashSet<QuestId> {
        self.entries.keys().cloned().collect()
    }

    /// Quest ids currently in `status`.
    pub fn with_status(&self, status: QuestStatus) -> impl Iterator<Item = &QuestId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, e)| e.status == status)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
