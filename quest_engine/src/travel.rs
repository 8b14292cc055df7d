//! Staged movement across the map.
//!
//! A [`TravelSequence`] holds at most one multi-step move. While it is in
//! flight no other move can begin; it advances one tile per step and can be
//! cancelled between steps, leaving the traveller on the last tile reached.

use rpg_rules::Coord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{QuestError, QuestResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelSequence {
    position: Option<Coord>,
    pending: VecDeque<Coord>,
}

impl TravelSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a staged move is under way.
    pub fn is_in_flight(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Tile reached by the last completed step.
    pub fn position(&self) -> Option<Coord> {
        self.position
    }

    /// Steps left in the current move.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Start moving from `from` along `path`, one adjacent tile per step.
    pub fn begin(&mut self, from: Coord, path: Vec<Coord>) -> QuestResult<()> {
        if self.is_in_flight() {
            return Err(QuestError::TravelInProgress);
        }
        if path.is_empty() {
            return Err(QuestError::InvalidPath("path is empty".to_string()));
        }
        let mut previous = from;
        for step in &path {
            if previous.distance(step) != 1 {
                return Err(QuestError::InvalidPath(format!(
                    "{} is not adjacent to {}",
                    step, previous
                )));
            }
            previous = *step;
        }
        tracing::debug!(%from, to = %previous, steps = path.len(), "travel started");
        self.position = Some(from);
        self.pending = path.into();
        Ok(())
    }

    /// Complete the next step. Returns the tile entered, or `None` when idle.
    pub fn advance(&mut self) -> Option<Coord> {
        let next = self.pending.pop_front()?;
        self.position = Some(next);
        if self.pending.is_empty() {
            tracing::debug!(at = %next, "travel finished");
        }
        Some(next)
    }

    /// Drop the remaining steps. Returns where the traveller stopped.
    pub fn cancel(&mut self) -> Option<Coord> {
        if self.is_in_flight() {
            tracing::debug!(skipped = self.pending.len(), "travel cancelled");
            self.pending.clear();
        }
        self.position
    }
}
