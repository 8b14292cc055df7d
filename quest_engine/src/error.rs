//! Error types for the quest engine.

use rpg_rules::{Coord, RulesError};
use thiserror::Error;

use crate::quest::{NodeId, QuestId};

/// A single referential-integrity problem found in authored content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIssue {
    pub quest_id: QuestId,
    pub node_id: Option<NodeId>,
    pub message: String,
}

impl std::fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(node) => write!(f, "{}/{}: {}", self.quest_id, node, self.message),
            None => write!(f, "{}: {}", self.quest_id, self.message),
        }
    }
}

/// Every integrity problem found by a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} content issue(s): {}", issues.len(), format_issues(issues))]
pub struct ContentError {
    pub issues: Vec<ContentIssue>,
}

fn format_issues(issues: &[ContentIssue]) -> String {
    issues
        .iter()
        .map(ContentIssue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by quest engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Content(#[from] ContentError),

    /// An outcome id has no node. Content integrity failure.
    #[error("quest {quest_id} has no node '{node_id}'")]
    UnknownNode { quest_id: QuestId, node_id: NodeId },

    #[error("quest not found: {0}")]
    UnknownQuest(QuestId),

    #[error("node '{node_id}' has no option {index}")]
    UnknownOption { node_id: NodeId, index: usize },

    /// The pre-computed result handed in does not fit the chosen option.
    #[error("option {index} of node '{node_id}' cannot take {reason}")]
    InvalidAuxiliary {
        node_id: NodeId,
        index: usize,
        reason: String,
    },

    #[error("quest {0} has already finished")]
    QuestFinished(QuestId),

    #[error("quest {0} is already in the ledger")]
    QuestAlreadyTaken(QuestId),

    #[error("quest {quest_id} was not discovered at {location}")]
    NotDiscovered { location: Coord, quest_id: QuestId },

    #[error("no quest is being played")]
    NoActiveQuest,

    #[error("quest {0} is still being played")]
    QuestInProgress(QuestId),

    #[error("no linked quest to follow")]
    NoPendingLink,

    #[error("a travel sequence is already in flight")]
    TravelInProgress,

    #[error("invalid travel path: {0}")]
    InvalidPath(String),

    #[error("config error: {0}")]
    Config(String),
}

impl QuestError {
    pub fn unknown_node(quest_id: &QuestId, node_id: impl Into<NodeId>) -> Self {
        Self::UnknownNode {
            quest_id: quest_id.clone(),
            node_id: node_id.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type QuestResult<T> = Result<T, QuestError>;
