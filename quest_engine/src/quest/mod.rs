//! Quest content model.
//!
//! A quest is an immutable template: a table of nodes keyed by id, entered at
//! `entry_node_id`. Nodes carry a tagged [`NodeKind`] and a list of
//! [`DecisionOption`]s whose outcome ids point at other nodes in the same
//! quest. References are checked once when a [`QuestCatalog`] is built.

mod catalog;
mod runner;

pub use catalog::*;
pub use runner::*;

use rpg_rules::{Advantage, Terrain, Tick, Trait};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quest identifier as authored in content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl QuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node identifier, unique within one quest.
pub type NodeId = String;

/// Experience, gold and items granted on completion or node entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reward {
    pub xp: u32,
    pub gold: u32,
    /// Item catalog ids.
    pub items: Vec<String>,
}

impl Reward {
    /// A reward of xp and gold with no items.
    pub fn new(xp: u32, gold: u32) -> Self {
        Self {
            xp,
            gold,
            items: Vec::new(),
        }
    }

    /// Add an item to the reward by catalog id.
    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.items.push(item_id.into());
        self
    }

    /// True when the reward grants nothing.
    pub fn is_empty(&self) -> bool {
        self.xp == 0 && self.gold == 0 && self.items.is_empty()
    }
}

/// Harm applied to the player when a check fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consequence {
    pub damage: i32,
    pub description: String,
}

/// Immutable quest template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub img: Option<String>,
    pub rarity: u32,
    pub target_tile_type: Terrain,
    /// Ticks a discovered, unaccepted quest stays available.
    pub duration: Tick,
    /// Upper bound on the distance between search origin and quest site.
    #[serde(default)]
    pub max_distance: Option<u32>,
    #[serde(default)]
    pub reward: Reward,
    pub entry_node_id: NodeId,
    pub nodes: BTreeMap<NodeId, QuestNode>,
}

impl Quest {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&QuestNode> {
        self.nodes.get(id)
    }

    /// The node a run starts at.
    pub fn entry_node(&self) -> Option<&QuestNode> {
        self.node(&self.entry_node_id)
    }
}

/// One unit of quest narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestNode {
    pub id: NodeId,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub reward: Option<Reward>,
    pub kind: NodeKind,
    #[serde(default)]
    pub options: Vec<DecisionOption>,
}

impl QuestNode {
    pub fn new(id: impl Into<NodeId>, description: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: description.into(),
            reward: None,
            kind,
            options: Vec::new(),
        }
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = Some(reward);
        self
    }

    pub fn with_option(mut self, option: DecisionOption) -> Self {
        self.options.push(option);
        self
    }

    /// Terminal nodes end graph walking on entry.
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Narrative,
    Check,
    Battle,
    /// Bridges into another quest template.
    LinkToQuest {
        #[serde(rename = "questId")]
        quest_id: QuestId,
    },
    QuestComplete,
    QuestFail,
}

impl NodeKind {
    /// Terminal kinds end the run on entry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeKind::LinkToQuest { .. } | NodeKind::QuestComplete | NodeKind::QuestFail
        )
    }
}

/// A choice offered at a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub text: String,
    pub action: OptionAction,
}

impl DecisionOption {
    /// An option that moves straight to `outcome`.
    pub fn narrative(text: impl Into<String>, outcome: impl Into<NodeId>) -> Self {
        Self {
            text: text.into(),
            action: OptionAction::Narrative {
                outcome: outcome.into(),
            },
        }
    }

    /// An option that resolves a check and branches on it.
    pub fn check(
        text: impl Into<String>,
        skill: Trait,
        dc: i32,
        success_outcome: impl Into<NodeId>,
        failure_outcome: impl Into<NodeId>,
    ) -> Self {
        Self {
            text: text.into(),
            action: OptionAction::Check {
                skill,
                dc,
                success_outcome: success_outcome.into(),
                failure_outcome: failure_outcome.into(),
                failure_consequence: None,
            },
        }
    }

    /// An option that starts a fight.
    pub fn battle(
        text: impl Into<String>,
        enemy: impl Into<String>,
        advantage: Advantage,
        outcome: impl Into<NodeId>,
    ) -> Self {
        Self {
            text: text.into(),
            action: OptionAction::Battle {
                enemy: enemy.into(),
                advantage,
                outcome: outcome.into(),
                defeat_outcome: None,
            },
        }
    }

    /// Attach a failure consequence to a check option. No-op for other kinds.
    pub fn with_failure_consequence(mut self, consequence: Consequence) -> Self {
        if let OptionAction::Check {
            failure_consequence,
            ..
        } = &mut self.action
        {
            *failure_consequence = Some(consequence);
        }
        self
    }

    /// Route a lost battle to its own node. No-op for other kinds.
    pub fn with_defeat_outcome(mut self, node: impl Into<NodeId>) -> Self {
        if let OptionAction::Battle { defeat_outcome, .. } = &mut self.action {
            *defeat_outcome = Some(node.into());
        }
        self
    }

    /// Every node id this option can lead to.
    pub fn outcomes(&self) -> Vec<&NodeId> {
        match &self.action {
            OptionAction::Narrative { outcome } => vec![outcome],
            OptionAction::Check {
                success_outcome,
                failure_outcome,
                ..
            } => vec![success_outcome, failure_outcome],
            OptionAction::Battle {
                outcome,
                defeat_outcome,
                ..
            } => std::iter::once(outcome).chain(defeat_outcome.as_ref()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OptionAction {
    Narrative {
        outcome: NodeId,
    },
    Check {
        skill: Trait,
        dc: i32,
        #[serde(rename = "successOutcome")]
        success_outcome: NodeId,
        #[serde(rename = "failureOutcome")]
        failure_outcome: NodeId,
        #[serde(rename = "failureConsequence", default)]
        failure_consequence: Option<Consequence>,
    },
    Battle {
        enemy: String,
        #[serde(default)]
        advantage: Advantage,
        outcome: NodeId,
        #[serde(rename = "defeatOutcome", default)]
        defeat_outcome: Option<NodeId>,
    },
}
