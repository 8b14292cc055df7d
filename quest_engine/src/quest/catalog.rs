//! Quest catalog and load-time validation.

use rpg_rules::{EnemyCatalog, ItemCatalog};
use std::collections::HashMap;

use super::{NodeKind, OptionAction, Quest, QuestId, Reward};
use crate::error::{ContentError, ContentIssue, QuestError, QuestResult};

/// Catalogs the quest graph is validated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationScope<'a> {
    pub enemies: Option<&'a EnemyCatalog>,
    pub items: Option<&'a ItemCatalog>,
}

/// The master quest catalog, in authoring order.
///
/// Only constructible through a validation pass, so every outcome id of every
/// option resolves to a node of the same quest.
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: Vec<Quest>,
    index: HashMap<QuestId, usize>,
}

impl QuestCatalog {
    /// Validate and index quests.
    pub fn from_quests(
        quests: Vec<Quest>,
        scope: ValidationScope<'_>,
    ) -> Result<Self, ContentError> {
        let mut index = HashMap::with_capacity(quests.len());
        let mut issues = Vec::new();

        for (i, quest) in quests.iter().enumerate() {
            if index.insert(quest.id.clone(), i).is_some() {
                issues.push(issue(&quest.id, None, "duplicate quest id"));
            }
        }
        for quest in &quests {
            validate_quest(quest, &index, scope, &mut issues);
        }

        if !issues.is_empty() {
            return Err(ContentError { issues });
        }
        tracing::info!(quests = quests.len(), "quest catalog validated");
        Ok(Self { quests, index })
    }

    /// Load a JSON array of quests and validate it.
    pub fn from_json_str(input: &str, scope: ValidationScope<'_>) -> QuestResult<Self> {
        let quests: Vec<Quest> = serde_json::from_str(input).map_err(|e| ContentError {
            issues: vec![issue(&QuestId::from("<catalog>"), None, e.to_string())],
        })?;
        Ok(Self::from_quests(quests, scope)?)
    }

    /// Look up a quest by id.
    pub fn get(&self, id: &QuestId) -> Option<&Quest> {
        self.index.get(id).map(|i| &self.quests[*i])
    }

    /// Like [`QuestCatalog::get`], but a missing id is an error.
    pub fn require(&self, id: &QuestId) -> QuestResult<&Quest> {
        self.get(id).ok_or_else(|| QuestError::UnknownQuest(id.clone()))
    }

    pub fn contains(&self, id: &QuestId) -> bool {
        self.index.contains_key(id)
    }

    /// Quests in authoring order.
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

fn issue(quest_id: &QuestId, node_id: Option<&str>, message: impl Into<String>) -> ContentIssue {
    ContentIssue {
        quest_id: quest_id.clone(),
        node_id: node_id.map(str::to_string),
        message: message.into(),
    }
}

fn validate_quest(
    quest: &Quest,
    index: &HashMap<QuestId, usize>,
    scope: ValidationScope<'_>,
    issues: &mut Vec<ContentIssue>,
) {
    if !quest.nodes.contains_key(&quest.entry_node_id) {
        issues.push(issue(
            &quest.id,
            None,
            format!("entry node '{}' does not exist", quest.entry_node_id),
        ));
    }
    validate_reward(quest, None, &quest.reward, scope, issues);

    for (key, node) in &quest.nodes {
        let at = Some(key.as_str());
        if *key != node.id {
            issues.push(issue(
                &quest.id,
                at,
                format!("node is keyed as '{}' but named '{}'", key, node.id),
            ));
        }
        if let Some(reward) = &node.reward {
            validate_reward(quest, at, reward, scope, issues);
        }
        if let NodeKind::LinkToQuest { quest_id } = &node.kind {
            if !index.contains_key(quest_id) {
                issues.push(issue(
                    &quest.id,
                    at,
                    format!("links to unknown quest '{}'", quest_id),
                ));
            }
        }
        if node.is_terminal() && !node.options.is_empty() {
            // Terminal nodes auto-resolve; listed options are never offered.
            tracing::warn!(
                quest = %quest.id,
                node = %key,
                options = node.options.len(),
                "terminal node lists options that will be ignored"
            );
        }
        if !node.is_terminal() && node.options.is_empty() {
            issues.push(issue(&quest.id, at, "non-terminal node has no options"));
        }

        for option in &node.options {
            for outcome in option.outcomes() {
                if !quest.nodes.contains_key(outcome) {
                    issues.push(issue(
                        &quest.id,
                        at,
                        format!("option '{}' leads to missing node '{}'", option.text, outcome),
                    ));
                }
            }
            if let (OptionAction::Battle { enemy, .. }, Some(enemies)) =
                (&option.action, scope.enemies)
            {
                if !enemies.contains(enemy) {
                    issues.push(issue(
                        &quest.id,
                        at,
                        format!("option '{}' fights unknown enemy '{}'", option.text, enemy),
                    ));
                }
            }
        }
    }
}

fn validate_reward(
    quest: &Quest,
    node: Option<&str>,
    reward: &Reward,
    scope: ValidationScope<'_>,
    issues: &mut Vec<ContentIssue>,
) {
    let Some(items) = scope.items else {
        return;
    };
    for item_id in &reward.items {
        if items.get(item_id).is_none() {
            issues.push(issue(
                &quest.id,
                node,
                format!("reward references unknown item '{}'", item_id),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::{DecisionOption, QuestNode};
    use rpg_rules::{Advantage, EnemyTemplate, Item, ItemKind, Terrain, Trait, TraitSet};
    use std::collections::BTreeMap;

    fn quest(id: &str, nodes: Vec<QuestNode>) -> Quest {
        Quest {
            id: QuestId::from(id),
            title: format!("Quest {}", id),
            description: String::new(),
            img: None,
            rarity: 1,
            target_tile_type: Terrain::Forest,
            duration: 10,
            max_distance: None,
            reward: Reward::default(),
            entry_node_id: "start".to_string(),
            nodes: nodes
                .into_iter()
                .map(|n| (n.id.clone(), n))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn simple_quest(id: &str) -> Quest {
        quest(
            id,
            vec![
                QuestNode::new("start", "Begin", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Go", "end")),
                QuestNode::new("end", "Done", NodeKind::QuestComplete),
            ],
        )
    }

    #[test]
    fn test_valid_catalog() {
        let catalog = QuestCatalog::from_quests(
            vec![simple_quest("a"), simple_quest("b")],
            ValidationScope::default(),
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&QuestId::from("b")));
        assert_eq!(catalog.quests()[0].id, QuestId::from("a"));
        assert!(matches!(
            catalog.require(&QuestId::from("zzz")),
            Err(QuestError::UnknownQuest(_))
        ));
    }

    #[test]
    fn test_dangling_outcome_reported() {
        let broken = quest(
            "broken",
            vec![QuestNode::new("start", "Begin", NodeKind::Check).with_option(
                DecisionOption::check("Climb", Trait::Athletics, 2, "top", "bottom"),
            )],
        );
        let err = QuestCatalog::from_quests(vec![broken], ValidationScope::default()).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.issues.iter().all(|i| i.node_id.as_deref() == Some("start")));
    }

    #[test]
    fn test_collects_all_issues() {
        let mut missing_entry = simple_quest("a");
        missing_entry.entry_node_id = "nowhere".to_string();
        let linked = quest(
            "b",
            vec![QuestNode::new(
                "start",
                "Onward",
                NodeKind::LinkToQuest {
                    quest_id: QuestId::from("ghost"),
                },
            )],
        );
        let err = QuestCatalog::from_quests(
            vec![missing_entry, linked, simple_quest("a")],
            ValidationScope::default(),
        )
        .unwrap_err();

        let messages: Vec<_> = err.issues.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.contains(&"duplicate quest id"));
        assert!(messages.iter().any(|m| m.contains("entry node 'nowhere'")));
        assert!(messages.iter().any(|m| m.contains("unknown quest 'ghost'")));
    }

    #[test]
    fn test_scope_checks_enemies_and_items() {
        let enemies = EnemyCatalog::new(vec![EnemyTemplate::new(
            "wolf",
            "Wolf",
            TraitSet::new().with(Trait::Endurance, 1),
        )])
        .unwrap();
        let items = ItemCatalog::new(vec![Item::new("herb", "Herb", ItemKind::Misc)]).unwrap();
        let scope = ValidationScope {
            enemies: Some(&enemies),
            items: Some(&items),
        };

        let mut q = quest(
            "hunt",
            vec![
                QuestNode::new("start", "Tracks", NodeKind::Battle)
                    .with_option(DecisionOption::battle("Fight", "bear", Advantage::None, "end")),
                QuestNode::new("end", "Done", NodeKind::QuestComplete)
                    .with_reward(Reward::new(1, 1).with_item("herb")),
            ],
        );
        q.reward = Reward::default().with_item("crown");

        let err = QuestCatalog::from_quests(vec![q], scope).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.issues.iter().any(|i| i.message.contains("unknown enemy 'bear'")));
        assert!(err.issues.iter().any(|i| i.message.contains("unknown item 'crown'")));
    }

    #[test]
    fn test_dead_end_node_reported() {
        let q = quest(
            "stuck",
            vec![
                QuestNode::new("start", "Begin", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Go", "hall")),
                QuestNode::new("hall", "An empty hall", NodeKind::Narrative),
                QuestNode::new("end", "Done", NodeKind::QuestComplete),
            ],
        );
        let err = QuestCatalog::from_quests(vec![q], ValidationScope::default()).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ContentIssue {
                quest_id: QuestId::from("stuck"),
                node_id: Some("hall".to_string()),
                message: "non-terminal node has no options".to_string(),
            }]
        );
    }

    #[test]
    fn test_terminal_with_options_is_accepted() {
        let q = quest(
            "odd",
            vec![
                QuestNode::new("start", "Begin", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Go", "end")),
                QuestNode::new("end", "Done", NodeKind::QuestComplete)
                    .with_option(DecisionOption::narrative("Again", "start")),
            ],
        );
        assert!(QuestCatalog::from_quests(vec![q], ValidationScope::default()).is_ok());
    }

    #[test]
    fn test_from_json() {
        let catalog = QuestCatalog::from_json_str(
            r#"[{
                "id": "lost-ring",
                "title": "The Lost Ring",
                "description": "A ring went missing.",
                "rarity": 2,
                "targetTileType": "swamp",
                "duration": 12,
                "maxDistance": 8,
                "reward": {"gold": 10, "xp": 5},
                "entryNodeId": "start",
                "nodes": {
                    "start": {
                        "id": "start",
                        "description": "Mud everywhere.",
                        "kind": {"type": "narrative"},
                        "options": [
                            {"text": "Dig", "action": {"type": "narrative", "outcome": "found"}}
                        ]
                    },
                    "found": {
                        "id": "found",
                        "description": "Found it!",
                        "kind": {"type": "questComplete"}
                    }
                }
            }]"#,
            ValidationScope::default(),
        )
        .unwrap();
        let quest = catalog.require(&QuestId::from("lost-ring")).unwrap();
        assert_eq!(quest.target_tile_type, Terrain::Swamp);
        assert_eq!(quest.max_distance, Some(8));
        assert_eq!(quest.reward, Reward::new(5, 10));

        assert!(QuestCatalog::from_json_str("not json", ValidationScope::default()).is_err());
    }
}
