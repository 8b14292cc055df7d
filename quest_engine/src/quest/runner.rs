//! Walking a quest graph.
//!
//! A [`QuestRun`] tracks one active quest: the current node, which node-level
//! rewards were already paid out, and whether the run has ended. Each call to
//! [`QuestRun::choose`] resolves one option atomically: every node it can lead
//! to is looked up before any damage, reward or ledger change is applied.

use rpg_rules::{
    fight, resolve_check, resolve_check_with_roll, BattleResult, CheckOutcome, CheckRequest,
    Criticality, DiceRoll, EnemyCatalog, ItemCatalog, ItemInstance, PlayerCharacter,
    RandomSource, RulesConfig, Side, Tick,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{NodeId, NodeKind, OptionAction, Quest, QuestId, QuestNode, Reward};
use crate::error::{QuestError, QuestResult};
use crate::ledger::QuestLedger;

/// Everything a quest transition may read or change.
pub struct QuestContext<'a, R: RandomSource> {
    pub player: &'a mut PlayerCharacter,
    pub ledger: &'a mut QuestLedger,
    pub enemies: &'a EnemyCatalog,
    pub items: &'a ItemCatalog,
    pub rules: &'a RulesConfig,
    pub rng: &'a mut R,
    pub tick: Tick,
}

/// Result produced outside the engine and handed in with a choice.
///
/// Lets an interactive shell animate its own dice or run its own fight while
/// the engine still decides the branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuxiliaryResult {
    #[default]
    None,
    /// Dice already rolled for a check option.
    Roll(DiceRoll),
    /// A battle already fought; health was written back by the caller.
    Battle(BattleResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    InProgress,
    Completed,
    Failed,
    /// Ended by a bridge into another quest.
    Linked(QuestId),
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, RunStatus::InProgress)
    }
}

/// What one transition did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Node the option was chosen at; `None` when starting the quest.
    pub from: Option<NodeId>,
    pub to: NodeId,
    pub check: Option<CheckOutcome>,
    pub battle: Option<BattleResult>,
    pub damage_taken: i32,
    pub rewards: Vec<Reward>,
    pub commentary: Option<String>,
    pub status: RunStatus,
}

impl StepReport {
    fn new(from: Option<NodeId>, to: NodeId) -> Self {
        Self {
            from,
            to,
            check: None,
            battle: None,
            damage_taken: 0,
            rewards: Vec::new(),
            commentary: None,
            status: RunStatus::InProgress,
        }
    }
}

/// State of one active quest instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRun {
    quest_id: QuestId,
    current_node: NodeId,
    rewarded_nodes: BTreeSet<NodeId>,
    status: RunStatus,
}

impl QuestRun {
    /// Enter the quest's entry node.
    pub fn start<R: RandomSource>(
        quest: &Quest,
        ctx: &mut QuestContext<'_, R>,
    ) -> QuestResult<(Self, StepReport)> {
        let entry = enterable(quest, &quest.entry_node_id, ctx.items)?;
        let mut run = Self {
            quest_id: quest.id.clone(),
            current_node: entry.id.clone(),
            rewarded_nodes: BTreeSet::new(),
            status: RunStatus::InProgress,
        };
        let mut report = StepReport::new(None, entry.id.clone());
        run.enter(quest, entry, ctx, &mut report)?;
        Ok((run, report))
    }

    pub fn quest_id(&self) -> &QuestId {
        &self.quest_id
    }

    /// Node the run is currently at.
    pub fn current_node_id(&self) -> &NodeId {
        &self.current_node
    }

    /// Resolve the current node inside `quest`.
    pub fn current_node<'q>(&self, quest: &'q Quest) -> QuestResult<&'q QuestNode> {
        quest
            .node(&self.current_node)
            .ok_or_else(|| QuestError::unknown_node(&quest.id, self.current_node.clone()))
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Resolve the option at `index` of the current node.
    pub fn choose<R: RandomSource>(
        &mut self,
        quest: &Quest,
        index: usize,
        aux: AuxiliaryResult,
        ctx: &mut QuestContext<'_, R>,
    ) -> QuestResult<StepReport> {
        if quest.id != self.quest_id {
            return Err(QuestError::UnknownQuest(quest.id.clone()));
        }
        if self.is_finished() {
            return Err(QuestError::QuestFinished(self.quest_id.clone()));
        }
        let node = self.current_node(quest)?;
        let option = node.options.get(index).ok_or_else(|| QuestError::UnknownOption {
            node_id: node.id.clone(),
            index,
        })?;
        check_auxiliary(&option.action, &aux, ctx.rules).map_err(|reason| {
            QuestError::InvalidAuxiliary {
                node_id: node.id.clone(),
                index,
                reason,
            }
        })?;

        let mut report = StepReport::new(Some(node.id.clone()), node.id.clone());
        let target = match &option.action {
            OptionAction::Narrative { outcome } => enterable(quest, outcome, ctx.items)?,

            OptionAction::Check {
                skill,
                dc,
                success_outcome,
                failure_outcome,
                failure_consequence,
            } => {
                let on_success = enterable(quest, success_outcome, ctx.items)?;
                let on_failure = enterable(quest, failure_outcome, ctx.items)?;
                let request = CheckRequest::new(*skill, *dc);
                let outcome = match aux {
                    AuxiliaryResult::Roll(roll) => {
                        resolve_check_with_roll(ctx.player.traits(), &request, roll, ctx.rules)
                    }
                    _ => resolve_check(ctx.player.traits(), &request, &mut *ctx.rng, ctx.rules),
                };
                report.commentary = match outcome.criticality {
                    Criticality::Critical => Some("A masterful attempt.".to_string()),
                    Criticality::Fumble => Some("A disastrous attempt.".to_string()),
                    Criticality::Normal => None,
                };
                let target = if outcome.success {
                    on_success
                } else {
                    if let Some(consequence) = failure_consequence {
                        report.damage_taken = ctx.player.apply_damage(consequence.damage);
                        if !consequence.description.is_empty() {
                            report.commentary = Some(consequence.description.clone());
                        }
                    }
                    on_failure
                };
                report.check = Some(outcome);
                target
            }

            OptionAction::Battle {
                enemy,
                advantage,
                outcome,
                defeat_outcome,
            } => {
                let on_victory = enterable(quest, outcome, ctx.items)?;
                let on_defeat = match defeat_outcome {
                    Some(id) => Some(enterable(quest, id, ctx.items)?),
                    None => None,
                };
                let template = ctx.enemies.require(enemy)?;
                let result = match aux {
                    AuxiliaryResult::Battle(result) => result,
                    _ => {
                        let outcome =
                            fight(ctx.player, template, *advantage, &mut *ctx.rng, ctx.rules);
                        BattleResult::from(&outcome)
                    }
                };
                let target = match (result.winner, on_defeat) {
                    (Side::Enemy, Some(node)) => node,
                    _ => on_victory,
                };
                report.battle = Some(result);
                target
            }
        };

        tracing::debug!(
            quest = %quest.id,
            from = %node.id,
            to = %target.id,
            option = %option.text,
            "quest transition"
        );
        self.enter(quest, target, ctx, &mut report)?;
        Ok(report)
    }

    fn enter<R: RandomSource>(
        &mut self,
        quest: &Quest,
        node: &QuestNode,
        ctx: &mut QuestContext<'_, R>,
        report: &mut StepReport,
    ) -> QuestResult<()> {
        self.current_node = node.id.clone();
        report.to = node.id.clone();

        if let Some(reward) = &node.reward {
            if self.rewarded_nodes.insert(node.id.clone()) {
                grant_reward(ctx.player, reward, ctx.items)?;
                report.rewards.push(reward.clone());
            }
        }

        match &node.kind {
            NodeKind::QuestComplete => {
                if !quest.reward.is_empty() {
                    grant_reward(ctx.player, &quest.reward, ctx.items)?;
                    report.rewards.push(quest.reward.clone());
                }
                ctx.ledger.complete(&quest.id, ctx.tick);
                self.status = RunStatus::Completed;
            }
            NodeKind::QuestFail => {
                ctx.ledger.fail(&quest.id, ctx.tick);
                self.status = RunStatus::Failed;
            }
            NodeKind::LinkToQuest { quest_id } => {
                ctx.ledger.complete(&quest.id, ctx.tick);
                self.status = RunStatus::Linked(quest_id.clone());
            }
            NodeKind::Narrative | NodeKind::Check | NodeKind::Battle => {}
        }
        report.status = self.status.clone();
        Ok(())
    }
}

/// Reject a pre-computed result that does not belong to the option kind.
fn check_auxiliary(
    action: &OptionAction,
    aux: &AuxiliaryResult,
    rules: &RulesConfig,
) -> Result<(), String> {
    match (action, aux) {
        (_, AuxiliaryResult::None) => Ok(()),
        (OptionAction::Check { .. }, AuxiliaryResult::Roll(roll)) => {
            let expected = rules.dice_per_set as usize;
            if roll.faces.len() != expected {
                return Err(format!(
                    "a roll of {} dice, expected {}",
                    roll.faces.len(),
                    expected
                ));
            }
            let sum: i32 = roll.faces.iter().map(|f| f.value()).sum();
            if roll.magnitude != sum {
                return Err(format!(
                    "a roll of magnitude {} from faces summing to {}",
                    roll.magnitude, sum
                ));
            }
            Ok(())
        }
        (OptionAction::Battle { .. }, AuxiliaryResult::Battle(_)) => Ok(()),
        (_, AuxiliaryResult::Roll(_)) => Err("a dice roll".to_string()),
        (_, AuxiliaryResult::Battle(_)) => Err("a battle result".to_string()),
    }
}

/// Look up a node and make sure every reward entering it would pay out exists.
fn enterable<'q>(
    quest: &'q Quest,
    node_id: &str,
    items: &ItemCatalog,
) -> QuestResult<&'q QuestNode> {
    let node = quest
        .node(node_id)
        .ok_or_else(|| QuestError::unknown_node(&quest.id, node_id))?;
    let node_items = node.reward.iter().flat_map(|r| r.items.iter());
    let quest_items = match node.kind {
        NodeKind::QuestComplete => quest.reward.items.as_slice(),
        _ => &[][..],
    };
    for item_id in node_items.chain(quest_items) {
        items.require(item_id)?;
    }
    Ok(node)
}

/// Pay out a reward. Nothing is granted unless every item resolves.
pub fn grant_reward(
    player: &mut PlayerCharacter,
    reward: &Reward,
    items: &ItemCatalog,
) -> QuestResult<()> {
    let instances = reward
        .items
        .iter()
        .map(|id| items.require(id).map(|item| item.instantiate()))
        .collect::<Result<Vec<ItemInstance>, _>>()?;
    player.gain(reward.xp, reward.gold);
    for instance in instances {
        player.inventory.add(instance);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::QuestStatus;
    use crate::quest::{Consequence, DecisionOption};
    use rpg_rules::{
        Advantage, EnemyTemplate, Face, FixedRandom, Item, ItemKind, Terrain, Trait, TraitSet,
    };
    use std::collections::BTreeMap;

    struct Fixture {
        player: PlayerCharacter,
        ledger: QuestLedger,
        enemies: EnemyCatalog,
        items: ItemCatalog,
        rules: RulesConfig,
        rng: FixedRandom,
    }

    impl Fixture {
        fn new(rng: FixedRandom) -> Self {
            let mut ledger = QuestLedger::new();
            ledger.accept(&QuestId::from("q"), 0).unwrap();
            Self {
                player: PlayerCharacter::new(
                    "Hero",
                    TraitSet::new()
                        .with(Trait::Strength, 6)
                        .with(Trait::Agility, 3)
                        .with(Trait::Intelligence, 2)
                        .with(Trait::Endurance, 3)
                        .with(Trait::Perception, 2),
                ),
                ledger,
                enemies: EnemyCatalog::new(vec![EnemyTemplate::new(
                    "rat",
                    "Giant Rat",
                    TraitSet::new().with(Trait::Endurance, 1),
                )])
                .unwrap(),
                items: ItemCatalog::new(vec![Item::new("key", "Iron Key", ItemKind::Misc)])
                    .unwrap(),
                rules: RulesConfig::default(),
                rng,
            }
        }

        fn ctx(&mut self, tick: Tick) -> QuestContext<'_, FixedRandom> {
            QuestContext {
                player: &mut self.player,
                ledger: &mut self.ledger,
                enemies: &self.enemies,
                items: &self.items,
                rules: &self.rules,
                rng: &mut self.rng,
                tick,
            }
        }
    }

    fn quest(nodes: Vec<QuestNode>, reward: Reward) -> Quest {
        Quest {
            id: QuestId::from("q"),
            title: "Quest".to_string(),
            description: String::new(),
            img: None,
            rarity: 1,
            target_tile_type: Terrain::Ruins,
            duration: 10,
            max_distance: None,
            reward,
            entry_node_id: "start".to_string(),
            nodes: nodes
                .into_iter()
                .map(|n| (n.id.clone(), n))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn check_quest() -> Quest {
        quest(
            vec![
                QuestNode::new("start", "A hidden door?", NodeKind::Check).with_option(
                    DecisionOption::check("Search", Trait::Perception, 8, "found", "missed")
                        .with_failure_consequence(Consequence {
                            damage: 4,
                            description: "A dart trap fires.".to_string(),
                        }),
                ),
                QuestNode::new("found", "A passage.", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Enter", "vault")),
                QuestNode::new("missed", "Nothing.", NodeKind::QuestFail),
                QuestNode::new("vault", "Treasure!", NodeKind::QuestComplete)
                    .with_reward(Reward::new(25, 15).with_item("key")),
            ],
            Reward::new(5, 10),
        )
    }

    #[test]
    fn test_check_success_branch() {
        // Roll supplied by the shell: magnitude 4 plus perception 2 against dc 4
        let mut q = check_quest();
        if let OptionAction::Check { dc, .. } =
            &mut q.nodes.get_mut("start").unwrap().options[0].action
        {
            *dc = 4;
        }
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(1)).unwrap();

        let roll = DiceRoll::from_faces(vec![Face::Plus, Face::Plus, Face::Plus, Face::Plus]);
        let report = run
            .choose(&q, 0, AuxiliaryResult::Roll(roll), &mut fx.ctx(2))
            .unwrap();

        let check = report.check.unwrap();
        assert!(check.success);
        assert_eq!(check.total, 6);
        assert_eq!(check.margin, 2);
        assert_eq!(report.to, "found");
        assert_eq!(report.commentary.as_deref(), Some("A masterful attempt."));
        assert_eq!(report.damage_taken, 0);
    }

    #[test]
    fn test_check_failure_applies_consequence() {
        let q = check_quest();
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(1)).unwrap();

        let report = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(6)).unwrap();

        assert!(!report.check.as_ref().unwrap().success);
        assert_eq!(report.to, "missed");
        assert_eq!(report.damage_taken, 4);
        assert_eq!(fx.player.current_health(), 26);
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(
            fx.ledger.entry(&q.id).map(|e| (e.status, e.since)),
            Some((QuestStatus::Failed, 6))
        );
        assert_eq!(fx.player.gold, 0);
    }

    #[test]
    fn test_complete_grants_node_and_quest_rewards_once() {
        let mut q = check_quest();
        if let OptionAction::Check { dc, .. } =
            &mut q.nodes.get_mut("start").unwrap().options[0].action
        {
            *dc = 0;
        }
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(1)).unwrap();
        run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(2)).unwrap();
        let report = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(3)).unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(
            report.rewards,
            vec![Reward::new(25, 15).with_item("key"), Reward::new(5, 10)]
        );
        assert_eq!(fx.player.xp, 30);
        assert_eq!(fx.player.gold, 25);
        assert_eq!(fx.player.inventory.len(), 1);
        assert_eq!(fx.ledger.status(&q.id), Some(QuestStatus::Completed));

        // Nothing more can happen once terminal
        let again = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(4));
        assert_eq!(again, Err(QuestError::QuestFinished(q.id.clone())));
        assert_eq!(fx.player.gold, 25);
    }

    #[test]
    fn test_node_reward_not_repaid_on_revisit() {
        let q = quest(
            vec![
                QuestNode::new("start", "Camp", NodeKind::Narrative)
                    .with_reward(Reward::new(1, 2))
                    .with_option(DecisionOption::narrative("Wander", "woods"))
                    .with_option(DecisionOption::narrative("Finish", "end")),
                QuestNode::new("woods", "Trees", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Back", "start")),
                QuestNode::new("end", "Done", NodeKind::QuestComplete),
            ],
            Reward::default(),
        );
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, start) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        assert_eq!(start.rewards.len(), 1);

        run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(0)).unwrap();
        let back = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(0)).unwrap();
        assert!(back.rewards.is_empty());
        assert_eq!(fx.player.gold, 2);

        let done = run.choose(&q, 1, AuxiliaryResult::None, &mut fx.ctx(0)).unwrap();
        assert!(done.rewards.is_empty());
        assert_eq!(done.status, RunStatus::Completed);
    }

    #[test]
    fn test_battle_option_runs_combat() {
        let q = quest(
            vec![
                QuestNode::new("start", "Squeaking", NodeKind::Battle).with_option(
                    DecisionOption::battle("Fight", "rat", Advantage::Ambush, "won")
                        .with_defeat_outcome("lost"),
                ),
                QuestNode::new("won", "Victory", NodeKind::QuestComplete),
                QuestNode::new("lost", "Defeat", NodeKind::QuestFail),
            ],
            Reward::default(),
        );
        let mut fx = Fixture::new(FixedRandom::constant(6));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let report = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(1)).unwrap();

        assert_eq!(report.battle.as_ref().map(|b| b.winner), Some(Side::Player));
        assert_eq!(report.to, "won");
        assert_eq!(fx.player.training_points, 1);
    }

    #[test]
    fn test_battle_defeat_from_shell_result() {
        let q = quest(
            vec![
                QuestNode::new("start", "Squeaking", NodeKind::Battle).with_option(
                    DecisionOption::battle("Fight", "rat", Advantage::None, "won")
                        .with_defeat_outcome("lost"),
                ),
                QuestNode::new("won", "Victory", NodeKind::QuestComplete),
                QuestNode::new("lost", "Defeat", NodeKind::QuestFail),
            ],
            Reward::default(),
        );
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let aux = AuxiliaryResult::Battle(BattleResult {
            winner: Side::Enemy,
            log: vec!["The rat prevails".to_string()],
        });
        let report = run.choose(&q, 0, aux, &mut fx.ctx(1)).unwrap();

        assert_eq!(report.to, "lost");
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(fx.rng.draws(), 0);
        assert_eq!(fx.player.training_points, 0);
    }

    #[test]
    fn test_link_ends_run() {
        let q = quest(
            vec![
                QuestNode::new("start", "A map", NodeKind::Narrative)
                    .with_option(DecisionOption::narrative("Follow it", "next")),
                QuestNode::new(
                    "next",
                    "To be continued",
                    NodeKind::LinkToQuest {
                        quest_id: QuestId::from("sequel"),
                    },
                ),
            ],
            Reward::new(100, 100),
        );
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let report = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(2)).unwrap();

        assert_eq!(report.status, RunStatus::Linked(QuestId::from("sequel")));
        assert!(run.is_finished());
        assert_eq!(fx.player.gold, 0);
    }

    #[test]
    fn test_terminal_with_options_auto_resolves() {
        let q = quest(
            vec![QuestNode::new("start", "Already over", NodeKind::QuestComplete)
                .with_option(DecisionOption::narrative("Loop", "start"))],
            Reward::new(1, 1),
        );
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, report) = QuestRun::start(&q, &mut fx.ctx(5)).unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(fx.player.gold, 1);
        assert!(matches!(
            run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(6)),
            Err(QuestError::QuestFinished(_))
        ));
    }

    #[test]
    fn test_missing_node_aborts_without_side_effects() {
        // Built by hand, bypassing catalog validation
        let q = quest(
            vec![QuestNode::new("start", "Trap", NodeKind::Check).with_option(
                DecisionOption::check("Dodge", Trait::Agility, 50, "safe", "gone")
                    .with_failure_consequence(Consequence {
                        damage: 10,
                        description: String::new(),
                    }),
            )],
            Reward::default(),
        );
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let result = run.choose(&q, 0, AuxiliaryResult::None, &mut fx.ctx(1));

        assert!(matches!(result, Err(QuestError::UnknownNode { .. })));
        assert_eq!(fx.player.current_health(), 30);
        assert_eq!(run.current_node_id(), "start");
        assert_eq!(fx.rng.draws(), 0);
    }

    #[test]
    fn test_unknown_option_index() {
        let q = check_quest();
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        assert_eq!(
            run.choose(&q, 7, AuxiliaryResult::None, &mut fx.ctx(0)),
            Err(QuestError::UnknownOption {
                node_id: "start".to_string(),
                index: 7
            })
        );
    }

    #[test]
    fn test_grant_reward_is_all_or_nothing() {
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let bad = Reward::new(10, 10).with_item("key").with_item("crown");
        assert!(grant_reward(&mut fx.player, &bad, &fx.items).is_err());
        assert_eq!(fx.player.gold, 0);
        assert!(fx.player.inventory.is_empty());

        grant_reward(&mut fx.player, &Reward::new(3, 4).with_item("key"), &fx.items).unwrap();
        assert_eq!((fx.player.xp, fx.player.gold), (3, 4));
        assert_eq!(fx.player.inventory.len(), 1);
    }

    #[test]
    fn test_mismatched_auxiliary_rejected_without_side_effects() {
        let q = check_quest();
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let aux = AuxiliaryResult::Battle(BattleResult {
            winner: Side::Player,
            log: Vec::new(),
        });
        let result = run.choose(&q, 0, aux, &mut fx.ctx(1));

        assert_eq!(
            result,
            Err(QuestError::InvalidAuxiliary {
                node_id: "start".to_string(),
                index: 0,
                reason: "a battle result".to_string(),
            })
        );
        assert_eq!(run.current_node_id(), "start");
        assert_eq!(fx.player.current_health(), 30);
        assert_eq!(fx.rng.draws(), 0);
    }

    #[test]
    fn test_roll_with_wrong_dice_count_rejected() {
        let q = check_quest();
        let mut fx = Fixture::new(FixedRandom::constant(3));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();

        let roll = DiceRoll::from_faces(vec![Face::Plus; 9]);
        let result = run.choose(&q, 0, AuxiliaryResult::Roll(roll), &mut fx.ctx(1));
        assert!(matches!(result, Err(QuestError::InvalidAuxiliary { .. })));

        let mut forged = DiceRoll::from_faces(vec![Face::Blank; 4]);
        forged.magnitude = 20;
        let result = run.choose(&q, 0, AuxiliaryResult::Roll(forged), &mut fx.ctx(1));
        assert!(matches!(result, Err(QuestError::InvalidAuxiliary { .. })));

        assert_eq!(run.current_node_id(), "start");
        assert_eq!(fx.player.current_health(), 30);
    }

    #[test]
    fn test_roll_rejected_for_battle_option() {
        let q = quest(
            vec![
                QuestNode::new("start", "Squeaking", NodeKind::Battle)
                    .with_option(DecisionOption::battle("Fight", "rat", Advantage::None, "won")),
                QuestNode::new("won", "Victory", NodeKind::QuestComplete),
            ],
            Reward::default(),
        );
        let mut fx = Fixture::new(FixedRandom::constant(6));
        let (mut run, _) = QuestRun::start(&q, &mut fx.ctx(0)).unwrap();
        let roll = DiceRoll::from_faces(vec![Face::Plus; 4]);
        let result = run.choose(&q, 0, AuxiliaryResult::Roll(roll), &mut fx.ctx(1));

        assert!(matches!(result, Err(QuestError::InvalidAuxiliary { .. })));
        assert_eq!(fx.player.training_points, 0);
        assert!(!run.is_finished());
    }
}
