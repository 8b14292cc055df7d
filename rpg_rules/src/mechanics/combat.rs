//! Two-party turn-based combat.
//!
//! The fight moves through `DeterminingInitiative -> PlayerTurn <-> EnemyTurn ->
//! Resolved`. Only the player ever rolls: on the player's turn the roll is
//! `dice + attack` against the enemy's defense, on the enemy's turn it is
//! `dice + defense` against the enemy's attack. Turns alternate whether or not
//! the attack lands.

use serde::{Deserialize, Serialize};

use super::dice::{roll_set, DiceRoll};
use super::stats::derive_stats;
use crate::config::RulesConfig;
use crate::entities::{Combatant, EnemyTemplate, PlayerCharacter};
use crate::random::RandomSource;

/// Who acts first, bypassing the initiative roll when not `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    #[default]
    None,
    /// Player acts first.
    Ambush,
    /// Enemy acts first.
    Ambushed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    DeterminingInitiative,
    PlayerTurn,
    EnemyTurn,
    Resolved { winner: Side },
}

/// Battle request from the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    pub enemy_template_id: String,
    #[serde(default)]
    pub advantage: Advantage,
}

/// What happened in a single offensive turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub attacker: Side,
    pub roll: DiceRoll,
    /// Player's rolled total (attack or defense).
    pub total: i32,
    /// Static enemy stat the total was compared against.
    pub threshold: i32,
    pub hit: bool,
    pub margin: i32,
    pub raw_damage: i32,
    pub applied_damage: i32,
}

/// Final result of a fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Side,
    pub turns: u32,
    pub log: Vec<String>,
    pub player: Combatant,
    pub enemy: Combatant,
}

/// Battle response handed back to the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Side,
    pub log: Vec<String>,
}

impl From<&BattleOutcome> for BattleResult {
    fn from(outcome: &BattleOutcome) -> Self {
        Self {
            winner: outcome.winner,
            log: outcome.log.clone(),
        }
    }
}

/// A fight in progress.
#[derive(Debug, Clone)]
pub struct Combat {
    player: Combatant,
    enemy: Combatant,
    advantage: Advantage,
    phase: CombatPhase,
    turn: u32,
    log: Vec<String>,
}

impl Combat {
    /// A fight that has not rolled initiative yet.
    pub fn new(player: Combatant, enemy: Combatant, advantage: Advantage) -> Self {
        Self {
            player,
            enemy,
            advantage,
            phase: CombatPhase::DeterminingInitiative,
            turn: 0,
            log: Vec::new(),
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    /// Human-readable narration so far.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Offensive turns resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The winner once resolved.
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            CombatPhase::Resolved { winner } => Some(winner),
            _ => None,
        }
    }

    /// Decide who acts first. Ties favor the player.
    fn determine_initiative(&mut self, rng: &mut impl RandomSource, config: &RulesConfig) -> Side {
        let first = match self.advantage {
            Advantage::Ambush => {
                self.log.push(format!("{} ambushes {}", self.player.name, self.enemy.name));
                Side::Player
            }
            Advantage::Ambushed => {
                self.log.push(format!("{} is ambushed by {}", self.player.name, self.enemy.name));
                Side::Enemy
            }
            Advantage::None => {
                let roll = roll_set(rng, config.dice_per_set);
                let player_initiative = derive_stats(&self.player).initiative;
                let enemy_initiative = derive_stats(&self.enemy).initiative;
                let total = roll.magnitude + player_initiative;
                let first = if total >= enemy_initiative {
                    Side::Player
                } else {
                    Side::Enemy
                };
                self.log.push(format!(
                    "Initiative: roll {} + {} = {} vs {} -> {:?} acts first",
                    roll.magnitude, player_initiative, total, enemy_initiative, first
                ));
                tracing::debug!(
                    magnitude = roll.magnitude,
                    player_initiative,
                    enemy_initiative,
                    ?first,
                    "initiative"
                );
                first
            }
        };
        self.phase = match first {
            Side::Player => CombatPhase::PlayerTurn,
            Side::Enemy => CombatPhase::EnemyTurn,
        };
        first
    }

    /// Advance the fight by one offensive turn.
    ///
    /// Resolves initiative first if needed. Returns `None` once resolved.
    /// A side that enters at 0 health has already lost.
    pub fn step(
        &mut self,
        rng: &mut impl RandomSource,
        config: &RulesConfig,
    ) -> Option<TurnReport> {
        if self.phase == CombatPhase::DeterminingInitiative {
            if let Some(winner) = self.decided_by_health() {
                self.resolve(winner);
                return None;
            }
            self.determine_initiative(rng, config);
        }
        let attacker = match self.phase {
            CombatPhase::PlayerTurn => Side::Player,
            CombatPhase::EnemyTurn => Side::Enemy,
            CombatPhase::DeterminingInitiative | CombatPhase::Resolved { .. } => return None,
        };

        if self.turn >= config.max_combat_turns {
            tracing::warn!(turns = self.turn, "combat turn cap reached; enemy prevails");
            self.log
                .push(format!("{} is exhausted after {} turns", self.player.name, self.turn));
            self.phase = CombatPhase::Resolved { winner: Side::Enemy };
            return None;
        }

        self.turn += 1;
        let report = self.resolve_turn(attacker, rng, config);
        match self.decided_by_health() {
            Some(winner) => self.resolve(winner),
            None => self.phase = match attacker {
                Side::Player => CombatPhase::EnemyTurn,
                Side::Enemy => CombatPhase::PlayerTurn,
            },
        }
        Some(report)
    }

    /// The survivor, once either side is down. A dead player loses even if
    /// the enemy is down too.
    fn decided_by_health(&self) -> Option<Side> {
        if !self.player.is_alive() {
            Some(Side::Enemy)
        } else if !self.enemy.is_alive() {
            Some(Side::Player)
        } else {
            None
        }
    }

    fn resolve(&mut self, winner: Side) {
        self.phase = CombatPhase::Resolved { winner };
        let name = match winner {
            Side::Player => &self.player.name,
            Side::Enemy => &self.enemy.name,
        };
        self.log.push(format!("{} wins", name));
    }

    fn resolve_turn(
        &mut self,
        attacker: Side,
        rng: &mut impl RandomSource,
        config: &RulesConfig,
    ) -> TurnReport {
        let player_stats = derive_stats(&self.player);
        let enemy_stats = derive_stats(&self.enemy);
        let roll = roll_set(rng, config.dice_per_set);

        let (total, threshold, hit, margin, attacker_damage, defender_reduction) = match attacker {
            Side::Player => {
                let total = roll.magnitude + player_stats.attack;
                let threshold = enemy_stats.defense;
                (
                    total,
                    threshold,
                    total >= threshold,
                    total - threshold,
                    player_stats.damage,
                    enemy_stats.damage_reduction,
                )
            }
            Side::Enemy => {
                let total = roll.magnitude + player_stats.defense;
                let threshold = enemy_stats.attack;
                (
                    total,
                    threshold,
                    total < threshold,
                    threshold - total,
                    enemy_stats.damage,
                    player_stats.damage_reduction,
                )
            }
        };

        let (raw_damage, applied_damage) = if hit {
            let raw = attacker_damage + margin;
            let applied = (raw - defender_reduction).max(0);
            match attacker {
                Side::Player => self.enemy.apply_damage(applied),
                Side::Enemy => self.player.apply_damage(applied),
            };
            (raw, applied)
        } else {
            (0, 0)
        };

        let (actor, target) = match attacker {
            Side::Player => (&self.player.name, &self.enemy.name),
            Side::Enemy => (&self.enemy.name, &self.player.name),
        };
        let entry = if hit {
            format!(
                "Turn {}: {} strikes {} (roll {}, total {} vs {}, margin {}) \
                 for {} damage [{} hp / {} hp]",
                self.turn,
                actor,
                target,
                roll.magnitude,
                total,
                threshold,
                margin,
                applied_damage,
                self.player.current_health(),
                self.enemy.current_health()
            )
        } else {
            format!(
                "Turn {}: {} misses {} (roll {}, total {} vs {})",
                self.turn, actor, target, roll.magnitude, total, threshold
            )
        };
        tracing::debug!(
            turn = self.turn,
            ?attacker,
            magnitude = roll.magnitude,
            total,
            threshold,
            hit,
            applied_damage,
            player_hp = self.player.current_health(),
            enemy_hp = self.enemy.current_health(),
            "combat turn"
        );
        self.log.push(entry);

        TurnReport {
            turn: self.turn,
            attacker,
            roll,
            total,
            threshold,
            hit,
            margin: if hit { margin } else { 0 },
            raw_damage,
            applied_damage,
        }
    }

    /// Run to completion.
    pub fn run(mut self, rng: &mut impl RandomSource, config: &RulesConfig) -> BattleOutcome {
        while self.step(rng, config).is_some() {}
        let winner = self.winner().unwrap_or(Side::Enemy);
        BattleOutcome {
            winner,
            turns: self.turn,
            log: self.log,
            player: self.player,
            enemy: self.enemy,
        }
    }
}

/// Fight `template` with the player and write the results back.
///
/// The player's health after the fight is persisted; a victory grants the
/// configured training points exactly once.
pub fn fight(
    player: &mut PlayerCharacter,
    template: &EnemyTemplate,
    advantage: Advantage,
    rng: &mut impl RandomSource,
    config: &RulesConfig,
) -> BattleOutcome {
    let combat = Combat::new(player.to_combatant(), template.spawn(), advantage);
    let outcome = combat.run(rng, config);

    player.set_health(outcome.player.current_health());
    if outcome.winner == Side::Player {
        player.grant_training_points(config.victory_training_points);
    }
    tracing::info!(
        enemy = %template.id,
        winner = ?outcome.winner,
        turns = outcome.turns,
        player_hp = player.current_health(),
        "battle resolved"
    );
    outcome
}
