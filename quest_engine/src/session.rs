//! A single player's game session.
//!
//! [`GameSession`] owns everything that changes during play: the player, the
//! quest ledger, per-location discovery records, the active quest run, the
//! merchant shelf, the clock and any staged travel. Every operation takes
//! `&mut self`, so each one is an atomic read-modify-write over that state.

use rpg_rules::{
    fight, resolve_check, roll_set, BattleRequest, BattleResult, CheckOutcome, CheckRequest,
    Coord, DiceRoll, EnemyCatalog, EquipSlot, GameClock, InstanceId, ItemCatalog, ItemInstance,
    PlayerCharacter, RandomSource, SeededRandom, Tick, TileMap, Trait,
};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::discovery::{DiscoveredQuestRecord, DiscoveryEngine, LocationRecord};
use crate::error::{QuestError, QuestResult};
use crate::ledger::QuestLedger;
use crate::merchant::MerchantStock;
use crate::quest::{
    AuxiliaryResult, Quest, QuestCatalog, QuestContext, QuestId, QuestRun, RunStatus, StepReport,
    ValidationScope,
};
use crate::travel::TravelSequence;

/// Immutable content a session plays against.
#[derive(Debug, Clone)]
pub struct GameContent {
    pub quests: QuestCatalog,
    pub enemies: EnemyCatalog,
    pub items: ItemCatalog,
    pub map: TileMap,
}

impl GameContent {
    /// Validate quests against the enemy and item catalogs.
    pub fn new(
        quests: Vec<Quest>,
        enemies: EnemyCatalog,
        items: ItemCatalog,
        map: TileMap,
    ) -> QuestResult<Self> {
        let scope = ValidationScope {
            enemies: Some(&enemies),
            items: Some(&items),
        };
        let quests = QuestCatalog::from_quests(quests, scope)?;
        Ok(Self {
            quests,
            enemies,
            items,
            map,
        })
    }

    /// Load every catalog from JSON documents.
    pub fn from_json(quests: &str, enemies: &str, items: &str, map: &str) -> QuestResult<Self> {
        let enemies = EnemyCatalog::from_json_str(enemies)?;
        let items = ItemCatalog::from_json_str(items)?;
        let map = TileMap::from_json_str(map)?;
        let scope = ValidationScope {
            enemies: Some(&enemies),
            items: Some(&items),
        };
        let quests = QuestCatalog::from_json_str(quests, scope)?;
        Ok(Self {
            quests,
            enemies,
            items,
            map,
        })
    }
}

pub struct GameSession<R: RandomSource = SeededRandom> {
    config: EngineConfig,
    content: GameContent,
    player: PlayerCharacter,
    ledger: QuestLedger,
    locations: BTreeMap<Coord, LocationRecord>,
    active: Option<QuestRun>,
    pending_link: Option<QuestId>,
    merchant: MerchantStock,
    clock: GameClock,
    travel: TravelSequence,
    position: Coord,
    rng: R,
}

impl<R: RandomSource> GameSession<R> {
    /// Start a session with `player` standing on `start`.
    pub fn new(
        config: EngineConfig,
        content: GameContent,
        player: PlayerCharacter,
        start: Coord,
        rng: R,
    ) -> QuestResult<Self> {
        config.validate()?;
        content.map.require(start)?;
        tracing::info!(
            player = %player.name,
            %start,
            quests = content.quests.len(),
            "session started"
        );
        Ok(Self {
            config,
            content,
            player,
            ledger: QuestLedger::new(),
            locations: BTreeMap::new(),
            active: None,
            pending_link: None,
            merchant: MerchantStock::new(),
            clock: GameClock::new(),
            travel: TravelSequence::new(),
            position: start,
            rng,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &GameContent {
        &self.content
    }

    pub fn player(&self) -> &PlayerCharacter {
        &self.player
    }

    pub fn ledger(&self) -> &QuestLedger {
        &self.ledger
    }

    /// Discovery state of the location at `coord`.
    pub fn location(&self, coord: Coord) -> Option<&LocationRecord> {
        self.locations.get(&coord)
    }

    /// Current tick.
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Quest run in progress, if any.
    pub fn active_run(&self) -> Option<&QuestRun> {
        self.active.as_ref()
    }

    /// Quest a finished run linked into, awaiting a decision.
    pub fn pending_link(&self) -> Option<&QuestId> {
        self.pending_link.as_ref()
    }

    pub fn merchant(&self) -> &MerchantStock {
        &self.merchant
    }

    pub fn travel(&self) -> &TravelSequence {
        &self.travel
    }

    fn parse_location(&self, location_id: &str) -> QuestResult<Coord> {
        let coord: Coord = location_id.parse()?;
        self.content.map.require(coord)?;
        Ok(coord)
    }

    /// Search at `location_id` ("row-col") with a raw search roll.
    ///
    /// Always costs the configured search ticks, even when nothing is found.
    pub fn search(
        &mut self,
        location_id: &str,
        raw_roll: i32,
    ) -> QuestResult<Vec<DiscoveredQuestRecord>> {
        let origin = self.parse_location(location_id)?;
        let tick = self.clock.now();
        let taken = self.ledger.taken_ids();
        let engine = DiscoveryEngine::new(
            &self.content.quests,
            &self.content.map,
            &self.config.discovery,
        );
        let location = self.locations.entry(origin).or_default();
        let found = engine.discover(origin, raw_roll, tick, &taken, location, &mut self.rng);
        self.pass_time(self.config.discovery.search_tick_cost);
        Ok(found)
    }

    /// Quests waiting at a location that have not expired.
    pub fn available_quests(&self, coord: Coord) -> Vec<&DiscoveredQuestRecord> {
        let now = self.clock.now();
        self.locations
            .get(&coord)
            .map(|l| l.records().filter(|r| !r.is_expired(now)).collect())
            .unwrap_or_default()
    }

    /// Accept a quest discovered at `location_id` and enter its first node.
    pub fn accept_quest(
        &mut self,
        location_id: &str,
        quest_id: &QuestId,
    ) -> QuestResult<StepReport> {
        self.ensure_idle()?;
        let coord = self.parse_location(location_id)?;
        let now = self.clock.now();
        let discovered = self
            .locations
            .get(&coord)
            .and_then(|l| l.get(quest_id))
            .is_some_and(|r| !r.is_expired(now));
        if !discovered {
            return Err(QuestError::NotDiscovered {
                location: coord,
                quest_id: quest_id.clone(),
            });
        }
        let report = self.start_quest(quest_id)?;
        for location in self.locations.values_mut() {
            location.remove(quest_id);
        }
        Ok(report)
    }

    /// Accept and start the quest the last run linked to.
    pub fn follow_link(&mut self) -> QuestResult<StepReport> {
        self.ensure_idle()?;
        let target = self.pending_link.clone().ok_or(QuestError::NoPendingLink)?;
        let report = self.start_quest(&target)?;
        self.pending_link = None;
        for location in self.locations.values_mut() {
            location.remove(&target);
        }
        Ok(report)
    }

    /// Drop a pending link. Returns the quest that was offered.
    pub fn decline_link(&mut self) -> Option<QuestId> {
        self.pending_link.take()
    }

    fn ensure_idle(&self) -> QuestResult<()> {
        match &self.active {
            Some(run) => Err(QuestError::QuestInProgress(run.quest_id().clone())),
            None => Ok(()),
        }
    }

    fn start_quest(&mut self, quest_id: &QuestId) -> QuestResult<StepReport> {
        let quest = self.content.quests.require(quest_id)?;
        if self.ledger.is_taken(quest_id) {
            return Err(QuestError::QuestAlreadyTaken(quest_id.clone()));
        }
        let tick = self.clock.now();
        self.ledger.accept(quest_id, tick)?;
        let mut ctx = QuestContext {
            player: &mut self.player,
            ledger: &mut self.ledger,
            enemies: &self.content.enemies,
            items: &self.content.items,
            rules: &self.config.rules,
            rng: &mut self.rng,
            tick,
        };
        let (run, report) = QuestRun::start(quest, &mut ctx)?;
        self.settle(run);
        Ok(report)
    }

    /// Resolve an option of the active quest's current node.
    pub fn choose_option(&mut self, index: usize, aux: AuxiliaryResult) -> QuestResult<StepReport> {
        let mut run = self.active.take().ok_or(QuestError::NoActiveQuest)?;
        let result = match self.content.quests.require(run.quest_id()) {
            Ok(quest) => {
                let mut ctx = QuestContext {
                    player: &mut self.player,
                    ledger: &mut self.ledger,
                    enemies: &self.content.enemies,
                    items: &self.content.items,
                    rules: &self.config.rules,
                    rng: &mut self.rng,
                    tick: self.clock.now(),
                };
                run.choose(quest, index, aux, &mut ctx)
            }
            Err(e) => Err(e),
        };
        self.settle(run);
        result
    }

    /// Give up the active quest, marking it failed.
    pub fn abandon_quest(&mut self) -> QuestResult<QuestId> {
        let run = self.active.take().ok_or(QuestError::NoActiveQuest)?;
        let id = run.quest_id().clone();
        self.ledger.fail(&id, self.clock.now());
        tracing::info!(quest = %id, "quest abandoned");
        Ok(id)
    }

    fn settle(&mut self, run: QuestRun) {
        match run.status() {
            RunStatus::InProgress => self.active = Some(run),
            RunStatus::Linked(target) => {
                tracing::info!(quest = %run.quest_id(), link = %target, "quest linked");
                self.pending_link = Some(target.clone());
            }
            RunStatus::Completed | RunStatus::Failed => {
                tracing::info!(quest = %run.quest_id(), status = ?run.status(), "quest finished");
            }
        }
    }

    /// Fight an enemy outside any quest.
    pub fn battle(&mut self, request: &BattleRequest) -> QuestResult<BattleResult> {
        let template = self.content.enemies.require(&request.enemy_template_id)?;
        let outcome = fight(
            &mut self.player,
            template,
            request.advantage,
            &mut self.rng,
            &self.config.rules,
        );
        Ok(BattleResult::from(&outcome))
    }

    /// Resolve a free-standing skill check with the session's dice.
    pub fn check(&mut self, request: &CheckRequest) -> CheckOutcome {
        resolve_check(self.player.traits(), request, &mut self.rng, &self.config.rules)
    }

    /// Roll one set of dice, e.g. for the shell to animate before a check.
    pub fn roll_dice(&mut self) -> DiceRoll {
        roll_set(&mut self.rng, self.config.rules.dice_per_set)
    }

    /// Restore the player to full health. Costs the configured rest ticks.
    pub fn rest(&mut self) -> Tick {
        self.player.rest();
        self.pass_time(self.config.session.rest_ticks)
    }

    /// Spend a training point on `key`.
    pub fn allocate_point(&mut self, key: Trait) -> QuestResult<u32> {
        Ok(self.player.allocate_point(key)?)
    }

    /// Equip an inventory item.
    pub fn equip(&mut self, id: InstanceId) -> QuestResult<()> {
        Ok(self.player.equip(id)?)
    }

    /// Move the item in `slot` back to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) -> QuestResult<InstanceId> {
        Ok(self.player.unequip(slot)?)
    }

    /// Regenerate the merchant shelf if its interval has elapsed.
    pub fn refresh_merchant(&mut self) -> bool {
        self.merchant.refresh(
            self.clock.now(),
            &self.content.items,
            &self.config.merchant,
            &mut self.rng,
        )
    }

    /// Buy a shelf item with the player's gold.
    pub fn buy(&mut self, id: InstanceId) -> QuestResult<ItemInstance> {
        self.merchant.buy(id, &mut self.player)
    }

    /// Sell an inventory item to the merchant.
    pub fn sell(&mut self, id: InstanceId) -> QuestResult<u32> {
        self.merchant
            .sell(id, &mut self.player, self.clock.now(), &self.config.merchant)
    }

    /// Let `ticks` pass. Returns the new time.
    pub fn advance_ticks(&mut self, ticks: Tick) -> Tick {
        self.pass_time(ticks)
    }

    fn pass_time(&mut self, ticks: Tick) -> Tick {
        let now = self.clock.advance(ticks);
        for (coord, location) in self.locations.iter_mut() {
            for id in location.prune_expired(now) {
                tracing::debug!(quest = %id, location = %coord, "discovered quest expired");
            }
        }
        self.merchant.prune_expired(now);
        now
    }

    /// Start a staged move along `path` from the current position.
    pub fn begin_travel(&mut self, path: Vec<Coord>) -> QuestResult<()> {
        for step in &path {
            self.content.map.require(*step)?;
        }
        self.travel.begin(self.position, path)
    }

    /// Complete one travel step, moving the player and spending travel ticks.
    pub fn step_travel(&mut self) -> Option<Coord> {
        let next = self.travel.advance()?;
        self.position = next;
        self.pass_time(self.config.session.travel_ticks_per_tile);
        Some(next)
    }

    /// Stop travelling. Returns the tile the player stopped on.
    pub fn cancel_travel(&mut self) -> Coord {
        self.travel.cancel();
        self.position
    }
}
