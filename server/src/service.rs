//! The battle service: creation, submissions, turn processing, forfeits
//! and timeouts, each under the battle's lock

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use arena_battle::{Battle, Entrant, TurnReport, computer_opponent, now_millis};
use arena_protocol::{SkillUse, parse_form_actions, parse_json_actions};
use arena_team::{CharacterCatalog, CharacterId, Roster, TEAM_SIZE};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::ArenaConfig;
use crate::error::{ArenaError, NoOp};
use crate::locks::BattleLocks;
use crate::reporter::{LogReporter, MatchReporter};
use crate::store::{BattleStore, JsonFileStore, MemoryStore};

/// Result of a request against an existing battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The battle was updated and saved
    Resolved(TurnReport),
    /// Nothing changed
    Skipped(NoOp),
}

impl TurnOutcome {
    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            TurnOutcome::Resolved(report) => Some(report),
            TurnOutcome::Skipped(_) => None,
        }
    }

    pub fn skipped(&self) -> Option<NoOp> {
        match self {
            TurnOutcome::Resolved(_) => None,
            TurnOutcome::Skipped(reason) => Some(*reason),
        }
    }
}

/// Battle service shared by every request handler
pub struct Arena {
    config: ArenaConfig,
    roster: Roster,
    store: Arc<dyn BattleStore>,
    reporter: Arc<dyn MatchReporter>,
    locks: BattleLocks,
    rng: Mutex<StdRng>,
    next_id: AtomicU64,
}

impl Arena {
    pub fn new(
        config: ArenaConfig,
        roster: Roster,
        store: Arc<dyn BattleStore>,
        reporter: Arc<dyn MatchReporter>,
    ) -> Self {
        Self::with_rng(config, roster, store, reporter, StdRng::from_entropy())
    }

    /// Create a service with a fixed random source
    pub fn with_rng(
        config: ArenaConfig,
        roster: Roster,
        store: Arc<dyn BattleStore>,
        reporter: Arc<dyn MatchReporter>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            roster,
            store,
            reporter,
            locks: BattleLocks::new(),
            rng: Mutex::new(rng),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build a service from configuration alone: the roster file is required,
    /// battles go to a JSON file when `battles_path` is set and results are
    /// logged
    pub fn from_config(config: ArenaConfig) -> Result<Self> {
        let roster_path = config
            .roster_path
            .as_ref()
            .context("No roster path configured")?;
        let roster = Roster::load(roster_path)
            .with_context(|| format!("Failed to load roster {}", roster_path.display()))?;
        let store: Arc<dyn BattleStore> = match &config.battles_path {
            Some(path) => Arc::new(JsonFileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        info!(characters = roster.len(), persistent = config.battles_path.is_some(), "arena ready");
        Ok(Self::new(config, roster, store, Arc::new(LogReporter)))
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Get a stored battle
    pub fn battle(&self, battle_id: &str) -> Result<Option<Battle>> {
        self.store.load(battle_id)
    }

    // === Creation ===

    /// Start a battle between two entrants and save it.
    ///
    /// A computer first mover plays its opening turn immediately.
    pub async fn create_battle(&self, first: Entrant, second: Entrant) -> Result<Battle> {
        if first.id == second.id {
            return Err(ArenaError::SamePlayer(first.id).into());
        }
        self.check_team(&first.team)?;
        self.check_team(&second.team)?;

        let id = format!("battle_{}_{}", now_millis(), self.next_id.fetch_add(1, Ordering::Relaxed));
        let created = {
            let _guard = self.locks.acquire(&id).await;
            self.open_battle(&id, first, second)
        };
        if created.as_ref().map_or(true, Battle::is_finished) {
            self.locks.release(&id);
        }
        created
    }

    fn open_battle(&self, id: &str, first: Entrant, second: Entrant) -> Result<Battle> {
        let (battle, opening) = {
            let mut rng = self.rng();
            let mut battle = Battle::new(id, first, second, self.config.starting_health, &mut *rng);
            let opening = battle.process_turn(&self.roster, &self.config.ai, &mut *rng);
            (battle, opening)
        };

        self.store.save(&battle)?;
        // two computers may play the whole battle out right away
        if let Some(result) = &opening.result {
            self.reporter.report_result(&battle.id, result);
        }
        info!(
            battle = %battle.id,
            first = %battle.sides[0].id,
            second = %battle.sides[1].id,
            active = %battle.active_turn,
            "battle created"
        );
        Ok(battle)
    }

    /// Start a battle against a computer opponent with a random team
    pub async fn create_ai_battle(&self, player: &str, team: [CharacterId; TEAM_SIZE]) -> Result<Battle> {
        if !self.config.ai_enabled {
            return Err(ArenaError::AiDisabled.into());
        }
        let opponent = {
            let mut rng = self.rng();
            computer_opponent(&self.roster, &mut *rng).ok_or(ArenaError::RosterTooSmall)?
        };
        self.create_battle(Entrant::human(player, team), opponent).await
    }

    fn check_team(&self, team: &[CharacterId; TEAM_SIZE]) -> Result<(), ArenaError> {
        match team.iter().find(|&&id| self.roster.find_by_id(id).is_none()) {
            Some(&id) => Err(ArenaError::UnknownCharacter(id)),
            None => Ok(()),
        }
    }

    // === Turns ===

    /// Queue a player's actions and resolve the turn
    pub async fn submit_actions(&self, battle_id: &str, player: &str, actions: Vec<SkillUse>) -> Result<TurnOutcome> {
        self.with_battle(battle_id, |battle, roster, config, rng| {
            let side = battle.side_index(player).ok_or(NoOp::NotParticipant)?;
            if battle.active_turn != player {
                return Err(NoOp::NotYourTurn);
            }
            battle.sides[side].submit(actions);
            Ok(battle.process_turn(roster, &config.ai, rng))
        })
        .await
    }

    /// Submit form pairs such as `target[0][1][]=10`; bad pairs are dropped
    pub async fn submit_form<I, K, V>(&self, battle_id: &str, player: &str, pairs: I) -> Result<TurnOutcome>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let actions = parse_form_actions(pairs);
        self.submit_actions(battle_id, player, actions).await
    }

    /// Submit a JSON action body; an unreadable body submits no moves
    pub async fn submit_json(&self, battle_id: &str, player: &str, body: &str) -> Result<TurnOutcome> {
        let actions = parse_json_actions(body).unwrap_or_else(|e| {
            warn!(battle = %battle_id, player = %player, error = %e, "unreadable action body");
            Vec::new()
        });
        self.submit_actions(battle_id, player, actions).await
    }

    /// Resolve whatever is pending on a battle
    pub async fn process_turn(&self, battle_id: &str) -> Result<TurnOutcome> {
        self.with_battle(battle_id, |battle, roster, config, rng| {
            Ok(battle.process_turn(roster, &config.ai, rng))
        })
        .await
    }

    /// Concede a battle
    pub async fn forfeit(&self, battle_id: &str, player: &str) -> Result<TurnOutcome> {
        self.with_battle(battle_id, |battle, _, _, _| {
            let result = battle.forfeit(player).ok_or(NoOp::NotParticipant)?;
            Ok(TurnReport {
                result: Some(result),
                ..TurnReport::default()
            })
        })
        .await
    }

    /// Let the waiting side win when the active side has idled too long
    pub async fn claim_timeout(&self, battle_id: &str, player: &str) -> Result<TurnOutcome> {
        self.with_battle(battle_id, |battle, _, config, _| {
            let side = battle.side_index(player).ok_or(NoOp::NotParticipant)?;
            if battle.active_turn == player {
                return Err(NoOp::OwnTurn);
            }
            let timeout = config.turn_timeout().as_millis() as u64;
            if battle.idle_for(now_millis()) <= timeout {
                return Err(NoOp::NotTimedOut);
            }
            Ok(TurnReport {
                result: Some(battle.finish(side)),
                ..TurnReport::default()
            })
        })
        .await
    }

    /// Load, mutate and save one battle under its lock, reporting a result
    /// the first time the battle finishes.
    ///
    /// The lock entry is dropped once the battle is finished or missing.
    async fn with_battle<F>(&self, battle_id: &str, f: F) -> Result<TurnOutcome>
    where
        F: FnOnce(&mut Battle, &Roster, &ArenaConfig, &mut StdRng) -> Result<TurnReport, NoOp>,
    {
        let outcome = {
            let _guard = self.locks.acquire(battle_id).await;
            self.run_locked(battle_id, f)
        };

        let settled = match &outcome {
            Ok(TurnOutcome::Skipped(NoOp::BattleNotFound | NoOp::Finished)) => true,
            Ok(TurnOutcome::Resolved(report)) => report.result.is_some(),
            _ => false,
        };
        if settled {
            self.locks.release(battle_id);
        }
        outcome
    }

    fn run_locked<F>(&self, battle_id: &str, f: F) -> Result<TurnOutcome>
    where
        F: FnOnce(&mut Battle, &Roster, &ArenaConfig, &mut StdRng) -> Result<TurnReport, NoOp>,
    {
        let Some(mut battle) = self.store.load(battle_id)? else {
            debug!(battle = %battle_id, "battle not found");
            return Ok(TurnOutcome::Skipped(NoOp::BattleNotFound));
        };
        if battle.is_finished() {
            return Ok(TurnOutcome::Skipped(NoOp::Finished));
        }

        let outcome = {
            let mut rng = self.rng();
            f(&mut battle, &self.roster, &self.config, &mut *rng)
        };
        let report = match outcome {
            Ok(report) => report,
            Err(reason) => {
                debug!(battle = %battle_id, %reason, "request skipped");
                return Ok(TurnOutcome::Skipped(reason));
            }
        };

        self.store.save(&battle)?;
        if let Some(result) = &report.result {
            self.reporter.report_result(battle_id, result);
        }
        Ok(TurnOutcome::Resolved(report))
    }

    /// Number of battles with a live lock entry
    pub fn locked_battles(&self) -> usize {
        self.locks.len()
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
