//! Battle - the persisted record of one match

use std::time::{SystemTime, UNIX_EPOCH};

use arena_protocol::{SLOTS_PER_SIDE, TargetId};
use arena_team::CharacterId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{ChakraPool, Ledger, SideState};

/// Lifecycle of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    Active,
    Finished,
}

/// Outcome of a finished battle, reported once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: String,
    pub loser: String,
}

/// One participant joining a new battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub id: String,
    pub team: [CharacterId; SLOTS_PER_SIDE],
    pub is_ai: bool,
}

impl Entrant {
    pub fn human(id: impl Into<String>, team: [CharacterId; SLOTS_PER_SIDE]) -> Self {
        Self {
            id: id.into(),
            team,
            is_ai: false,
        }
    }

    pub fn ai(id: impl Into<String>, team: [CharacterId; SLOTS_PER_SIDE]) -> Self {
        Self {
            id: id.into(),
            team,
            is_ai: true,
        }
    }
}

/// A two-sided battle.
///
/// `sides[0]` and `sides[1]` follow the battle's order; target ids address
/// them by that index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub id: String,

    /// Current turn number, starting at 1
    pub turn: u32,

    pub sides: [SideState; 2],

    /// Id of the side expected to act
    pub active_turn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,

    pub status: BattleStatus,

    /// Unix millis of the last swap
    pub last_move_time: u64,

    pub created_at: u64,
}

impl Battle {
    /// Start a battle with a random first mover.
    ///
    /// The first mover starts with one random chakra, the other with none.
    pub fn new<R: Rng + ?Sized>(
        id: impl Into<String>,
        first: Entrant,
        second: Entrant,
        starting_health: u32,
        rng: &mut R,
    ) -> Self {
        let mut sides = [first, second].map(|entrant| {
            let side = SideState::new(entrant.id, entrant.team, starting_health);
            if entrant.is_ai { side.with_ai() } else { side }
        });

        let starter = rng.gen_range(0..2);
        sides[starter].chakra = ChakraPool::generate_random(1, rng);
        let now = now_millis();

        Self {
            id: id.into(),
            turn: 1,
            active_turn: sides[starter].id.clone(),
            sides,
            winner: None,
            status: BattleStatus::Active,
            last_move_time: now,
            created_at: now,
        }
    }

    // === Lookup ===

    /// Ids in battle order
    pub fn order(&self) -> [&str; 2] {
        [self.sides[0].id.as_str(), self.sides[1].id.as_str()]
    }

    /// Get the side index for an id
    pub fn side_index(&self, id: &str) -> Option<usize> {
        self.sides.iter().position(|s| s.id == id)
    }

    pub fn side(&self, index: usize) -> Option<&SideState> {
        self.sides.get(index)
    }

    pub fn side_by_id(&self, id: &str) -> Option<&SideState> {
        self.sides.iter().find(|s| s.id == id)
    }

    pub fn side_by_id_mut(&mut self, id: &str) -> Option<&mut SideState> {
        self.sides.iter_mut().find(|s| s.id == id)
    }

    /// Index of the side expected to act
    pub fn active_index(&self) -> Option<usize> {
        self.side_index(&self.active_turn)
    }

    /// Hand the turn to a side without any turn-start processing
    pub fn set_active(&mut self, index: usize) {
        if let Some(side) = self.sides.get(index) {
            self.active_turn = side.id.clone();
        }
    }

    pub fn ledger(&self, target: TargetId) -> &Ledger {
        &self.sides[target.side].active_effects[target.slot]
    }

    pub fn ledger_mut(&mut self, target: TargetId) -> &mut Ledger {
        &mut self.sides[target.side].active_effects[target.slot]
    }

    pub fn is_alive(&self, target: TargetId) -> bool {
        self.sides[target.side].is_alive(target.slot)
    }

    // === Outcome ===

    /// Whether the battle is over, including a winner set by forfeit
    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished || self.winner.is_some()
    }

    /// Declare the side at `winner` victorious
    pub fn finish(&mut self, winner: usize) -> MatchResult {
        let winner = winner.min(1);
        let result = MatchResult {
            winner: self.sides[winner].id.clone(),
            loser: self.sides[1 - winner].id.clone(),
        };
        self.winner = Some(result.winner.clone());
        self.status = BattleStatus::Finished;
        result
    }

    /// Concede on behalf of `id`; None when the battle is already over or
    /// `id` is not a participant
    pub fn forfeit(&mut self, id: &str) -> Option<MatchResult> {
        if self.is_finished() {
            return None;
        }
        let loser = self.side_index(id)?;
        Some(self.finish(1 - loser))
    }

    /// Millis since the last swap
    pub fn idle_for(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_move_time)
    }
}

/// Current unix time in millis
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn new_battle(seed: u64) -> Battle {
        let mut rng = StdRng::seed_from_u64(seed);
        Battle::new(
            "b1",
            Entrant::human("alice", [1, 2, 3]),
            Entrant::ai("AI_1", [4, 5, 1]),
            100,
            &mut rng,
        )
    }

    #[test]
    fn test_new_battle() {
        let battle = new_battle(1);
        assert_eq!(battle.turn, 1);
        assert_eq!(battle.order(), ["alice", "AI_1"]);
        assert_eq!(battle.status, BattleStatus::Active);
        assert!(battle.winner.is_none());
        assert!(!battle.sides[0].is_ai);
        assert!(battle.sides[1].is_ai);

        let starter = battle.active_index().unwrap();
        assert_eq!(battle.sides[starter].chakra.total(), 1);
        assert_eq!(battle.sides[1 - starter].chakra.total(), 0);
        for side in &battle.sides {
            assert_eq!(side.health, [100; 3]);
            assert!(side.active_effects.iter().all(|l| l.is_empty()));
        }
    }

    #[test]
    fn test_both_sides_can_start() {
        let starters: Vec<usize> = (0..40)
            .map(|seed| new_battle(seed).active_index().unwrap())
            .collect();
        assert!(starters.contains(&0));
        assert!(starters.contains(&1));
    }

    #[test]
    fn test_forfeit() {
        let mut battle = new_battle(2);
        let result = battle.forfeit("alice").unwrap();
        assert_eq!(result.winner, "AI_1");
        assert_eq!(result.loser, "alice");
        assert!(battle.is_finished());

        assert!(battle.forfeit("AI_1").is_none());
    }

    #[test]
    fn test_forfeit_unknown_player() {
        let mut battle = new_battle(2);
        assert!(battle.forfeit("mallory").is_none());
        assert!(!battle.is_finished());
    }

    #[test]
    fn test_winner_set_externally_is_finished() {
        let mut battle = new_battle(3);
        battle.winner = Some("alice".to_string());
        assert!(battle.is_finished());
    }

    #[test]
    fn test_serde_round_trip() {
        let battle = new_battle(4);
        let json = serde_json::to_string(&battle).unwrap();
        assert!(json.contains("\"activeTurn\""));
        assert!(json.contains("\"lastMoveTime\""));
        let back: Battle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, battle);
    }
}
