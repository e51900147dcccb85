//! Computer opponents

mod planner;

use arena_team::Roster;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Entrant, now_millis};

pub use planner::plan_turn;

/// Tuning for the computer opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Weight of a move on the vendetta slot relative to any other move
    pub vendetta_ratio: u32,

    /// A slot may idle only when the turn-level roll is below this
    pub aggression_threshold: u32,

    /// Turns resolved per `process_turn` call when computers keep playing
    pub max_consecutive_turns: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            vendetta_ratio: 5,
            aggression_threshold: 2,
            max_consecutive_turns: 200,
        }
    }
}

/// Id for a new computer opponent
pub fn computer_id() -> String {
    format!("AI_{}", now_millis())
}

/// A computer entrant fielding three distinct unlocked characters.
///
/// Returns None when the roster has fewer than three unlocked characters.
pub fn computer_opponent<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Option<Entrant> {
    let team = roster.random_team(rng)?;
    Some(Entrant::ai(computer_id(), team))
}
