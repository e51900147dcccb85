//! Battle state and turn resolution for Chakra Arena.
//!
//! Two sides of three characters take turns spending chakra on skills. This
//! crate owns everything that happens inside a battle: the chakra economy,
//! per-character effect ledgers, target resolution, skill dispatch, turn
//! flow, win detection and the computer opponent.
//!
//! # Overview
//!
//! ```text
//! arena-protocol (target ids, skill uses)
//!        │
//!        ▼
//! arena-battle (state + resolution) ← THIS CRATE
//!        │
//!        └─> arena-server (stores, locks, service)
//! ```
//!
//! # Main Types
//!
//! - [`Battle`] - The persisted battle record; entry point for [`Battle::process_turn`]
//! - [`SideState`] - One side's health, chakra, cooldowns and ledgers
//! - [`ChakraPool`] - Typed chakra counters
//! - [`Ledger`] / [`ActiveEffect`] - Effects currently applied to a character
//! - [`Rejection`] - Why a submitted skill use was dropped
//! - [`AiConfig`] - Computer opponent tuning
//!
//! # Example Usage
//!
//! ```ignore
//! use arena_battle::{AiConfig, Battle, Entrant};
//! use arena_protocol::{SkillUse, TargetId};
//! use arena_team::Roster;
//!
//! let roster = Roster::load("characters.json")?;
//! let mut rng = rand::thread_rng();
//! let mut battle = Battle::new(
//!     "battle-1",
//!     Entrant::human("alice", [1, 2, 3]),
//!     Entrant::ai("AI_1", [4, 5, 1]),
//!     100,
//!     &mut rng,
//! );
//!
//! // Queue alice's actions, then resolve (the computer replies in the same call)
//! battle.side_by_id_mut("alice").unwrap().submit(vec![
//!     SkillUse::new(0, 0, TargetId { side: 1, slot: 0 }),
//! ]);
//! let report = battle.process_turn(&roster, &AiConfig::default(), &mut rng);
//! println!("resolved {} turns", report.turns_resolved);
//! ```

pub mod ai;
pub mod engine;
pub mod types;

// Re-export main types at crate root for convenience
pub use ai::{AiConfig, computer_opponent, plan_turn};
pub use engine::{
    Battle, BattleStatus, Entrant, MatchResult, Rejection, RejectedAction, TurnReport, UsedSkill,
    check_action, dispatch_action, now_millis,
};
pub use types::{ActiveEffect, ChakraPool, Ledger, Lifetime, SideState};

// Re-export commonly used protocol types
pub use arena_protocol::{SkillUse, TargetId};
