//! Battle service for Chakra Arena.
//!
//! Wraps the battle engine with everything a request handler needs: battle
//! storage, one lock per battle, result reporting and configuration.
//!
//! # Overview
//!
//! ```text
//! request (form pairs / JSON body)
//!        │
//!        ▼
//! Arena ── lock battle ── load ── resolve turn ── save ── report result
//!   │
//!   ├─> BattleStore (memory or JSON file)
//!   └─> MatchReporter (once per finished battle)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use arena_server::{Arena, ArenaConfig};
//!
//! let arena = Arena::from_config(ArenaConfig::load("arena.toml")?)?;
//! let battle = arena.create_ai_battle("alice", [1, 2, 3]).await?;
//! let outcome = arena
//!     .submit_form(&battle.id, "alice", [("target[0][0][]", "10")])
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod locks;
pub mod reporter;
pub mod service;
pub mod store;

pub use config::ArenaConfig;
pub use error::{ArenaError, NoOp};
pub use locks::BattleLocks;
pub use reporter::{LogReporter, MatchReporter, RecordingReporter};
pub use service::{Arena, TurnOutcome};
pub use store::{BattleStore, JsonFileStore, MemoryStore};
