//! Character catalog for Chakra Arena.
//!
//! Characters are static catalog entries: each carries exactly four skills,
//! and each skill carries a chakra cost, a cooldown, a target mode and an
//! ordered list of effects. The battle engine resolves every submitted
//! skill use through a [`CharacterCatalog`].
//!
//! ```ignore
//! use arena_team::{CharacterCatalog, Roster};
//!
//! let roster = Roster::from_json(include_str!("../data/characters.json"))?;
//! let naruto = roster.find_by_id(1).unwrap();
//! println!("{} knows {}", naruto.name, naruto.skills()[0].name);
//! ```

mod catalog;
mod chakra;
mod character;
mod skill;

pub use catalog::{CatalogError, CharacterCatalog, Roster, TEAM_SIZE};
pub use chakra::{ChakraCost, ChakraKind};
pub use character::{Character, CharacterId};
pub use skill::{EffectSpec, EffectType, Skill, SkillId, TargetMode};
