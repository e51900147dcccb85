//! Character catalog lookup and roster loading

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::character::{Character, CharacterId};

/// Characters fielded by each side
pub const TEAM_SIZE: usize = 3;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid roster JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate character id: {0}")]
    DuplicateId(CharacterId),
}

/// Synchronous lookup of character definitions by id
pub trait CharacterCatalog {
    fn find_by_id(&self, id: CharacterId) -> Option<&Character>;
}

/// In-memory roster loaded from the catalog JSON
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: HashMap<CharacterId, Character>,
}

impl Roster {
    /// Build a roster from characters, rejecting duplicate ids
    pub fn new(characters: impl IntoIterator<Item = Character>) -> Result<Self, CatalogError> {
        let mut map = HashMap::new();
        for character in characters {
            let id = character.id;
            if map.insert(id, character).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { characters: map })
    }

    /// Parse a JSON array of characters
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let characters: Vec<Character> = serde_json::from_str(json)?;
        Self::new(characters)
    }

    /// Load a roster file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Iterate over all characters (unordered)
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Unlocked character ids, ascending
    pub fn unlocked_ids(&self) -> Vec<CharacterId> {
        let mut ids: Vec<_> = self
            .characters
            .values()
            .filter(|c| !c.locked)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Pick three distinct unlocked characters at random.
    ///
    /// Returns None when fewer than three characters are unlocked.
    pub fn random_team<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<[CharacterId; TEAM_SIZE]> {
        let ids = self.unlocked_ids();
        if ids.len() < TEAM_SIZE {
            return None;
        }
        let picked: Vec<CharacterId> = ids.choose_multiple(rng, TEAM_SIZE).copied().collect();
        Some([picked[0], picked[1], picked[2]])
    }
}

impl CharacterCatalog for Roster {
    fn find_by_id(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }
}
