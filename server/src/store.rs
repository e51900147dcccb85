//! Battle persistence

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result, anyhow};
use arena_battle::Battle;

/// Keyed storage for battle records.
///
/// A missing battle is `Ok(None)`, not an error.
pub trait BattleStore: Send + Sync {
    fn load(&self, id: &str) -> Result<Option<Battle>>;
    fn save(&self, battle: &Battle) -> Result<()>;
}

/// Battles held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    battles: RwLock<HashMap<String, Battle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.battles.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BattleStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<Battle>> {
        let battles = self
            .battles
            .read()
            .map_err(|_| anyhow!("Battle store lock poisoned"))?;
        Ok(battles.get(id).cloned())
    }

    fn save(&self, battle: &Battle) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| anyhow!("Battle store lock poisoned"))?;
        battles.insert(battle.id.clone(), battle.clone());
        Ok(())
    }
}

/// All battles in one JSON object keyed by id, rewritten on every save
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    battles: RwLock<HashMap<String, Battle>>,
}

impl JsonFileStore {
    /// Open a store file, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let battles = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read battle file {}", path.display()))?;
            if json.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse battle file {}", path.display()))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            battles: RwLock::new(battles),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, battles: &HashMap<String, Battle>) -> Result<()> {
        let json = serde_json::to_string_pretty(battles).context("Failed to encode battles")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write battle file {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace battle file {}", self.path.display()))
    }
}

impl BattleStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Option<Battle>> {
        let battles = self
            .battles
            .read()
            .map_err(|_| anyhow!("Battle store lock poisoned"))?;
        Ok(battles.get(id).cloned())
    }

    fn save(&self, battle: &Battle) -> Result<()> {
        let mut battles = self
            .battles
            .write()
            .map_err(|_| anyhow!("Battle store lock poisoned"))?;
        // memory only changes once the file holds the new state
        let mut next = battles.clone();
        next.insert(battle.id.clone(), battle.clone());
        self.write_all(&next)?;
        *battles = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arena_battle::Entrant;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn sample(id: &str) -> Battle {
        let mut rng = StdRng::seed_from_u64(1);
        Battle::new(
            id,
            Entrant::human("alice", [1, 2, 3]),
            Entrant::human("bob", [4, 5, 1]),
            100,
            &mut rng,
        )
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arena-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load("b1").unwrap().is_none());

        store.save(&sample("b1")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("b1").unwrap().unwrap().id, "b1");
    }

    #[test]
    fn test_json_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::open(&path).unwrap();
        let mut battle = sample("b7");
        battle.sides[0].health[1] = 42;
        store.save(&battle).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let loaded = reopened.load("b7").unwrap().unwrap();
        assert_eq!(loaded, battle);
        assert!(reopened.load("missing").unwrap().is_none());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_store_failed_write_keeps_old_state() {
        let dir = std::env::temp_dir().join(format!("arena-missing-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = JsonFileStore::open(dir.join("battles.json")).unwrap();

        assert!(store.save(&sample("b3")).is_err());
        assert!(store.load("b3").unwrap().is_none());

        fs::create_dir_all(&dir).unwrap();
        store.save(&sample("b3")).unwrap();
        assert!(store.load("b3").unwrap().is_some());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let path = temp_path("garbage");
        fs::write(&path, "not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
        fs::remove_file(&path).unwrap();
    }
}
