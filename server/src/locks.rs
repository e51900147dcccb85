//! Per-battle locks

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per battle id.
///
/// Holding a battle's guard serializes every load-modify-save on it; other
/// battles proceed in parallel.
#[derive(Debug, Default)]
pub struct BattleLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl BattleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a battle
    pub async fn acquire(&self, battle_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(battle_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock for a battle nobody is waiting on
    pub fn release(&self, battle_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(lock) = locks.get(battle_id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(battle_id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
