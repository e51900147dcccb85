//! Side (combatant) state

use arena_protocol::{SKILLS_PER_CHARACTER, SLOTS_PER_SIDE, SkillUse};
use arena_team::CharacterId;
use serde::{Deserialize, Serialize};

use super::chakra::ChakraPool;
use super::effect::Ledger;

/// One combatant's side of the battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideState {
    /// Player or computer id
    pub id: String,

    /// Character ids in slot order
    pub team: [CharacterId; SLOTS_PER_SIDE],

    pub health: [u32; SLOTS_PER_SIDE],
    pub max_health: [u32; SLOTS_PER_SIDE],

    pub chakra: ChakraPool,

    /// Turns left per character and skill slot
    pub cooldowns: [[u32; SKILLS_PER_CHARACTER]; SLOTS_PER_SIDE],

    pub active_effects: [Ledger; SLOTS_PER_SIDE],

    /// Queued skill uses for the current turn
    #[serde(default)]
    pub action: Vec<SkillUse>,

    #[serde(default)]
    pub ready: bool,

    #[serde(default)]
    pub is_ai: bool,

    /// Enemy slot the computer focuses on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendetta_target: Option<usize>,
}

impl SideState {
    /// Create a side at full health with no chakra
    pub fn new(id: impl Into<String>, team: [CharacterId; SLOTS_PER_SIDE], health: u32) -> Self {
        Self {
            id: id.into(),
            team,
            health: [health; SLOTS_PER_SIDE],
            max_health: [health; SLOTS_PER_SIDE],
            chakra: ChakraPool::default(),
            cooldowns: [[0; SKILLS_PER_CHARACTER]; SLOTS_PER_SIDE],
            active_effects: Default::default(),
            action: Vec::new(),
            ready: false,
            is_ai: false,
            vendetta_target: None,
        }
    }

    /// Mark this side as computer-controlled
    pub fn with_ai(mut self) -> Self {
        self.is_ai = true;
        self
    }

    // === Slot queries ===

    pub fn is_alive(&self, slot: usize) -> bool {
        self.health.get(slot).is_some_and(|&hp| hp > 0)
    }

    /// Living slot indices in order
    pub fn living_slots(&self) -> Vec<usize> {
        (0..SLOTS_PER_SIDE).filter(|&s| self.is_alive(s)).collect()
    }

    pub fn alive_count(&self) -> u32 {
        self.living_slots().len() as u32
    }

    /// Whether all three characters are down
    pub fn is_defeated(&self) -> bool {
        self.health.iter().all(|&hp| hp == 0)
    }

    pub fn is_stunned(&self, slot: usize) -> bool {
        self.active_effects
            .get(slot)
            .is_some_and(|ledger| ledger.is_stunned())
    }

    pub fn is_invulnerable(&self, slot: usize) -> bool {
        self.active_effects
            .get(slot)
            .is_some_and(|ledger| ledger.is_invulnerable())
    }

    pub fn cooldown(&self, slot: usize, skill_index: usize) -> u32 {
        self.cooldowns
            .get(slot)
            .and_then(|row| row.get(skill_index))
            .copied()
            .unwrap_or(0)
    }

    // === Health ===

    /// Subtract damage, floored at 0
    pub fn damage(&mut self, slot: usize, amount: u32) {
        if let Some(hp) = self.health.get_mut(slot) {
            *hp = hp.saturating_sub(amount);
        }
    }

    /// Add health, capped at max
    pub fn heal(&mut self, slot: usize, amount: u32) {
        if slot < SLOTS_PER_SIDE {
            self.health[slot] = self.health[slot]
                .saturating_add(amount)
                .min(self.max_health[slot]);
        }
    }

    /// Lower health to `value`; never raises it
    pub fn cap_health(&mut self, slot: usize, value: u32) {
        if let Some(hp) = self.health.get_mut(slot) {
            *hp = (*hp).min(value);
        }
    }

    /// Remove a percentage of current health
    pub fn reduce_health_percent(&mut self, slot: usize, percent: u32) {
        if let Some(hp) = self.health.get_mut(slot) {
            let loss = (*hp as u64 * percent as u64 / 100) as u32;
            *hp = hp.saturating_sub(loss);
        }
    }

    // === Turn bookkeeping ===

    /// Decrement every nonzero cooldown
    pub fn tick_cooldowns(&mut self) {
        for cell in self.cooldowns.iter_mut().flatten() {
            *cell = cell.saturating_sub(1);
        }
    }

    /// Queue actions for this turn and mark the side ready
    pub fn submit(&mut self, actions: Vec<SkillUse>) {
        self.action = actions;
        self.ready = true;
    }

    /// Take the queued actions, clearing the ready flag
    pub fn take_actions(&mut self) -> Vec<SkillUse> {
        self.ready = false;
        std::mem::take(&mut self.action)
    }
}
