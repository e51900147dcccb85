//! Active effects and the per-slot effect ledger

use arena_team::{EffectSpec, EffectType, Skill, SkillId};
use serde::{Deserialize, Serialize};

/// Remaining lifetime of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// Turns left, decremented on the caster's turn start
    Turns(u32),
    /// Persists until explicitly removed (marks)
    UntilCleared,
}

/// One entry in a slot's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    #[serde(rename = "type")]
    pub kind: EffectType,

    pub amount: u32,

    /// Duration the entry was created with
    pub duration: u32,

    pub current_duration: Lifetime,

    /// Id of the skill that created this entry
    pub image_id: SkillId,

    /// Side id of the caster
    pub caster_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caster_slot: Option<usize>,

    /// Skill this entry is scoped to (boosts, nerfs, transforms)
    #[serde(rename = "skill_id", default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<SkillId>,

    #[serde(default)]
    pub skill_name: String,

    #[serde(default)]
    pub description: String,
}

impl ActiveEffect {
    /// Whether this entry applies to a given skill (unscoped entries apply to all)
    pub fn applies_to(&self, skill_id: SkillId) -> bool {
        self.skill_id.is_none_or(|id| id == skill_id)
    }

    pub fn is_permanent(&self) -> bool {
        self.current_duration == Lifetime::UntilCleared
    }
}

/// Everything currently affecting one character slot, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(Vec<ActiveEffect>);

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ActiveEffect] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record an applied effect.
    ///
    /// Instantaneous effects are never stored; a zero-duration mark lasts until
    /// cleared. Returns whether an entry was appended.
    pub fn apply(
        &mut self,
        effect: &EffectSpec,
        amount: u32,
        caster_id: &str,
        caster_slot: usize,
        skill: &Skill,
    ) -> bool {
        if !effect.is_persistent() {
            return false;
        }

        if let Some(max) = skill.max_active_stacks {
            let stacks = self
                .0
                .iter()
                .filter(|e| e.image_id == skill.id && e.kind == effect.kind && e.caster_id == caster_id)
                .count();
            if stacks >= max as usize {
                return false;
            }
        }

        let current_duration = if effect.duration == 0 {
            Lifetime::UntilCleared
        } else {
            Lifetime::Turns(effect.duration)
        };

        self.0.push(ActiveEffect {
            kind: effect.kind,
            amount,
            duration: effect.duration,
            current_duration,
            image_id: skill.id,
            caster_id: caster_id.to_string(),
            caster_slot: Some(caster_slot),
            skill_id: effect.skill_id,
            skill_name: skill.name.clone(),
            description: skill.description.clone(),
        });
        true
    }

    // === Queries ===

    pub fn has_type(&self, kind: EffectType) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    /// Whether any entry originates from (or is scoped to) `mark`,
    /// optionally only from one caster
    pub fn has_mark(&self, mark: SkillId, caster_id: Option<&str>) -> bool {
        self.0.iter().any(|e| {
            (e.image_id == mark || e.skill_id == Some(mark))
                && caster_id.is_none_or(|c| e.caster_id == c)
        })
    }

    /// Whether a mark-type entry from this caster is present
    pub fn has_any_mark_from(&self, caster_id: &str) -> bool {
        self.0
            .iter()
            .any(|e| e.kind == EffectType::Mark && e.caster_id == caster_id)
    }

    /// Whether this caster already has an entry from `skill_id` here
    pub fn has_entry(&self, skill_id: SkillId, caster_id: &str) -> bool {
        self.0
            .iter()
            .any(|e| e.image_id == skill_id && e.caster_id == caster_id)
    }

    pub fn is_stunned(&self) -> bool {
        self.has_type(EffectType::Stun)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.has_type(EffectType::Invulnerable) && !self.has_type(EffectType::DisableInvulnerable)
    }

    /// Percentage damage boost for a skill
    pub fn damage_boost(&self, skill_id: SkillId) -> u32 {
        self.0
            .iter()
            .filter(|e| e.kind == EffectType::DamageBoost && e.applies_to(skill_id))
            .map(|e| e.amount)
            .sum()
    }

    /// Percentage damage nerf for a skill, capped at 100
    pub fn damage_nerf(&self, skill_id: SkillId) -> u32 {
        let total: u32 = self
            .0
            .iter()
            .filter(|e| e.kind == EffectType::SkillDamageNerf && e.skill_id == Some(skill_id))
            .map(|e| e.amount)
            .sum();
        total.min(100)
    }

    /// Whether a target transform turns this skill into an area attack
    pub fn transforms(&self, skill_id: SkillId) -> bool {
        self.0
            .iter()
            .any(|e| e.kind == EffectType::TargetTransform && e.applies_to(skill_id))
    }

    /// Whether this slot may only strike marked enemies with `skill_id`
    pub fn restricts_to_marked(&self, skill_id: SkillId) -> bool {
        self.0
            .iter()
            .any(|e| e.kind == EffectType::TargetRestrictMarked && e.applies_to(skill_id))
    }

    /// Whether the effect a skill `requires` is active here.
    ///
    /// Entries that only make sense on an enemy do not count.
    pub fn satisfies_prerequisite(&self, required: SkillId) -> bool {
        self.0.iter().any(|e| {
            e.image_id == required
                && !matches!(
                    e.kind,
                    EffectType::Stun
                        | EffectType::Mark
                        | EffectType::Damage
                        | EffectType::AoeDamage
                        | EffectType::DisableDamageReduction
                )
        })
    }

    /// Damage after this slot's reductions, floored.
    ///
    /// Affliction and `disable_damage_reduction` bypass reductions.
    pub fn reduce_damage(&self, damage: f64, affliction: bool) -> u32 {
        if affliction || self.has_type(EffectType::DisableDamageReduction) {
            return damage.max(0.0).floor() as u32;
        }
        let reduced = self
            .0
            .iter()
            .filter(|e| e.kind == EffectType::DamageReduction && e.amount > 0)
            .fold(damage, |dmg, e| dmg * (1.0 - e.amount as f64 / 100.0));
        reduced.max(0.0).floor() as u32
    }

    // === Mutation ===

    /// Age entries cast by `caster_id`, dropping those that expire.
    ///
    /// Returns the number of entries removed.
    pub fn age(&mut self, caster_id: &str) -> usize {
        let before = self.0.len();
        self.0.retain_mut(|e| {
            if e.caster_id != caster_id {
                return true;
            }
            match &mut e.current_duration {
                Lifetime::UntilCleared => true,
                Lifetime::Turns(left) => {
                    *left = left.saturating_sub(1);
                    *left > 0
                }
            }
        });
        before - self.0.len()
    }

    /// Clear marks cast by `caster_id`, only those from `mark` when given.
    ///
    /// Returns the number of entries removed.
    pub fn remove_marks(&mut self, caster_id: &str, mark: Option<SkillId>) -> usize {
        let before = self.0.len();
        self.0.retain(|e| {
            !(e.kind == EffectType::Mark
                && e.caster_id == caster_id
                && mark.is_none_or(|m| e.image_id == m))
        });
        before - self.0.len()
    }
}
