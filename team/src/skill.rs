//! Skill definitions, target modes and effect types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chakra::ChakraCost;

/// Skill identifier; also the identity of every ledger entry a skill creates
pub type SkillId = u32;

/// How a skill (or one of its effects) chooses the slots it lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    Enemy,
    AllEnemies,
    AllMarked,
    All,
    Ally,
    #[serde(rename = "self")]
    OnSelf,
    AllAllies,
    RandomEnemy,
}

impl TargetMode {
    /// Modes that describe a whole side at once.
    ///
    /// When a skill resolves against several hits, these apply on the first
    /// hit only.
    pub fn is_whole_side(&self) -> bool {
        matches!(
            self,
            TargetMode::OnSelf
                | TargetMode::Ally
                | TargetMode::All
                | TargetMode::AllEnemies
                | TargetMode::AllAllies
                | TargetMode::AllMarked
        )
    }

    /// Catalog string for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Enemy => "enemy",
            TargetMode::AllEnemies => "all_enemies",
            TargetMode::AllMarked => "all_marked",
            TargetMode::All => "all",
            TargetMode::Ally => "ally",
            TargetMode::OnSelf => "self",
            TargetMode::AllAllies => "all_allies",
            TargetMode::RandomEnemy => "random_enemy",
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every effect kind a skill can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    // Disables and flags
    Stun,
    Mark,

    // Health
    Damage,
    AfflictionDamage,
    AoeDamage,
    Heal,
    HealthSet,
    HealthReducePercent,

    // Damage modifiers
    DamageBoost,
    DamageReduction,
    DisableDamageReduction,
    SkillDamageNerf,

    // Invulnerability
    Invulnerable,
    DisableInvulnerable,

    // Chakra
    RemoveChakra,
    DrainChakra,

    // Targeting
    TargetTransform,
    TargetRestrictMarked,

    // Cleansing
    RemoveMark,
}

impl EffectType {
    /// Ledger entries that deal their amount at the start of each of the
    /// victim's turns. Area damage lands once and never ticks.
    pub fn ticks_each_turn(&self) -> bool {
        matches!(self, EffectType::Damage | EffectType::AfflictionDamage)
    }

    /// Affliction ignores damage reduction and invulnerability
    pub fn is_affliction(&self) -> bool {
        matches!(self, EffectType::AfflictionDamage)
    }

    /// Catalog string for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectType::Stun => "stun",
            EffectType::Mark => "mark",
            EffectType::Damage => "damage",
            EffectType::AfflictionDamage => "affliction_damage",
            EffectType::AoeDamage => "aoe_damage",
            EffectType::Heal => "heal",
            EffectType::HealthSet => "health_set",
            EffectType::HealthReducePercent => "health_reduce_percent",
            EffectType::DamageBoost => "damage_boost",
            EffectType::DamageReduction => "damage_reduction",
            EffectType::DisableDamageReduction => "disable_damage_reduction",
            EffectType::SkillDamageNerf => "skill_damage_nerf",
            EffectType::Invulnerable => "invulnerable",
            EffectType::DisableInvulnerable => "disable_invulnerable",
            EffectType::RemoveChakra => "remove_chakra",
            EffectType::DrainChakra => "drain_chakra",
            EffectType::TargetTransform => "target_transform",
            EffectType::TargetRestrictMarked => "target_restrict_marked",
            EffectType::RemoveMark => "remove_mark",
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One effect a skill applies when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(rename = "type")]
    pub kind: EffectType,

    pub target: TargetMode,

    #[serde(default)]
    pub amount: u32,

    /// Turns the effect stays in the ledger; 0 is instantaneous (marks excepted)
    #[serde(default)]
    pub duration: u32,

    /// Scopes boosts, nerfs, transforms and mark removal to one skill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<SkillId>,
}

impl EffectSpec {
    pub fn new(kind: EffectType, target: TargetMode, amount: u32, duration: u32) -> Self {
        Self {
            kind,
            target,
            amount,
            duration,
            skill_id: None,
        }
    }

    /// Scope this effect to a single skill
    pub fn scoped_to(mut self, skill_id: SkillId) -> Self {
        self.skill_id = Some(skill_id);
        self
    }

    /// Whether applying this effect leaves an entry in the target's ledger
    pub fn is_persistent(&self) -> bool {
        self.duration > 0 || self.kind == EffectType::Mark
    }
}

/// A catalog skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub chakra: ChakraCost,

    /// Turns before the skill can be used again
    #[serde(default)]
    pub cooldown: u32,

    pub target: TargetMode,

    /// Skill whose effect must be active on the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<SkillId>,

    /// Cannot be reapplied to a target already carrying this skill's effect
    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_stacks: Option<u32>,

    /// Mark (by skill id) the target must carry from the same caster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_req_effect: Option<SkillId>,

    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

impl Skill {
    /// Create a free, cooldown-less skill with no effects
    pub fn new(id: SkillId, name: impl Into<String>, target: TargetMode) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            chakra: ChakraCost::FREE,
            cooldown: 0,
            target,
            requires: None,
            unique: false,
            max_active_stacks: None,
            target_req_effect: None,
            effects: Vec::new(),
        }
    }

    /// Inert placeholder filling an unused skill slot
    pub fn empty() -> Self {
        Self::new(0, "Empty", TargetMode::OnSelf)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    // === Builder helpers (catalog authoring and tests) ===

    pub fn with_cost(mut self, cost: &str) -> Self {
        self.chakra = ChakraCost::parse(cost);
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn requiring(mut self, skill_id: SkillId) -> Self {
        self.requires = Some(skill_id);
        self
    }

    pub fn requiring_mark(mut self, skill_id: SkillId) -> Self {
        self.target_req_effect = Some(skill_id);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_max_stacks(mut self, stacks: u32) -> Self {
        self.max_active_stacks = Some(stacks);
        self
    }

    /// Whether this skill natively strikes a whole side
    pub fn is_native_aoe(&self) -> bool {
        self.target == TargetMode::AllEnemies
            || self.effects.iter().any(|e| e.kind == EffectType::AoeDamage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_skill() {
        let json = r#"{
            "id": 12,
            "name": "Rasengan",
            "description": "Stuns and damages one enemy.",
            "chakra": "30",
            "cooldown": 1,
            "target": "enemy",
            "effects": [
                {"type": "damage", "target": "enemy", "amount": 45, "duration": 0},
                {"type": "stun", "target": "enemy", "amount": 0, "duration": 1}
            ]
        }"#;

        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.id, 12);
        assert_eq!(skill.cooldown, 1);
        assert_eq!(skill.target, TargetMode::Enemy);
        assert_eq!(skill.chakra.total(), 2);
        assert_eq!(skill.effects.len(), 2);
        assert_eq!(skill.effects[1].kind, EffectType::Stun);
        assert!(!skill.unique);
        assert!(skill.requires.is_none());
    }

    #[test]
    fn test_deserialize_self_target() {
        let effect: EffectSpec = serde_json::from_str(
            r#"{"type": "invulnerable", "target": "self", "duration": 1}"#,
        )
        .unwrap();
        assert_eq!(effect.target, TargetMode::OnSelf);
        assert_eq!(effect.amount, 0);
    }

    #[test]
    fn test_unknown_effect_type_is_rejected() {
        let result = serde_json::from_str::<EffectSpec>(
            r#"{"type": "teleport", "target": "enemy", "amount": 1, "duration": 0}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_whole_side_modes() {
        assert!(TargetMode::OnSelf.is_whole_side());
        assert!(TargetMode::AllMarked.is_whole_side());
        assert!(!TargetMode::Enemy.is_whole_side());
        assert!(!TargetMode::RandomEnemy.is_whole_side());
    }

    #[test]
    fn test_only_damage_and_affliction_tick() {
        assert!(EffectType::Damage.ticks_each_turn());
        assert!(EffectType::AfflictionDamage.ticks_each_turn());
        assert!(!EffectType::AoeDamage.ticks_each_turn());
        assert!(!EffectType::Heal.ticks_each_turn());
    }

    #[test]
    fn test_native_aoe() {
        let sweep = Skill::new(1, "Sweep", TargetMode::Enemy)
            .with_effect(EffectSpec::new(EffectType::AoeDamage, TargetMode::Enemy, 10, 0));
        assert!(sweep.is_native_aoe());

        let storm = Skill::new(2, "Storm", TargetMode::AllEnemies);
        assert!(storm.is_native_aoe());

        let jab = Skill::new(3, "Jab", TargetMode::Enemy)
            .with_effect(EffectSpec::new(EffectType::Damage, TargetMode::Enemy, 10, 0));
        assert!(!jab.is_native_aoe());
    }

    #[test]
    fn test_persistent_effects() {
        assert!(EffectSpec::new(EffectType::Mark, TargetMode::Enemy, 0, 0).is_persistent());
        assert!(EffectSpec::new(EffectType::Stun, TargetMode::Enemy, 0, 1).is_persistent());
        assert!(!EffectSpec::new(EffectType::Damage, TargetMode::Enemy, 20, 0).is_persistent());
    }

    #[test]
    fn test_type_strings_match_serde() {
        for kind in [EffectType::AfflictionDamage, EffectType::TargetRestrictMarked] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
