//! Skill-use validation and application

use arena_protocol::{SkillUse, TargetId};
use arena_team::{CharacterCatalog, CharacterId, EffectSpec, EffectType, Skill, SkillId};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::battle::Battle;
use super::targeting::{carries_mark, effect_targets, expand_hits, primary_target};
use crate::types::ChakraPool;

/// Why a submitted skill use was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("character slot or skill slot out of range")]
    OutOfRange,

    #[error("character in slot {0} is dead")]
    DeadActor(usize),

    #[error("character in slot {0} already acted this turn")]
    AlreadyActed(usize),

    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),

    #[error("character {character} has no skill in slot {index}")]
    UnknownSkill { character: CharacterId, index: usize },

    #[error("character in slot {0} is stunned")]
    Stunned(usize),

    #[error("skill {skill} is on cooldown for {turns} more turns")]
    OnCooldown { skill: SkillId, turns: u32 },

    #[error("skill {skill} requires skill {required} to be active")]
    MissingPrerequisite { skill: SkillId, required: SkillId },

    #[error("not enough chakra for skill {0}")]
    InsufficientChakra(SkillId),

    #[error("target {target} lacks mark {mark}")]
    MissingMark { target: TargetId, mark: SkillId },

    #[error("target {target} already carries skill {skill}")]
    AlreadyAffected { target: TargetId, skill: SkillId },

    #[error("target {0} is not marked")]
    RestrictedToMarked(TargetId),
}

/// A validated skill use, ready to apply
#[derive(Debug, Clone)]
pub struct ActionPlan<'c> {
    pub actor: TargetId,
    pub skill_index: usize,
    pub skill: &'c Skill,
    /// None when no slot can be targeted at all
    pub primary: Option<TargetId>,
    /// Slots the effects land on; empty when the use resolves as a no-op
    pub hits: Vec<TargetId>,
}

/// A skill use that resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedSkill {
    pub side: String,
    pub action: SkillUse,
    pub skill_id: SkillId,
    pub skill_name: String,
    pub hits: Vec<TargetId>,
}

/// Validate a skill use for side `side` against a chakra budget.
///
/// Performs every check without touching the battle. A use whose targets
/// are all out of reach (dead, invulnerable, unmarked) is still accepted
/// with no hits: it costs chakra and starts its cooldown. The computer opponent
/// uses this with a scratch budget to enumerate its legal moves.
pub fn check_action<'c, C>(
    battle: &Battle,
    side: usize,
    action: &SkillUse,
    catalog: &'c C,
    budget: &ChakraPool,
) -> Result<ActionPlan<'c>, Rejection>
where
    C: CharacterCatalog + ?Sized,
{
    if !action.in_range() || side > 1 {
        return Err(Rejection::OutOfRange);
    }
    let acting = &battle.sides[side];
    let slot = action.char_index;
    let actor = TargetId { side, slot };

    if !acting.is_alive(slot) {
        return Err(Rejection::DeadActor(slot));
    }

    let character_id = acting.team[slot];
    let character = catalog
        .find_by_id(character_id)
        .ok_or(Rejection::UnknownCharacter(character_id))?;
    let skill = character
        .skill(action.skill_index)
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::UnknownSkill {
            character: character_id,
            index: action.skill_index,
        })?;

    if acting.is_stunned(slot) {
        return Err(Rejection::Stunned(slot));
    }

    let turns = acting.cooldown(slot, action.skill_index);
    if turns > 0 {
        return Err(Rejection::OnCooldown {
            skill: skill.id,
            turns,
        });
    }

    if let Some(required) = skill.requires {
        if !battle.ledger(actor).satisfies_prerequisite(required) {
            return Err(Rejection::MissingPrerequisite {
                skill: skill.id,
                required,
            });
        }
    }

    if !budget.can_afford(&skill.chakra) {
        return Err(Rejection::InsufficientChakra(skill.id));
    }

    let caster = acting.id.as_str();
    let primary = primary_target(battle, actor, caster, skill, action.target_id);

    // With nobody left to hit, the declared target still answers the mark
    // and uniqueness checks; the use then resolves with no hits.
    let candidates = match primary {
        Some(primary) => expand_hits(battle, actor, skill, primary),
        None => vec![action.target_id],
    };

    let mut hits = Vec::new();
    let mut accepted = false;
    let mut first_failure = None;
    for hit in candidates {
        match check_hit(battle, actor, caster, skill, hit, hits.is_empty()) {
            Ok(affected) => {
                accepted = true;
                if affected && primary.is_some() {
                    hits.push(hit);
                }
            }
            Err(reason) => {
                first_failure.get_or_insert(reason);
            }
        }
    }
    if !accepted {
        if let Some(reason) = first_failure {
            return Err(reason);
        }
    }

    Ok(ActionPlan {
        actor,
        skill_index: action.skill_index,
        skill,
        primary,
        hits,
    })
}

/// Checks that reject a use on `hit`, then whether any effect would land
/// there
fn check_hit(
    battle: &Battle,
    actor: TargetId,
    caster: &str,
    skill: &Skill,
    hit: TargetId,
    first: bool,
) -> Result<bool, Rejection> {
    if let Some(mark) = skill.target_req_effect {
        if !battle.ledger(hit).has_mark(mark, Some(caster)) {
            return Err(Rejection::MissingMark { target: hit, mark });
        }
    }

    if skill.unique && battle.ledger(hit).has_entry(skill.id, caster) {
        return Err(Rejection::AlreadyAffected {
            target: hit,
            skill: skill.id,
        });
    }

    if hit.side != actor.side
        && battle.ledger(actor).restricts_to_marked(skill.id)
        && !carries_mark(battle, hit, None, caster)
    {
        return Err(Rejection::RestrictedToMarked(hit));
    }

    Ok(skill
        .effects
        .iter()
        .filter(|e| first || !e.target.is_whole_side())
        .any(|e| !effect_targets(battle, actor, caster, skill, e.target, hit).is_empty()))
}

/// Validate and apply one skill use for side `side`.
///
/// A rejected use leaves the battle untouched.
pub fn dispatch_action<C, R>(
    battle: &mut Battle,
    side: usize,
    action: &SkillUse,
    catalog: &C,
    rng: &mut R,
) -> Result<UsedSkill, Rejection>
where
    C: CharacterCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let budget = battle.sides.get(side).map(|s| s.chakra).unwrap_or_default();
    let ActionPlan {
        actor,
        skill_index,
        skill,
        hits,
        ..
    } = check_action(battle, side, action, catalog, &budget)?;
    let caster = battle.sides[side].id.clone();

    battle.sides[side].chakra.pay(&skill.chakra);
    if skill.cooldown > 0 {
        battle.sides[side].cooldowns[actor.slot][skill_index] = skill.cooldown + 1;
    }

    // Chakra is taken once per effect, however many slots it lands on
    let mut chakra_taken = vec![false; skill.effects.len()];
    for (i, &hit) in hits.iter().enumerate() {
        let first = i == 0;
        for (effect_index, effect) in skill.effects.iter().enumerate() {
            if !first && effect.target.is_whole_side() {
                continue;
            }
            let targets = effect_targets(battle, actor, &caster, skill, effect.target, hit).pick(rng);
            for target in targets {
                let take_chakra = !chakra_taken[effect_index];
                if apply_effect(battle, actor, &caster, skill, effect, target, take_chakra, rng) {
                    chakra_taken[effect_index] = true;
                }
            }
        }
    }

    info!(
        battle = %battle.id,
        side = %caster,
        skill = %skill.name,
        hits = hits.len(),
        "skill used"
    );

    Ok(UsedSkill {
        side: caster,
        action: *action,
        skill_id: skill.id,
        skill_name: skill.name.clone(),
        hits,
    })
}

/// Apply one effect to one slot and record it in the slot's ledger.
///
/// Returns true when chakra changed hands.
#[allow(clippy::too_many_arguments)]
fn apply_effect<R: Rng + ?Sized>(
    battle: &mut Battle,
    actor: TargetId,
    caster: &str,
    skill: &Skill,
    effect: &EffectSpec,
    target: TargetId,
    take_chakra: bool,
    rng: &mut R,
) -> bool {
    let mut amount = effect.amount;
    let mut moved_chakra = false;

    match effect.kind {
        EffectType::Damage | EffectType::AoeDamage | EffectType::AfflictionDamage => {
            let boost = battle.ledger(actor).damage_boost(skill.id);
            let nerf = battle.ledger(actor).damage_nerf(skill.id);
            let raw = effect.amount as f64 * (1.0 + boost as f64 / 100.0) * (1.0 - nerf as f64 / 100.0);

            if effect.duration == 0 {
                let dealt = battle
                    .ledger(target)
                    .reduce_damage(raw, effect.kind.is_affliction());
                battle.sides[target.side].damage(target.slot, dealt);
                debug!(battle = %battle.id, %target, dealt, "damage");
            }
            amount = raw.max(0.0).floor() as u32;
        }
        EffectType::Heal => battle.sides[target.side].heal(target.slot, effect.amount),
        EffectType::HealthSet => battle.sides[target.side].cap_health(target.slot, effect.amount),
        EffectType::HealthReducePercent => {
            battle.sides[target.side].reduce_health_percent(target.slot, effect.amount)
        }
        EffectType::DrainChakra => {
            if take_chakra {
                let stolen = battle.sides[target.side].chakra.remove_random(effect.amount, rng);
                battle.sides[actor.side].chakra.add(&stolen);
                moved_chakra = true;
            }
        }
        EffectType::RemoveChakra => {
            if take_chakra && effect.duration == 0 {
                battle.sides[target.side].chakra.remove_random(effect.amount, rng);
                moved_chakra = true;
            }
        }
        EffectType::RemoveMark => {
            battle.ledger_mut(target).remove_marks(caster, effect.skill_id);
        }
        EffectType::Stun
        | EffectType::Mark
        | EffectType::DamageBoost
        | EffectType::DamageReduction
        | EffectType::DisableDamageReduction
        | EffectType::SkillDamageNerf
        | EffectType::Invulnerable
        | EffectType::DisableInvulnerable
        | EffectType::TargetTransform
        | EffectType::TargetRestrictMarked => {}
    }

    battle
        .ledger_mut(target)
        .apply(effect, amount, caster, actor.slot, skill);
    moved_chakra
}
