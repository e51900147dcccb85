//! Target resolution: primary target, hit expansion and per-effect targets

use arena_protocol::TargetId;
use arena_team::{Skill, SkillId, TargetMode};
use rand::Rng;
use rand::seq::SliceRandom;

use super::battle::Battle;

/// Slots an effect lands on for one hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every listed slot
    Slots(Vec<TargetId>),
    /// One slot chosen at random when applied
    OneOf(Vec<TargetId>),
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        match self {
            Resolution::Slots(slots) | Resolution::OneOf(slots) => slots.is_empty(),
        }
    }

    /// Settle the resolution into concrete slots
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<TargetId> {
        match self {
            Resolution::Slots(slots) => slots,
            Resolution::OneOf(slots) => slots.choose(rng).copied().into_iter().collect(),
        }
    }
}

/// Living enemy of `actor` that is not invulnerable
pub fn is_open_enemy(battle: &Battle, actor: TargetId, target: TargetId) -> bool {
    target.side != actor.side
        && battle.is_alive(target)
        && !battle.sides[target.side].is_invulnerable(target.slot)
}

pub fn is_living_ally(battle: &Battle, actor: TargetId, target: TargetId) -> bool {
    target.side == actor.side && battle.is_alive(target)
}

/// Whether `target` carries `mark` from `caster` (any mark when unset)
pub fn carries_mark(battle: &Battle, target: TargetId, mark: Option<SkillId>, caster: &str) -> bool {
    let ledger = battle.ledger(target);
    match mark {
        Some(mark) => ledger.has_mark(mark, Some(caster)),
        None => ledger.has_any_mark_from(caster),
    }
}

fn enemy_slots(actor: TargetId) -> impl Iterator<Item = TargetId> {
    TargetId::side_slots(1 - actor.side)
}

fn open_enemies(battle: &Battle, actor: TargetId) -> Vec<TargetId> {
    enemy_slots(actor)
        .filter(|&t| is_open_enemy(battle, actor, t))
        .collect()
}

fn marked_enemies(battle: &Battle, actor: TargetId, caster: &str, skill: &Skill) -> Vec<TargetId> {
    enemy_slots(actor)
        .filter(|&t| is_open_enemy(battle, actor, t))
        .filter(|&t| carries_mark(battle, t, skill.target_req_effect, caster))
        .collect()
}

fn living_allies(battle: &Battle, actor: TargetId) -> Vec<TargetId> {
    TargetId::side_slots(actor.side)
        .filter(|&t| battle.is_alive(t))
        .collect()
}

/// Resolve the declared target against the skill's mode.
///
/// An invalid declaration falls back to the first open enemy (marked for
/// `all_marked`) or to the acting slot for ally and self modes. Returns None
/// when an enemy-facing skill has nobody to hit.
pub fn primary_target(
    battle: &Battle,
    actor: TargetId,
    caster: &str,
    skill: &Skill,
    declared: TargetId,
) -> Option<TargetId> {
    let declared_ok = match skill.target {
        TargetMode::Enemy | TargetMode::AllEnemies | TargetMode::RandomEnemy => {
            is_open_enemy(battle, actor, declared)
        }
        TargetMode::AllMarked => {
            is_open_enemy(battle, actor, declared)
                && carries_mark(battle, declared, skill.target_req_effect, caster)
        }
        TargetMode::Ally | TargetMode::AllAllies => is_living_ally(battle, actor, declared),
        TargetMode::All => {
            is_open_enemy(battle, actor, declared) || is_living_ally(battle, actor, declared)
        }
        TargetMode::OnSelf => declared == actor,
    };
    if declared_ok {
        return Some(declared);
    }

    match skill.target {
        TargetMode::Enemy | TargetMode::AllEnemies | TargetMode::RandomEnemy => {
            open_enemies(battle, actor).into_iter().next()
        }
        TargetMode::AllMarked => marked_enemies(battle, actor, caster, skill).into_iter().next(),
        TargetMode::Ally | TargetMode::AllAllies | TargetMode::All | TargetMode::OnSelf => {
            Some(actor)
        }
    }
}

/// Expand the primary target into hits.
///
/// A target transform on the actor or a native area skill strikes all three
/// slots of the primary target's side.
pub fn expand_hits(battle: &Battle, actor: TargetId, skill: &Skill, primary: TargetId) -> Vec<TargetId> {
    if skill.is_native_aoe() || battle.ledger(actor).transforms(skill.id) {
        TargetId::side_slots(primary.side).collect()
    } else {
        vec![primary]
    }
}

/// Slots one effect lands on for hit `hit`
pub fn effect_targets(
    battle: &Battle,
    actor: TargetId,
    caster: &str,
    skill: &Skill,
    mode: TargetMode,
    hit: TargetId,
) -> Resolution {
    let slots = match mode {
        TargetMode::Enemy => {
            if is_open_enemy(battle, actor, hit) {
                vec![hit]
            } else {
                Vec::new()
            }
        }
        TargetMode::AllEnemies => open_enemies(battle, actor),
        TargetMode::OnSelf => vec![actor],
        TargetMode::Ally => {
            if is_living_ally(battle, actor, hit) {
                vec![hit]
            } else {
                vec![actor]
            }
        }
        TargetMode::AllAllies => living_allies(battle, actor),
        TargetMode::All => {
            let mut slots = open_enemies(battle, actor);
            slots.extend(living_allies(battle, actor));
            slots
        }
        TargetMode::AllMarked => marked_enemies(battle, actor, caster, skill),
        TargetMode::RandomEnemy => {
            let living = enemy_slots(actor).filter(|&t| battle.is_alive(t)).collect();
            return Resolution::OneOf(living);
        }
    };
    Resolution::Slots(slots)
}
