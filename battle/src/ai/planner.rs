//! Turn planning for computer-controlled sides

use arena_protocol::{SLOTS_PER_SIDE, SkillUse, TargetId};
use arena_team::{Character, CharacterCatalog, ChakraCost, TargetMode};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::AiConfig;
use crate::engine::{Battle, check_action};
use crate::types::ChakraPool;

/// A legal skill use and what it costs
#[derive(Debug, Clone, Copy)]
struct Move {
    action: SkillUse,
    cost: ChakraCost,
}

impl Move {
    fn hits_vendetta(&self, enemy: usize, vendetta: Option<usize>) -> bool {
        self.action.target_id.side == enemy && Some(self.action.target_id.slot) == vendetta
    }
}

/// Choose actions for side `side`, queue them and mark the side ready.
///
/// Moves are validated against a scratch copy of the side's chakra so the
/// plan never spends more than the side holds.
pub fn plan_turn<C, R>(
    battle: &mut Battle,
    side: usize,
    catalog: &C,
    config: &AiConfig,
    rng: &mut R,
) -> Vec<SkillUse>
where
    C: CharacterCatalog + ?Sized,
    R: Rng + ?Sized,
{
    if side > 1 {
        return Vec::new();
    }
    let enemy = 1 - side;
    let vendetta = refresh_vendetta(battle, side, rng);
    let turn_roll: u32 = rng.gen_range(0..3);

    let mut budget = battle.sides[side].chakra;
    let mut actions = Vec::new();

    for slot in 0..SLOTS_PER_SIDE {
        let acting = &battle.sides[side];
        if !acting.is_alive(slot) || acting.is_stunned(slot) {
            continue;
        }
        let Some(character) = catalog.find_by_id(acting.team[slot]) else {
            warn!(battle = %battle.id, character = acting.team[slot], "unknown character in computer team");
            continue;
        };

        if let Some(setup) = prerequisite_move(battle, side, slot, character, catalog, &budget, vendetta, rng) {
            budget.pay(&setup.cost);
            actions.push(setup.action);
            continue;
        }

        let slot_roll: u32 = rng.gen_range(0..3);
        if slot_roll == 0 && turn_roll < config.aggression_threshold {
            continue;
        }

        let moves: Vec<Move> = (0..character.skills().len())
            .flat_map(|skill_index| {
                moves_for_skill(battle, side, slot, character, skill_index, catalog, &budget, vendetta)
            })
            .collect();

        let ratio = config.vendetta_ratio.max(1);
        let picked = moves
            .choose_weighted(rng, |m| if m.hits_vendetta(enemy, vendetta) { ratio } else { 1 })
            .ok()
            .copied();
        if let Some(chosen) = picked {
            budget.pay(&chosen.cost);
            actions.push(chosen.action);
        }
    }

    debug!(
        battle = %battle.id,
        side = %battle.sides[side].id,
        actions = actions.len(),
        ?vendetta,
        "computer planned turn"
    );
    battle.sides[side].submit(actions.clone());
    actions
}

/// Keep the vendetta slot while it lives, otherwise pick a new living enemy
fn refresh_vendetta<R: Rng + ?Sized>(battle: &mut Battle, side: usize, rng: &mut R) -> Option<usize> {
    let enemy = &battle.sides[1 - side];
    let target = battle.sides[side]
        .vendetta_target
        .filter(|&slot| enemy.is_alive(slot))
        .or_else(|| enemy.living_slots().choose(rng).copied());
    battle.sides[side].vendetta_target = target;
    target
}

/// Cast the setup skill some other skill `requires`, when it is missing and
/// castable. A target in the vendetta slot index is preferred on either side.
#[allow(clippy::too_many_arguments)]
fn prerequisite_move<C, R>(
    battle: &Battle,
    side: usize,
    slot: usize,
    character: &Character,
    catalog: &C,
    budget: &ChakraPool,
    vendetta: Option<usize>,
    rng: &mut R,
) -> Option<Move>
where
    C: CharacterCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let actor = TargetId { side, slot };

    for skill in character.skills() {
        let Some(required) = skill.requires else {
            continue;
        };
        if battle.ledger(actor).satisfies_prerequisite(required) {
            continue;
        }
        let Some(setup_index) = character.skill_index(required) else {
            continue;
        };

        let moves = moves_for_skill(battle, side, slot, character, setup_index, catalog, budget, vendetta);
        let chosen = moves
            .iter()
            .find(|m| Some(m.action.target_id.slot) == vendetta)
            .or_else(|| moves.choose(rng))
            .copied();
        if chosen.is_some() {
            return chosen;
        }
    }
    None
}

/// Every legal use of one skill, one per distinct declared target
#[allow(clippy::too_many_arguments)]
fn moves_for_skill<C>(
    battle: &Battle,
    side: usize,
    slot: usize,
    character: &Character,
    skill_index: usize,
    catalog: &C,
    budget: &ChakraPool,
    vendetta: Option<usize>,
) -> Vec<Move>
where
    C: CharacterCatalog + ?Sized,
{
    let Some(skill) = character.skill(skill_index).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    for target in candidate_targets(side, slot, skill.target, vendetta) {
        let action = SkillUse::new(slot, skill_index, target);
        // Fallback re-targeting would duplicate another candidate, and a use
        // that lands nowhere is never worth planning
        let legal = check_action(battle, side, &action, catalog, budget)
            .is_ok_and(|plan| plan.primary == Some(target) && !plan.hits.is_empty());
        if legal {
            moves.push(Move {
                action,
                cost: skill.chakra,
            });
            if !matches!(skill.target, TargetMode::Enemy | TargetMode::Ally) {
                break;
            }
        }
    }
    moves
}

/// Declared targets worth trying for a target mode.
///
/// Whole-side and random modes try the vendetta slot first and keep only one
/// legal declaration.
fn candidate_targets(side: usize, slot: usize, mode: TargetMode, vendetta: Option<usize>) -> Vec<TargetId> {
    let enemy = 1 - side;
    let mut enemies: Vec<TargetId> = TargetId::side_slots(enemy).collect();
    if let Some(v) = vendetta {
        enemies.sort_by_key(|t| t.slot != v);
    }

    match mode {
        TargetMode::Enemy => TargetId::side_slots(enemy).collect(),
        TargetMode::AllEnemies | TargetMode::AllMarked | TargetMode::RandomEnemy => enemies,
        TargetMode::Ally | TargetMode::AllAllies => TargetId::side_slots(side).collect(),
        TargetMode::OnSelf => vec![TargetId { side, slot }],
        TargetMode::All => {
            enemies.extend(TargetId::side_slots(side));
            enemies
        }
    }
}
