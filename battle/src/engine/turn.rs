//! Turn controller: resolving a side's queued actions, swapping turns and
//! start-of-turn processing

use arena_protocol::{SLOTS_PER_SIDE, SkillUse, TargetId};
use arena_team::{CharacterCatalog, EffectType};
use rand::Rng;
use tracing::{debug, info, warn};

use super::battle::{Battle, MatchResult, now_millis};
use super::dispatch::{Rejection, UsedSkill, dispatch_action};
use crate::ai::{AiConfig, plan_turn};
use crate::types::ChakraPool;

/// A skill use that was dropped, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedAction {
    pub side: String,
    pub action: SkillUse,
    pub reason: Rejection,
}

/// Everything that happened during one `process_turn` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Number of turn swaps performed
    pub turns_resolved: u32,
    pub used: Vec<UsedSkill>,
    pub rejected: Vec<RejectedAction>,
    /// Set when the battle finished during this call
    pub result: Option<MatchResult>,
}

impl Battle {
    /// Resolve the active side's turn if it is ready, then keep resolving
    /// while computer-controlled sides are up.
    ///
    /// Does nothing on a finished battle or when the active side is still
    /// waiting for input.
    pub fn process_turn<C, R>(&mut self, catalog: &C, ai: &AiConfig, rng: &mut R) -> TurnReport
    where
        C: CharacterCatalog + ?Sized,
        R: Rng + ?Sized,
    {
        let mut report = TurnReport::default();

        loop {
            if self.is_finished() {
                break;
            }
            let Some(active) = self.active_index() else {
                warn!(battle = %self.id, active = %self.active_turn, "active side is not in this battle");
                break;
            };

            if self.sides[active].is_ai && !self.sides[active].ready {
                plan_turn(self, active, catalog, ai, rng);
            }
            if !self.sides[active].ready {
                break;
            }

            self.resolve_actions(active, catalog, rng, &mut report);

            let next = 1 - active;
            self.active_turn = self.sides[next].id.clone();
            self.turn += 1;
            self.last_move_time = now_millis();
            info!(battle = %self.id, turn = self.turn, side = %self.active_turn, "turn swapped");

            self.start_new_turn(next, rng);
            report.turns_resolved += 1;

            if let Some(result) = self.check_win(active) {
                info!(battle = %self.id, winner = %result.winner, loser = %result.loser, "battle finished");
                report.result = Some(result);
                break;
            }

            if !self.sides[next].is_ai {
                break;
            }
            if report.turns_resolved >= ai.max_consecutive_turns {
                warn!(battle = %self.id, turns = report.turns_resolved, "computer turn limit reached");
                break;
            }
        }

        report
    }

    /// Dispatch the queued actions of side `side` in order, at most one per
    /// character slot
    fn resolve_actions<C, R>(&mut self, side: usize, catalog: &C, rng: &mut R, report: &mut TurnReport)
    where
        C: CharacterCatalog + ?Sized,
        R: Rng + ?Sized,
    {
        let actions = self.sides[side].take_actions();
        let mut acted = [false; SLOTS_PER_SIDE];

        for action in actions {
            let outcome = match acted.get(action.char_index) {
                Some(true) => Err(Rejection::AlreadyActed(action.char_index)),
                _ => dispatch_action(self, side, &action, catalog, rng),
            };

            match outcome {
                Ok(used) => {
                    acted[action.char_index] = true;
                    report.used.push(used);
                }
                Err(reason) => {
                    debug!(
                        battle = %self.id,
                        side = %self.sides[side].id,
                        char_index = action.char_index,
                        skill_index = action.skill_index,
                        %reason,
                        "action rejected"
                    );
                    report.rejected.push(RejectedAction {
                        side: self.sides[side].id.clone(),
                        action,
                        reason,
                    });
                }
            }
        }
    }

    /// Start-of-turn processing for the side about to act: cooldowns,
    /// damage over time, ledger aging and chakra
    pub fn start_new_turn<R: Rng + ?Sized>(&mut self, side: usize, rng: &mut R) {
        if side > 1 {
            return;
        }
        let caster = self.sides[side].id.clone();

        self.sides[side].tick_cooldowns();

        // Invulnerability as it stood before anything expires
        let invulnerable: [bool; SLOTS_PER_SIDE] =
            std::array::from_fn(|slot| self.sides[side].is_invulnerable(slot));

        for slot in 0..SLOTS_PER_SIDE {
            if !self.sides[side].is_alive(slot) {
                continue;
            }
            let ledger = self.ledger(TargetId { side, slot });
            let ticks: Vec<u32> = ledger
                .iter()
                .filter(|e| e.kind.ticks_each_turn())
                .filter(|e| e.kind.is_affliction() || !invulnerable[slot])
                .map(|e| ledger.reduce_damage(e.amount as f64, e.kind.is_affliction()))
                .collect();

            for damage in ticks {
                self.sides[side].damage(slot, damage);
                debug!(battle = %self.id, side = %caster, slot, damage, "damage over time");
            }
        }

        for state in self.sides.iter_mut() {
            for ledger in state.active_effects.iter_mut() {
                ledger.age(&caster);
            }
        }

        let gain = if self.turn == 2 {
            3
        } else {
            self.sides[side].alive_count()
        };
        let gained = ChakraPool::generate_random(gain, rng);
        self.sides[side].chakra.add(&gained);

        for slot in 0..SLOTS_PER_SIDE {
            if invulnerable[slot] {
                continue;
            }
            let drains: Vec<u32> = self.sides[side].active_effects[slot]
                .iter()
                .filter(|e| e.kind == EffectType::RemoveChakra && e.amount > 0)
                .map(|e| e.amount)
                .collect();
            for amount in drains {
                self.sides[side].chakra.remove_random(amount, rng);
            }
        }
    }

    /// Check for a wiped side after `acted` finished its turn.
    ///
    /// When both sides are wiped at once, the side that acted wins.
    pub fn check_win(&mut self, acted: usize) -> Option<MatchResult> {
        if self.is_finished() {
            return None;
        }
        let acted = acted.min(1);
        let defeated = [self.sides[0].is_defeated(), self.sides[1].is_defeated()];

        let winner = match defeated {
            [false, false] => return None,
            [true, true] => acted,
            [true, false] => 1,
            [false, true] => 0,
        };
        Some(self.finish(winner))
    }
}

#[cfg(test)]
mod tests {
    use arena_team::{Character, EffectSpec, Roster, Skill, TargetMode};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::battle::{BattleStatus, Entrant};
    use crate::types::Lifetime;

    const SAMPLE: &str = include_str!("../../../team/data/characters.json");

    fn roster() -> Roster {
        Roster::from_json(SAMPLE).unwrap()
    }

    fn t(side: usize, slot: usize) -> TargetId {
        TargetId { side, slot }
    }

    fn battle(second_is_ai: bool) -> Battle {
        let mut rng = StdRng::seed_from_u64(1);
        let second = if second_is_ai {
            Entrant::ai("cpu", [4, 5, 1])
        } else {
            Entrant::human("p2", [4, 5, 1])
        };
        let mut battle = Battle::new("b1", Entrant::human("p1", [1, 2, 3]), second, 100, &mut rng);
        battle.set_active(0);
        battle.sides[0].chakra = ChakraPool::new(2, 2, 2, 2);
        battle.sides[1].chakra = ChakraPool::new(2, 2, 2, 2);
        battle
    }

    #[test]
    fn test_not_ready_is_noop() {
        let mut battle = battle(false);
        let before = battle.clone();
        let mut rng = StdRng::seed_from_u64(2);

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report, TurnReport::default());
        assert_eq!(battle, before);
    }

    #[test]
    fn test_turn_swaps_and_applies_damage() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(2);
        battle.sides[0].submit(vec![SkillUse::new(0, 0, t(1, 0))]);

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report.turns_resolved, 1);
        assert_eq!(report.used.len(), 1);
        assert!(report.rejected.is_empty());
        assert_eq!(battle.sides[1].health[0], 80);
        assert_eq!(battle.active_turn, "p2");
        assert_eq!(battle.turn, 2);
        assert!(!battle.sides[0].ready);
        assert!(battle.sides[0].action.is_empty());
    }

    #[test]
    fn test_turn_two_gains_three_then_living_count() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(3);
        battle.sides[1].chakra = ChakraPool::default();
        battle.sides[0].submit(Vec::new());

        battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(battle.turn, 2);
        assert_eq!(battle.sides[1].chakra.total(), 3);

        battle.sides[0].chakra = ChakraPool::default();
        battle.sides[0].health[2] = 0;
        battle.sides[1].submit(Vec::new());
        battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(battle.turn, 3);
        assert_eq!(battle.sides[0].chakra.total(), 2);
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(2);
        battle.sides[0].chakra = ChakraPool::new(5, 5, 5, 5);
        battle.sides[0].submit(vec![
            SkillUse::new(0, 0, t(1, 0)),
            SkillUse::new(0, 0, t(1, 1)),
            SkillUse::new(1, 0, t(1, 1)),
        ]);

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report.used.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].reason, Rejection::AlreadyActed(0));
        assert_eq!(battle.sides[1].health, [80, 80, 100]);
    }

    #[test]
    fn test_failed_action_does_not_block_slot() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(2);
        battle.sides[0].submit(vec![
            // Rasengan without Shadow Clones
            SkillUse::new(0, 1, t(1, 0)),
            SkillUse::new(0, 0, t(1, 0)),
        ]);

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report.used.len(), 1);
        assert_eq!(
            report.rejected[0].reason,
            Rejection::MissingPrerequisite { skill: 12, required: 13 }
        );
    }

    #[test]
    fn test_cooldown_counts_own_turns() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(4);
        let catalog = roster();
        let ai = AiConfig::default();

        // Chidori: cooldown 1
        battle.sides[0].submit(vec![SkillUse::new(2, 1, t(1, 0))]);
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].cooldowns[2][1], 2);

        battle.sides[1].submit(Vec::new());
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].cooldowns[2][1], 1);

        battle.sides[0].submit(Vec::new());
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].cooldowns[2][1], 1);

        battle.sides[1].submit(Vec::new());
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].cooldowns[2][1], 0);
    }

    #[test]
    fn test_durations_age_on_caster_turn_only() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(5);
        let catalog = roster();
        let ai = AiConfig::default();

        // Rasengan prerequisites by hand, then stun p2's Hinata for one turn
        battle.ledger_mut(t(0, 0)).apply(
            &EffectSpec::new(EffectType::DamageReduction, TargetMode::OnSelf, 15, 4),
            15,
            "p1",
            0,
            &Skill::new(13, "Shadow Clones", TargetMode::OnSelf),
        );
        battle.sides[0].submit(vec![SkillUse::new(0, 1, t(1, 1))]);
        battle.process_turn(&catalog, &ai, &mut rng);

        // p2's turn start does not age p1's stun
        let stun = battle.ledger(t(1, 1)).iter().find(|e| e.kind == EffectType::Stun).unwrap();
        assert_eq!(stun.current_duration, Lifetime::Turns(1));
        assert!(battle.sides[1].is_stunned(1));

        battle.sides[1].submit(vec![SkillUse::new(1, 0, t(0, 0))]);
        let report = battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(report.rejected[0].reason, Rejection::Stunned(1));

        // p1's turn start expires it
        assert!(!battle.sides[1].is_stunned(1));
    }

    #[test]
    fn test_marks_persist() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(6);
        let catalog = roster();
        let ai = AiConfig::default();
        battle.set_active(1);

        // Female Bug
        battle.sides[1].submit(vec![SkillUse::new(0, 0, t(0, 2))]);
        battle.process_turn(&catalog, &ai, &mut rng);

        for _ in 0..10 {
            let active = battle.active_index().unwrap();
            battle.sides[active].submit(Vec::new());
            battle.process_turn(&catalog, &ai, &mut rng);
        }
        assert!(battle.ledger(t(0, 2)).has_mark(41, Some("p2")));
        assert!(battle.ledger(t(0, 2)).entries()[0].is_permanent());
    }

    #[test]
    fn test_dot_ticks_on_victim_turn() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(7);
        let catalog = roster();
        let ai = AiConfig::default();
        battle.set_active(1);

        // Bug Swarm: 10 affliction for three turns
        battle.sides[1].submit(vec![SkillUse::new(0, 2, t(0, 0))]);
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].health[0], 90);

        battle.sides[0].submit(Vec::new());
        battle.process_turn(&catalog, &ai, &mut rng);
        battle.sides[1].submit(Vec::new());
        battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(battle.sides[0].health[0], 80);
    }

    #[test]
    fn test_invulnerable_blocks_plain_dot() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(8);
        let burn = Skill::new(70, "Burn", TargetMode::Enemy);
        battle.ledger_mut(t(0, 0)).apply(
            &EffectSpec::new(EffectType::Damage, TargetMode::Enemy, 10, 3),
            10,
            "p2",
            0,
            &burn,
        );
        battle.ledger_mut(t(0, 0)).apply(
            &EffectSpec::new(EffectType::Invulnerable, TargetMode::OnSelf, 0, 1),
            0,
            "p1",
            0,
            &Skill::new(14, "Guard", TargetMode::OnSelf),
        );

        battle.start_new_turn(0, &mut rng);
        assert_eq!(battle.sides[0].health[0], 100);
        // the invulnerability was p1's own and has now expired
        assert!(!battle.sides[0].is_invulnerable(0));

        battle.start_new_turn(0, &mut rng);
        assert_eq!(battle.sides[0].health[0], 90);
    }

    #[test]
    fn test_area_damage_entry_does_not_tick() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(9);
        battle.ledger_mut(t(0, 1)).apply(
            &EffectSpec::new(EffectType::AoeDamage, TargetMode::AllEnemies, 10, 3),
            10,
            "p2",
            1,
            &Skill::new(52, "Palms", TargetMode::AllEnemies),
        );

        battle.start_new_turn(0, &mut rng);
        assert_eq!(battle.sides[0].health[1], 100);
        assert!(battle.ledger(t(0, 1)).has_type(EffectType::AoeDamage));
    }

    #[test]
    fn test_remove_chakra_entry_drains_at_turn_start() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(9);
        battle.turn = 5;
        battle.sides[0].chakra = ChakraPool::default();
        battle.ledger_mut(t(0, 1)).apply(
            &EffectSpec::new(EffectType::RemoveChakra, TargetMode::Enemy, 2, 3),
            2,
            "p2",
            0,
            &Skill::new(71, "Chakra Burn", TargetMode::Enemy),
        );

        battle.start_new_turn(0, &mut rng);
        // gained 3 (living count), then lost 2
        assert_eq!(battle.sides[0].chakra.total(), 1);
    }

    #[test]
    fn test_win_and_simultaneous_wipe() {
        let mut battle = battle(false);
        battle.sides[1].health = [0, 0, 0];
        let result = battle.check_win(0).unwrap();
        assert_eq!(result.winner, "p1");
        assert_eq!(battle.status, BattleStatus::Finished);

        let mut battle = self::battle(false);
        battle.sides[0].health = [0, 0, 0];
        battle.sides[1].health = [0, 0, 0];
        let result = battle.check_win(1).unwrap();
        assert_eq!(result.winner, "p2");
        assert_eq!(result.loser, "p1");
        assert!(battle.check_win(1).is_none());
    }

    #[test]
    fn test_finished_battle_is_terminal() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(2);
        battle.winner = Some("p2".to_string());
        battle.sides[0].submit(vec![SkillUse::new(0, 0, t(1, 0))]);
        let before = battle.clone();

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report.turns_resolved, 0);
        assert_eq!(battle, before);
    }

    #[test]
    fn test_killing_blow_finishes_battle() {
        let mut battle = battle(false);
        let mut rng = StdRng::seed_from_u64(2);
        battle.sides[1].health = [15, 0, 0];
        battle.sides[0].submit(vec![SkillUse::new(0, 0, t(1, 0))]);

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        let result = report.result.unwrap();
        assert_eq!(result.winner, "p1");
        assert_eq!(battle.winner.as_deref(), Some("p1"));
    }

    #[test]
    fn test_ai_replies_within_same_call() {
        let mut battle = battle(true);
        let mut rng = StdRng::seed_from_u64(10);
        battle.sides[0].submit(Vec::new());

        let report = battle.process_turn(&roster(), &AiConfig::default(), &mut rng);
        assert_eq!(report.turns_resolved, 2);
        assert_eq!(battle.active_turn, "p1");
        assert_eq!(battle.turn, 3);
        assert!(!battle.sides[1].ready);
    }

    #[test]
    fn test_two_computers_stop_at_limit() {
        let catalog = Roster::new([Character::new(
            9,
            "Pacifist",
            vec![Skill::new(90, "Wait", TargetMode::OnSelf)],
        )])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut battle = Battle::new(
            "b2",
            Entrant::ai("cpu1", [9, 9, 9]),
            Entrant::ai("cpu2", [9, 9, 9]),
            100,
            &mut rng,
        );
        let ai = AiConfig {
            max_consecutive_turns: 12,
            ..AiConfig::default()
        };

        let report = battle.process_turn(&catalog, &ai, &mut rng);
        assert_eq!(report.turns_resolved, 12);
        assert!(!battle.is_finished());
    }
}
