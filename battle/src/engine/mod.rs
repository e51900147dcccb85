//! Turn resolution: validation, targeting, effect application and turn flow

mod battle;
mod dispatch;
mod targeting;
mod turn;

pub use battle::{Battle, BattleStatus, Entrant, MatchResult, now_millis};
pub use dispatch::{ActionPlan, Rejection, UsedSkill, check_action, dispatch_action};
pub use targeting::Resolution;
pub use turn::{RejectedAction, TurnReport};
