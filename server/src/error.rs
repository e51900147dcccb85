use arena_team::CharacterId;
use thiserror::Error;

/// Errors creating a battle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("Computer opponents are disabled")]
    AiDisabled,

    #[error("Roster has fewer than three unlocked characters")]
    RosterTooSmall,

    #[error("Unknown character: {0}")]
    UnknownCharacter(CharacterId),

    #[error("Player {0} cannot battle themselves")]
    SamePlayer(String),
}

/// Why a request left the battle untouched
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    #[error("battle not found")]
    BattleNotFound,

    #[error("battle is already finished")]
    Finished,

    #[error("player is not in this battle")]
    NotParticipant,

    #[error("it is not this player's turn")]
    NotYourTurn,

    #[error("the active side cannot claim its own timeout")]
    OwnTurn,

    #[error("the active side has not timed out")]
    NotTimedOut,
}
