use thiserror::Error;

pub mod action;
pub mod target;

pub use action::{
    SKILLS_PER_CHARACTER, SkillUse, parse_form_actions, parse_json_actions, parse_skill_use,
};
pub use target::{SLOTS_PER_SIDE, TargetId};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid target token: {0}")]
    InvalidTarget(String),

    #[error("Invalid action key: {0}")]
    InvalidKey(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty submission")]
    EmptySubmission,
}
