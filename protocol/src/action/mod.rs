
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ParseError;
use crate::target::{SLOTS_PER_SIDE, TargetId};

/// Number of skills each character carries
pub const SKILLS_PER_CHARACTER: usize = 4;

/// One submitted skill use: which character, which of its skills, and on whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillUse {
    pub char_index: usize,
    pub skill_index: usize,
    pub target_id: TargetId,
}

impl SkillUse {
    pub fn new(char_index: usize, skill_index: usize, target_id: TargetId) -> Self {
        Self {
            char_index,
            skill_index,
            target_id,
        }
    }

    /// Check that the indices address a real character and skill slot
    pub fn in_range(&self) -> bool {
        self.char_index < SLOTS_PER_SIDE && self.skill_index < SKILLS_PER_CHARACTER
    }

    /// Form-encoded key/value pair for this skill use
    pub fn to_form_pair(&self) -> (String, String) {
        (
            format!("target[{}][{}][]", self.char_index, self.skill_index),
            self.target_id.to_wire_format(),
        )
    }
}

/// Parse a single form pair such as `target[1][2][]=10`
pub fn parse_skill_use(key: &str, value: &str) -> Result<SkillUse> {
    let inner = key
        .trim()
        .strip_prefix("target[")
        .ok_or_else(|| ParseError::InvalidKey(key.to_string()))?;
    let inner = inner.strip_suffix("[]").unwrap_or(inner);
    let inner = inner
        .strip_suffix(']')
        .ok_or_else(|| ParseError::InvalidKey(key.to_string()))?;

    // inner is now "C][S"
    let mut parts = inner.split("][");
    let char_index = parts
        .next()
        .and_then(|p| p.parse::<usize>().ok())
        .ok_or_else(|| ParseError::InvalidKey(key.to_string()))?;
    let skill_index = parts
        .next()
        .and_then(|p| p.parse::<usize>().ok())
        .ok_or_else(|| ParseError::InvalidKey(key.to_string()))?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidKey(key.to_string()).into());
    }

    if value.trim().is_empty() {
        return Err(ParseError::MissingField("target".to_string()).into());
    }
    let target_id = TargetId::parse(value)?;

    let skill_use = SkillUse::new(char_index, skill_index, target_id);
    if !skill_use.in_range() {
        return Err(ParseError::InvalidKey(key.to_string()).into());
    }
    Ok(skill_use)
}

/// Parse form-encoded submission pairs into skill uses.
///
/// Pairs that are not `target[..][..]` keys or that fail to parse are
/// dropped, so a malformed submission degrades to fewer (or no) moves.
pub fn parse_form_actions<K, V, I>(pairs: I) -> Vec<SkillUse>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .filter(|(key, _)| key.as_ref().trim().starts_with("target["))
        .filter_map(|(key, value)| parse_skill_use(key.as_ref(), value.as_ref()).ok())
        .collect()
}

/// Parse a JSON body holding either one skill use or an array of them.
///
/// Only non-JSON input is an error; individual malformed entries are dropped.
pub fn parse_json_actions(body: &str) -> Result<Vec<SkillUse>> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ParseError::EmptySubmission.into());
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<SkillUse>(entry).ok())
        .filter(SkillUse::in_range)
        .collect())
}
