//! Two-character target tokens
//!
//! The first character selects the side by battle order (`0` is the first
//! entrant, `1` the second), the second selects the character slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

/// Number of character slots on each side of a battle
pub const SLOTS_PER_SIDE: usize = 3;

/// A concrete character slot addressed by side and slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId {
    /// Index into the battle order (0 or 1)
    pub side: usize,

    /// Character slot on that side (0..3)
    pub slot: usize,
}

impl TargetId {
    /// Create a target, returning None when either index is out of range
    pub fn new(side: usize, slot: usize) -> Option<Self> {
        if side < 2 && slot < SLOTS_PER_SIDE {
            Some(Self { side, slot })
        } else {
            None
        }
    }

    /// Parse a token such as `"12"` (second side, third slot)
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let token = token.trim();
        let mut chars = token.chars();

        let (Some(side), Some(slot), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseError::InvalidTarget(token.to_string()));
        };

        let side = side.to_digit(10);
        let slot = slot.to_digit(10);

        match (side, slot) {
            (Some(side), Some(slot)) => Self::new(side as usize, slot as usize)
                .ok_or_else(|| ParseError::InvalidTarget(token.to_string())),
            _ => Err(ParseError::InvalidTarget(token.to_string())),
        }
    }

    /// All three slots of one side
    pub fn side_slots(side: usize) -> impl Iterator<Item = TargetId> {
        (0..SLOTS_PER_SIDE).map(move |slot| TargetId { side, slot })
    }

    /// Convert to wire format
    pub fn to_wire_format(&self) -> String {
        format!("{}{}", self.side, self.slot)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side, self.slot)
    }
}

impl FromStr for TargetId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TargetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_format())
    }
}

impl<'de> Deserialize<'de> for TargetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token).map_err(serde::de::Error::custom)
    }
}
