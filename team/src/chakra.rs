//! Chakra kinds and skill costs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The four typed chakra kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChakraKind {
    Taijutsu,
    Bloodline,
    Ninjutsu,
    Genjutsu,
}

impl ChakraKind {
    /// All kinds in cost-string order (`1`..`4`)
    pub const ALL: [ChakraKind; 4] = [
        ChakraKind::Taijutsu,
        ChakraKind::Bloodline,
        ChakraKind::Ninjutsu,
        ChakraKind::Genjutsu,
    ];

    /// Parse from a cost-string digit (`0` is generic and has no kind)
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(ChakraKind::Taijutsu),
            '2' => Some(ChakraKind::Bloodline),
            '3' => Some(ChakraKind::Ninjutsu),
            '4' => Some(ChakraKind::Genjutsu),
            _ => None,
        }
    }

    /// Convert to cost-string digit
    pub fn to_digit(&self) -> char {
        match self {
            ChakraKind::Taijutsu => '1',
            ChakraKind::Bloodline => '2',
            ChakraKind::Ninjutsu => '3',
            ChakraKind::Genjutsu => '4',
        }
    }

    /// Array index of this kind
    pub fn index(&self) -> usize {
        match self {
            ChakraKind::Taijutsu => 0,
            ChakraKind::Bloodline => 1,
            ChakraKind::Ninjutsu => 2,
            ChakraKind::Genjutsu => 3,
        }
    }

    /// Short display name
    pub fn as_str(&self) -> &'static str {
        match self {
            ChakraKind::Taijutsu => "tai",
            ChakraKind::Bloodline => "blo",
            ChakraKind::Ninjutsu => "nin",
            ChakraKind::Genjutsu => "gen",
        }
    }
}

impl fmt::Display for ChakraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed skill cost: typed minimums plus a generic (any kind) count.
///
/// Serialized as the catalog's cost string, e.g. `"130"` is one taijutsu,
/// one ninjutsu and one chakra of any kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChakraCost {
    /// Typed requirements indexed by [`ChakraKind::index`]
    pub typed: [u32; 4],

    /// Units payable with any kind
    pub generic: u32,
}

impl ChakraCost {
    /// A cost of nothing
    pub const FREE: ChakraCost = ChakraCost {
        typed: [0; 4],
        generic: 0,
    };

    /// Parse a cost string; unknown characters are ignored
    pub fn parse(s: &str) -> Self {
        let mut cost = ChakraCost::default();
        for c in s.chars() {
            if c == '0' {
                cost.generic += 1;
            } else if let Some(kind) = ChakraKind::from_digit(c) {
                cost.typed[kind.index()] += 1;
            }
        }
        cost
    }

    /// Required amount of one kind
    pub fn of(&self, kind: ChakraKind) -> u32 {
        self.typed[kind.index()]
    }

    /// Sum of the typed requirements
    pub fn typed_total(&self) -> u32 {
        self.typed.iter().sum()
    }

    /// Total units this cost consumes
    pub fn total(&self) -> u32 {
        self.typed_total() + self.generic
    }

    pub fn is_free(&self) -> bool {
        self.total() == 0
    }

    /// Convert back to the catalog cost string
    pub fn to_cost_string(&self) -> String {
        let mut s = String::with_capacity(self.total() as usize);
        for kind in ChakraKind::ALL {
            for _ in 0..self.of(kind) {
                s.push(kind.to_digit());
            }
        }
        for _ in 0..self.generic {
            s.push('0');
        }
        s
    }
}

impl fmt::Display for ChakraCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cost_string())
    }
}

impl Serialize for ChakraCost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cost_string())
    }
}

impl<'de> Deserialize<'de> for ChakraCost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ChakraCost::parse(&s))
    }
}
