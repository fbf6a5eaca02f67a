//! Strongly-typed wrappers for game concepts
//!
//! Template ids and faction names are both strings in the catalog, so they are
//! wrapped in distinct types that cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog template id shared by every instance of a card
///
/// Examples: "ember_scout", "legion_banneret"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(s: impl Into<String>) -> Self {
        TemplateId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Template id used for summoned tokens
    pub fn token() -> Self {
        TemplateId("token".to_string())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        TemplateId(s)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        TemplateId(s.to_string())
    }
}

/// Faction a card or player belongs to (e.g., "ember", "tide")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction(String);

impl Faction {
    pub fn new(s: impl Into<String>) -> Self {
        Faction(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cards usable by any faction
    pub fn neutral() -> Self {
        Faction("neutral".to_string())
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Faction {
    fn from(s: &str) -> Self {
        Faction(s.to_string())
    }
}

impl From<String> for Faction {
    fn from(s: String) -> Self {
        Faction(s)
    }
}

/// One of the two seats at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerId {
    #[serde(rename = "player1")]
    Player1,
    #[serde(rename = "player2")]
    Player2,
}

impl PlayerId {
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::Player1 => PlayerId::Player2,
            PlayerId::Player2 => PlayerId::Player1,
        }
    }

    /// Index into the two-element player array
    pub fn index(self) -> usize {
        match self {
            PlayerId::Player1 => 0,
            PlayerId::Player2 => 1,
        }
    }

    pub fn both() -> [PlayerId; 2] {
        [PlayerId::Player1, PlayerId::Player2]
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Player1 => write!(f, "player1"),
            PlayerId::Player2 => write!(f, "player2"),
        }
    }
}

/// Play style that biases card scoring and attack targeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticsType {
    Aggressive,
    Defensive,
    Tempo,
    #[default]
    Balanced,
}

impl fmt::Display for TacticsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TacticsType::Aggressive => "aggressive",
            TacticsType::Defensive => "defensive",
            TacticsType::Tempo => "tempo",
            TacticsType::Balanced => "balanced",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for TacticsType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aggressive" => Ok(TacticsType::Aggressive),
            "defensive" => Ok(TacticsType::Defensive),
            "tempo" => Ok(TacticsType::Tempo),
            "balanced" => Ok(TacticsType::Balanced),
            _ => Err(format!(
                "invalid tactics '{s}' (expected: aggressive, defensive, tempo, balanced)"
            )),
        }
    }
}
