use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Category of game content an import produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    Species,
    Class,
    Subclass,
    Spell,
    Monster,
    /// Stand-alone batch of class features with no primary document.
    Feature,
}

impl DomainKind {
    pub const ALL: [DomainKind; 6] = [
        Self::Species,
        Self::Class,
        Self::Subclass,
        Self::Spell,
        Self::Monster,
        Self::Feature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::Class => "class",
            Self::Subclass => "subclass",
            Self::Spell => "spell",
            Self::Monster => "monster",
            Self::Feature => "feature",
        }
    }

    /// Human-readable label for status messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Species => "Species",
            Self::Class => "Class",
            Self::Subclass => "Subclass",
            Self::Spell => "Spell",
            Self::Monster => "NPC",
            Self::Feature => "Features",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "species" | "race" => Ok(Self::Species),
            "class" => Ok(Self::Class),
            "subclass" => Ok(Self::Subclass),
            "spell" => Ok(Self::Spell),
            "monster" | "npc" => Ok(Self::Monster),
            "feature" | "features" => Ok(Self::Feature),
            other => Err(DomainError::parse(format!("Unknown import kind: {other}"))),
        }
    }
}
