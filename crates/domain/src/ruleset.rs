//! Game-system code tables used when compiling grants.
//!
//! The content library stores abilities, skills, saves and sizes as short
//! codes (`skills:prc`, `saves:dex`, `med`). Each ruleset flavor owns its own
//! skill table; abilities and sizes are shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Ability codes in sheet order.
pub const ABILITY_CODES: [&str; 6] = ["str", "dex", "con", "int", "wis", "cha"];

const ABILITY_NAMES: [(&str, &str); 6] = [
    ("strength", "str"),
    ("dexterity", "dex"),
    ("constitution", "con"),
    ("intelligence", "int"),
    ("wisdom", "wis"),
    ("charisma", "cha"),
];

const DND5E_SKILLS: [(&str, &str); 18] = [
    ("acr", "Acrobatics"),
    ("ani", "Animal Handling"),
    ("arc", "Arcana"),
    ("ath", "Athletics"),
    ("dec", "Deception"),
    ("his", "History"),
    ("ins", "Insight"),
    ("itm", "Intimidation"),
    ("inv", "Investigation"),
    ("med", "Medicine"),
    ("nat", "Nature"),
    ("prc", "Perception"),
    ("prf", "Performance"),
    ("per", "Persuasion"),
    ("rel", "Religion"),
    ("slt", "Sleight of Hand"),
    ("ste", "Stealth"),
    ("sur", "Survival"),
];

const PF2E_SKILLS: [(&str, &str); 16] = [
    ("acr", "Acrobatics"),
    ("arc", "Arcana"),
    ("ath", "Athletics"),
    ("cra", "Crafting"),
    ("dec", "Deception"),
    ("dip", "Diplomacy"),
    ("itm", "Intimidation"),
    ("med", "Medicine"),
    ("nat", "Nature"),
    ("occ", "Occultism"),
    ("prf", "Performance"),
    ("rel", "Religion"),
    ("soc", "Society"),
    ("ste", "Stealth"),
    ("sur", "Survival"),
    ("thi", "Thievery"),
];

/// Size labels mapped to library size codes.
const SIZE_CODES: [(&str, &str); 6] = [
    ("tiny", "tiny"),
    ("small", "sm"),
    ("medium", "med"),
    ("large", "lg"),
    ("huge", "huge"),
    ("gargantuan", "grg"),
];

/// Game-system variant whose codes the compiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesetFlavor {
    #[default]
    Dnd5e,
    Pf2e,
    /// Uses the 5e skill table but emits lower-cased full names as codes.
    Generic,
}

impl RulesetFlavor {
    pub fn system_id(&self) -> &'static str {
        match self {
            Self::Dnd5e => "dnd5e",
            Self::Pf2e => "pf2e",
            Self::Generic => "generic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dnd5e => "D&D 5th Edition",
            Self::Pf2e => "Pathfinder 2e",
            Self::Generic => "Generic",
        }
    }

    fn skill_table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Dnd5e | Self::Generic => &DND5E_SKILLS,
            Self::Pf2e => &PF2E_SKILLS,
        }
    }

    /// Every skill as a prefixed trait code (`skills:acr`).
    pub fn skill_pool(&self) -> Vec<String> {
        self.skill_table()
            .iter()
            .map(|(code, name)| self.skill_key(code, name))
            .collect()
    }

    fn skill_key(&self, code: &str, name: &str) -> String {
        match self {
            Self::Generic => format!("skills:{}", name.to_lowercase()),
            _ => format!("skills:{code}"),
        }
    }

    /// Resolve a skill given as a code, a prefixed code, or a display name.
    ///
    /// Returns the prefixed trait key, or `None` for an unknown skill.
    pub fn skill_trait(&self, raw: &str) -> Option<String> {
        let needle = raw.trim().trim_start_matches("skills:").to_lowercase();
        // "perc" is a common model misspelling of the perception code
        let needle = if needle == "perc" { "prc".to_string() } else { needle };
        self.skill_table()
            .iter()
            .find(|(code, name)| *code == needle || name.to_lowercase() == needle)
            .map(|(code, name)| self.skill_key(code, name))
    }

    /// Saving throw trait key for an ability (`saves:dex`).
    pub fn save_trait(&self, raw: &str) -> Option<String> {
        ability_code(raw).map(|code| format!("saves:{code}"))
    }
}

impl fmt::Display for RulesetFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.system_id())
    }
}

impl FromStr for RulesetFlavor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dnd5e" | "5e" => Ok(Self::Dnd5e),
            "pf2e" => Ok(Self::Pf2e),
            "generic" => Ok(Self::Generic),
            other => Err(DomainError::parse(format!("Unknown ruleset flavor: {other}"))),
        }
    }
}

/// Normalize an ability given as a code or full name (`"Dexterity"` -> `"dex"`).
pub fn ability_code(raw: &str) -> Option<&'static str> {
    let needle = raw.trim().to_lowercase();
    ABILITY_CODES
        .iter()
        .copied()
        .find(|code| *code == needle)
        .or_else(|| {
            ABILITY_NAMES
                .iter()
                .find(|(name, _)| *name == needle)
                .map(|(_, code)| *code)
        })
}

/// Normalize a size given as a label or code (`"Small"` -> `"sm"`).
pub fn size_code(raw: &str) -> Option<&'static str> {
    let needle = raw.trim().to_lowercase();
    SIZE_CODES
        .iter()
        .find(|(label, code)| *label == needle || *code == needle)
        .map(|(_, code)| *code)
}
