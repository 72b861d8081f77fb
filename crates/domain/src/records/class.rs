use serde::{Deserialize, Serialize};

use super::feature::FeatureDescriptor;

/// Default base class for subclasses that do not name one.
pub const DEFAULT_BASE_CLASS: &str = "Warlock";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillChoice {
    pub count: u32,
    /// Skill codes the player picks from.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub description: String,
    /// Hit die size (8 for a d8).
    pub hit_die: u32,
    /// Ability codes.
    pub saving_throws: Vec<String>,
    pub skills: SkillChoice,
    pub features: Vec<FeatureDescriptor>,
}

impl ClassRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            hit_die: 8,
            saving_throws: Vec::new(),
            skills: SkillChoice::default(),
            features: Vec::new(),
        }
    }

    pub fn hit_die_label(&self) -> String {
        format!("d{}", self.hit_die)
    }
}

/// Entry in a subclass expanded spell list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellListEntry {
    pub name: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassRecord {
    pub name: String,
    pub base_class: String,
    pub description: String,
    pub features: Vec<FeatureDescriptor>,
    pub spells: Vec<SpellListEntry>,
}

impl SubclassRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_class: DEFAULT_BASE_CLASS.to_string(),
            description: String::new(),
            features: Vec::new(),
            spells: Vec::new(),
        }
    }
}
