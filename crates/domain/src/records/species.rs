use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::feature::DamageEntry;

/// Default size code when none was extracted.
pub const DEFAULT_SIZE: &str = "med";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRule {
    pub value: String,
    pub options: Vec<String>,
}

impl SizeRule {
    pub fn single(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            options: vec![code.clone()],
            value: code,
        }
    }
}

impl Default for SizeRule {
    fn default() -> Self {
        Self::single(DEFAULT_SIZE)
    }
}

/// Speeds in feet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub walk: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fly: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swim: Option<u32>,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            walk: 30,
            climb: None,
            fly: None,
            swim: None,
        }
    }
}

/// Sense ranges in feet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Senses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub darkvision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blindsight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tremorsense: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truesight: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityScoreIncrease {
    /// Player distributes `points` across abilities.
    Flexible { points: u32, pool: Vec<u32> },
    /// Fixed bonuses keyed by ability code.
    Fixed { scores: BTreeMap<String, i32> },
}

impl Default for AbilityScoreIncrease {
    fn default() -> Self {
        Self::Flexible {
            points: 3,
            pool: vec![1, 1, 1],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    pub value: Vec<String>,
    /// Free-text description of an open choice ("one of your choice").
    pub custom: String,
}

impl Default for Languages {
    fn default() -> Self {
        Self {
            value: vec!["common".to_string()],
            custom: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillProficiencies {
    /// Fixed skills granted outright.
    pub skills: Vec<String>,
    /// Open choice size; 0 means no choice.
    pub skill_count: u32,
    /// Trait whose document hosts the choice grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_name: Option<String>,
}

/// Damage for a natural weapon trait.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackDamage {
    /// Attack ability code, `str` unless stated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ability: Option<String>,
    pub parts: Vec<DamageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitDescriptor {
    pub name: String,
    pub description: String,
    pub is_attack: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<AttackDamage>,
}

impl TraitDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub name: String,
    pub description: String,
    pub creature_type: String,
    pub size: SizeRule,
    pub movement: Movement,
    pub senses: Senses,
    pub ability_scores: AbilityScoreIncrease,
    pub traits: Vec<TraitDescriptor>,
    pub languages: Languages,
    pub proficiencies: SkillProficiencies,
}

impl SpeciesRecord {
    /// A record with every field at its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            creature_type: "Humanoid".to_string(),
            size: SizeRule::default(),
            movement: Movement::default(),
            senses: Senses::default(),
            ability_scores: AbilityScoreIncrease::default(),
            traits: Vec::new(),
            languages: Languages::default(),
            proficiencies: SkillProficiencies::default(),
        }
    }

    pub fn trait_named(&self, name: &str) -> Option<&TraitDescriptor> {
        self.traits.iter().find(|t| t.name == name)
    }
}
