use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::species::Movement;
use crate::ruleset::ABILITY_CODES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorClass {
    pub value: u32,
    /// `flat`, `natural`, `armor`...
    pub calc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPointRule {
    pub value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

/// Stat-block action, created as an embedded weapon item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAction {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterRecord {
    pub name: String,
    pub description: String,
    /// Size code.
    pub size: String,
    pub creature_type: String,
    pub armor_class: ArmorClass,
    pub hit_points: HitPointRule,
    pub speed: Movement,
    /// Ability scores keyed by ability code.
    pub abilities: BTreeMap<String, i32>,
    pub challenge_rating: f64,
    pub actions: Vec<MonsterAction>,
}

impl MonsterRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            size: "med".to_string(),
            creature_type: "humanoid".to_string(),
            armor_class: ArmorClass {
                value: 10,
                calc: "flat".to_string(),
            },
            hit_points: HitPointRule {
                value: 1,
                formula: None,
            },
            speed: Movement::default(),
            abilities: ABILITY_CODES
                .iter()
                .map(|code| (code.to_string(), 10))
                .collect(),
            challenge_rating: 0.0,
            actions: Vec::new(),
        }
    }
}
