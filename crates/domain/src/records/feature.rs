//! Feature descriptors shared by the class, subclass and feature imports.

use serde::{Deserialize, Serialize};

/// How a feature is used: `action`, `bonus`, `reaction`, `minute`...
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl ActivationRule {
    pub fn action(cost: u32) -> Self {
        Self {
            kind: "action".to_string(),
            cost: Some(cost),
            condition: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.condition.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    pub units: String,
}

impl RangeRule {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.units.is_empty()
    }
}

/// Area or creature target as the model reported it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    pub units: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TargetRule {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.units.is_empty() && self.kind.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRule {
    /// Ability code (`dex`).
    pub ability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc: Option<u32>,
    /// DC calculation source, `spell` unless stated.
    pub scaling: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsesRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    pub max: String,
    /// Recovery period: `sr`, `lr`, `day`...
    pub per: String,
}

impl UsesRule {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.max.is_empty() && self.per.is_empty()
    }
}

/// One damage roll as extracted: a formula string and a damage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEntry {
    pub formula: String,
    pub damage_type: String,
}

impl DamageEntry {
    pub fn new(formula: impl Into<String>, damage_type: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            damage_type: damage_type.into(),
        }
    }
}

/// A level-gated class or subclass feature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    pub name: String,
    pub description: String,
    /// Level 0 means the feature applies unconditionally.
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub damage: Vec<DamageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<UsesRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

impl FeatureDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            level,
            ..Self::default()
        }
    }

    /// Description length in characters, used to pick the richer duplicate.
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }
}

/// Result of a feature-only import.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureBatch {
    pub features: Vec<FeatureDescriptor>,
}
