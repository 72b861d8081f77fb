//! Advancement (grant) records attached to documents.
//!
//! A grant says what a document unlocks and at which level. Item grants
//! start out holding feature names in `pending`; the linker moves each name
//! into `items` once it resolves to a document reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AdvancementId, DocumentRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitChoice {
    pub count: u32,
    /// Trait keys to choose from; empty means "any".
    pub pool: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitConfig {
    pub mode: String,
    pub allow_replacements: bool,
    pub grants: Vec<String>,
    pub choices: Vec<TraitChoice>,
}

impl TraitConfig {
    pub fn grants(grants: Vec<String>) -> Self {
        Self {
            mode: "default".to_string(),
            allow_replacements: false,
            grants,
            choices: Vec::new(),
        }
    }

    pub fn choice(count: u32, pool: Vec<String>, allow_replacements: bool) -> Self {
        Self {
            mode: "default".to_string(),
            allow_replacements,
            grants: Vec::new(),
            choices: vec![TraitChoice { count, pool }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScoreConfig {
    pub points: u32,
    pub cap: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fixed: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemGrantConfig {
    pub items: Vec<DocumentRef>,
    /// Names not yet resolved to a reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "configuration")]
pub enum AdvancementConfig {
    Size { sizes: Vec<String> },
    AbilityScoreImprovement(AbilityScoreConfig),
    Trait(TraitConfig),
    ItemGrant(ItemGrantConfig),
    HitPoints { denomination: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advancement {
    #[serde(rename = "_id")]
    pub id: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub config: AdvancementConfig,
}

impl Advancement {
    pub fn new(level: u32, config: AdvancementConfig) -> Self {
        Self {
            id: AdvancementId::new().short_key(),
            level,
            title: None,
            hint: None,
            config,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Item grant waiting on the linker to resolve `names`.
    pub fn pending_items(level: u32, title: impl Into<String>, names: Vec<String>) -> Self {
        Self::new(
            level,
            AdvancementConfig::ItemGrant(ItemGrantConfig {
                items: Vec::new(),
                pending: names,
            }),
        )
        .with_title(title)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.config {
            AdvancementConfig::Size { .. } => "Size",
            AdvancementConfig::AbilityScoreImprovement(_) => "AbilityScoreImprovement",
            AdvancementConfig::Trait(_) => "Trait",
            AdvancementConfig::ItemGrant(_) => "ItemGrant",
            AdvancementConfig::HitPoints { .. } => "HitPoints",
        }
    }

    pub fn item_grant(&self) -> Option<&ItemGrantConfig> {
        match &self.config {
            AdvancementConfig::ItemGrant(config) => Some(config),
            _ => None,
        }
    }

    pub fn item_grant_mut(&mut self) -> Option<&mut ItemGrantConfig> {
        match &mut self.config {
            AdvancementConfig::ItemGrant(config) => Some(config),
            _ => None,
        }
    }

    pub fn trait_config(&self) -> Option<&TraitConfig> {
        match &self.config {
            AdvancementConfig::Trait(config) => Some(config),
            _ => None,
        }
    }
}
