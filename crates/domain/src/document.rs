//! Document specs produced by the compiler and persisted by the library.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::advancement::Advancement;
use crate::ids::{ActivityId, EffectId};
use crate::records::{
    ActivationRule, DurationRule, Movement, RangeRule, Senses, TargetRule, UsesRule,
};

/// Stock icon paths in the content library.
pub mod icons {
    pub const MYSTERY_MAN: &str = "icons/svg/mystery-man.svg";
    pub const UPGRADE: &str = "icons/svg/upgrade.svg";
    pub const NATURAL_WEAPON: &str = "icons/skills/melee/strike-sword-steel-yellow.webp";
    pub const BOOK: &str = "icons/svg/book.svg";
    pub const AURA: &str = "icons/svg/aura.svg";
    pub const SPELL: &str = "icons/svg/daze.svg";
    pub const WEAPON: &str = "icons/svg/sword.svg";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Race,
    Class,
    Subclass,
    Spell,
    Feat,
    Weapon,
    Npc,
}

impl DocumentType {
    /// Library document class: actors for NPCs, items for everything else.
    pub fn document_class(&self) -> &'static str {
        match self {
            Self::Npc => "Actor",
            _ => "Item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Materials {
    pub value: String,
    pub consumed: bool,
    pub cost: u32,
}

/// Type-specific payload of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocumentBody {
    #[serde(rename_all = "camelCase")]
    Race {
        identifier: String,
        creature_type: String,
        movement: Movement,
        senses: Senses,
    },
    #[serde(rename_all = "camelCase")]
    Class { identifier: String, hit_dice: String },
    #[serde(rename_all = "camelCase")]
    Subclass {
        identifier: String,
        class_identifier: String,
    },
    #[serde(rename_all = "camelCase")]
    Spell {
        level: u8,
        school: String,
        activation: ActivationRule,
        duration: DurationRule,
        range: RangeRule,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<TargetRule>,
        properties: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        materials: Option<Materials>,
    },
    #[serde(rename_all = "camelCase")]
    Feat {
        /// `race` for species traits, `class` for class features.
        feat_type: String,
        source: String,
        requirements: String,
        /// Limited uses with their recovery period.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uses: Option<UsesRule>,
    },
    Weapon {},
    #[serde(rename_all = "camelCase")]
    Npc {
        armor_class: u32,
        armor_calc: String,
        hit_points: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hit_point_formula: Option<String>,
        speed: Movement,
        abilities: BTreeMap<String, i32>,
        challenge_rating: f64,
        creature_type: String,
        size: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Attack,
    Save,
    Damage,
    Utility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityTarget {
    /// Area template (cone, sphere...).
    Template {
        shape: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
        units: String,
    },
    /// Affected creatures or objects.
    Affects {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Attack ability code.
    pub ability: String,
    /// `melee` or `ranged`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `natural`, `weapon`, `spell`.
    pub classification: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfile {
    pub abilities: Vec<String>,
    pub dc_calculation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc_formula: Option<String>,
}

/// One damage roll on an activity.
///
/// Either `number`/`denomination` (parsed dice) or `formula` (free formula
/// kept verbatim) is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination: Option<u32>,
    pub bonus: String,
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDamage {
    pub include_base: bool,
    pub parts: Vec<DamagePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ActivityTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<ActivityDamage>,
}

impl Activity {
    pub fn new(kind: ActivityKind, name: impl Into<String>) -> Self {
        Self {
            id: ActivityId::new().short_key(),
            kind,
            name: name.into(),
            activation: None,
            range: None,
            target: None,
            attack: None,
            save: None,
            damage: None,
        }
    }
}

/// Status condition applied by a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub icon: String,
    pub transfer: bool,
    pub statuses: Vec<String>,
    pub description: String,
}

impl ActiveEffect {
    pub fn condition(name: &str) -> Self {
        Self {
            id: EffectId::new().short_key(),
            name: name.to_string(),
            icon: icons::AURA.to_string(),
            transfer: false,
            statuses: vec![name.to_lowercase()],
            description: format!("Applies {name} condition."),
        }
    }
}

/// A document ready to be written to the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub img: String,
    /// Folder name inside the target collection; `None` files at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// HTML description.
    pub description: String,
    pub system: DocumentBody,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advancement: Vec<Advancement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<ActiveEffect>,
    /// Items owned by this document (actions on an NPC).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedded: Vec<DocumentSpec>,
}

impl DocumentSpec {
    pub fn new(
        name: impl Into<String>,
        doc_type: DocumentType,
        img: impl Into<String>,
        system: DocumentBody,
    ) -> Self {
        Self {
            name: name.into(),
            doc_type,
            img: img.into(),
            folder: None,
            description: String::new(),
            system,
            advancement: Vec::new(),
            activities: Vec::new(),
            effects: Vec::new(),
            embedded: Vec::new(),
        }
    }

    pub fn with_description(mut self, html: impl Into<String>) -> Self {
        self.description = html.into();
        self
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn advancement_of(&self, kind_name: &str) -> impl Iterator<Item = &Advancement> {
        let kind_name = kind_name.to_string();
        self.advancement
            .iter()
            .filter(move |adv| adv.kind_name() == kind_name)
    }
}

/// Compiler output: the primary document plus its auxiliaries.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CompiledDocuments {
    /// `None` only for feature-only imports.
    pub primary: Option<DocumentSpec>,
    pub auxiliaries: Vec<DocumentSpec>,
    /// Recoveries applied while compiling (fallback dice and the like).
    pub warnings: Vec<String>,
}
