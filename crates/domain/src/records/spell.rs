use serde::{Deserialize, Serialize};

use super::feature::{DamageEntry, RangeRule, SaveRule, TargetRule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastingTime {
    pub value: u32,
    /// `action`, `bonus`, `reaction`, `minute`, `hour`.
    pub unit: String,
}

impl Default for CastingTime {
    fn default() -> Self {
        Self {
            value: 1,
            unit: "action".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRule {
    pub value: u32,
    /// `inst`, `round`, `minute`, `hour`, `day`, `perm`.
    pub units: String,
}

impl Default for DurationRule {
    fn default() -> Self {
        Self {
            value: 0,
            units: "inst".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpellComponents {
    pub vocal: bool,
    pub somatic: bool,
    pub material: bool,
    /// Material component text; empty when none.
    pub materials: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellRecord {
    pub name: String,
    /// 0 is a cantrip.
    pub level: u8,
    pub school: String,
    pub casting_time: CastingTime,
    pub range: RangeRule,
    pub duration: DurationRule,
    pub components: SpellComponents,
    pub description: String,
    pub damage: Vec<DamageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_scaling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRule>,
}

impl SpellRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 0,
            school: String::new(),
            casting_time: CastingTime::default(),
            range: RangeRule {
                value: None,
                units: "ft".to_string(),
            },
            duration: DurationRule::default(),
            components: SpellComponents::default(),
            description: String::new(),
            damage: Vec::new(),
            damage_scaling: None,
            save: None,
            target: None,
        }
    }
}
