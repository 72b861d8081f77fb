//! Validated import records.
//!
//! Every record here has all fields the compiler reads, with defaults
//! already applied. Compiling a record never fails.

mod class;
mod feature;
mod monster;
mod species;
mod spell;

pub use class::{ClassRecord, SkillChoice, SpellListEntry, SubclassRecord, DEFAULT_BASE_CLASS};
pub use feature::{
    ActivationRule, DamageEntry, FeatureBatch, FeatureDescriptor, RangeRule, SaveRule, TargetRule,
    UsesRule,
};
pub use monster::{ArmorClass, HitPointRule, MonsterAction, MonsterRecord};
pub use species::{
    AbilityScoreIncrease, AttackDamage, Languages, Movement, Senses, SizeRule, SkillProficiencies,
    SpeciesRecord, TraitDescriptor, DEFAULT_SIZE,
};
pub use spell::{CastingTime, DurationRule, SpellComponents, SpellRecord};

use serde::Serialize;

use crate::kind::DomainKind;

/// Output of a response validator, one variant per domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum ValidatedRecord {
    Species(SpeciesRecord),
    Class(ClassRecord),
    Subclass(SubclassRecord),
    Spell(SpellRecord),
    Monster(MonsterRecord),
    Feature(FeatureBatch),
}

impl ValidatedRecord {
    pub fn kind(&self) -> DomainKind {
        match self {
            Self::Species(_) => DomainKind::Species,
            Self::Class(_) => DomainKind::Class,
            Self::Subclass(_) => DomainKind::Subclass,
            Self::Spell(_) => DomainKind::Spell,
            Self::Monster(_) => DomainKind::Monster,
            Self::Feature(_) => DomainKind::Feature,
        }
    }

    /// Identifying name; feature batches have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Species(r) => Some(&r.name),
            Self::Class(r) => Some(&r.name),
            Self::Subclass(r) => Some(&r.name),
            Self::Spell(r) => Some(&r.name),
            Self::Monster(r) => Some(&r.name),
            Self::Feature(_) => None,
        }
    }
}
