//! Chronicle Keeper domain types.
//!
//! Pure data for the import pipeline: domain kinds, validated records,
//! grant records, and the document specs the compiler emits. No I/O.

pub mod advancement;
pub mod dice;
pub mod document;
pub mod error;
pub mod ids;
pub mod kind;
pub mod records;
pub mod ruleset;

pub use advancement::{
    AbilityScoreConfig, Advancement, AdvancementConfig, ItemGrantConfig, TraitChoice, TraitConfig,
};
pub use dice::{DiceFormula, DiceParseError};
pub use document::{
    icons, ActiveEffect, Activity, ActivityDamage, ActivityKind, ActivityTarget, AttackProfile,
    CompiledDocuments, DamagePart, DocumentBody, DocumentSpec, DocumentType, Materials,
    SaveProfile,
};
pub use error::DomainError;
pub use ids::{ActivityId, AdvancementId, DocumentId, DocumentRef, EffectId, FolderId};
pub use kind::DomainKind;
pub use records::{
    AbilityScoreIncrease, ActivationRule, ArmorClass, AttackDamage, CastingTime, ClassRecord,
    DamageEntry, DurationRule, FeatureBatch, FeatureDescriptor, HitPointRule, Languages,
    MonsterAction, MonsterRecord, Movement, RangeRule, SaveRule, Senses, SizeRule, SkillChoice,
    SkillProficiencies, SpeciesRecord, SpellComponents, SpellListEntry, SpellRecord,
    SubclassRecord, TargetRule, TraitDescriptor, UsesRule, ValidatedRecord, DEFAULT_BASE_CLASS,
    DEFAULT_SIZE,
};
pub use ruleset::{ability_code, size_code, RulesetFlavor, ABILITY_CODES};
