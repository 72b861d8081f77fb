//! Per-domain import strategies.
//!
//! Each domain module owns three steps: the extraction prompt, the response
//! validator, and the document compiler. The functions here dispatch on
//! [`DomainKind`] / [`ValidatedRecord`] so callers never name a domain module.

pub mod class;
pub mod feature;
pub mod monster;
pub mod species;
pub mod spell;
pub mod subclass;

use chronicle_domain::{
    ActivationRule, Activity, ActivityDamage, ActivityKind, AttackProfile, CompiledDocuments,
    DamageEntry, DamagePart, DiceFormula, DomainError, DomainKind, RulesetFlavor,
    ValidatedRecord,
};
use serde_json::Value;

/// Settings the compilers read.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileContext {
    pub ruleset: RulesetFlavor,
}

impl CompileContext {
    pub fn new(ruleset: RulesetFlavor) -> Self {
        Self { ruleset }
    }
}

/// Extraction prompt for `kind` wrapping already-cleaned source text.
pub fn build_prompt(kind: DomainKind, source: &str) -> String {
    match kind {
        DomainKind::Species => species::build_prompt(source),
        DomainKind::Class => class::build_prompt(source),
        DomainKind::Subclass => subclass::build_prompt(source),
        DomainKind::Spell => spell::build_prompt(source),
        DomainKind::Monster => monster::build_prompt(source),
        DomainKind::Feature => feature::build_prompt(source),
    }
}

/// Validate parsed model JSON into the record for `kind`.
pub fn validate(kind: DomainKind, data: &Value) -> Result<ValidatedRecord, DomainError> {
    Ok(match kind {
        DomainKind::Species => ValidatedRecord::Species(species::validate(data)?),
        DomainKind::Class => ValidatedRecord::Class(class::validate(data)?),
        DomainKind::Subclass => ValidatedRecord::Subclass(subclass::validate(data)?),
        DomainKind::Spell => ValidatedRecord::Spell(spell::validate(data)?),
        DomainKind::Monster => ValidatedRecord::Monster(monster::validate(data)?),
        DomainKind::Feature => ValidatedRecord::Feature(feature::validate(data)),
    })
}

/// Compile a validated record into documents. Never fails.
pub fn compile(record: &ValidatedRecord, ctx: &CompileContext) -> CompiledDocuments {
    match record {
        ValidatedRecord::Species(r) => species::compile(r, ctx),
        ValidatedRecord::Class(r) => class::compile(r, ctx),
        ValidatedRecord::Subclass(r) => subclass::compile(r),
        ValidatedRecord::Spell(r) => spell::compile(r),
        ValidatedRecord::Monster(r) => monster::compile(r),
        ValidatedRecord::Feature(r) => feature::compile(r),
    }
}

/// Melee attack with dice parsed out of each damage formula.
///
/// Unreadable formulas roll 1d6; each fallback is recorded in `warnings`.
pub(crate) fn natural_attack(
    name: &str,
    ability: &str,
    parts: &[DamageEntry],
    warnings: &mut Vec<String>,
) -> Activity {
    let mut activity = Activity::new(ActivityKind::Attack, name);
    activity.activation = Some(ActivationRule::action(1));
    activity.attack = Some(AttackProfile {
        ability: ability.to_string(),
        kind: "melee".to_string(),
        classification: "natural".to_string(),
    });
    activity.damage = Some(ActivityDamage {
        include_base: true,
        parts: dice_parts(name, parts, "@mod", warnings),
    });
    activity
}

/// Damage parts with dice split into number and denomination.
pub(crate) fn dice_parts(
    owner: &str,
    entries: &[DamageEntry],
    bonus: &str,
    warnings: &mut Vec<String>,
) -> Vec<DamagePart> {
    entries
        .iter()
        .map(|entry| dice_part(owner, entry, bonus, warnings))
        .collect()
}

fn dice_part(
    owner: &str,
    entry: &DamageEntry,
    bonus: &str,
    warnings: &mut Vec<String>,
) -> DamagePart {
    let (dice, fell_back) = DiceFormula::parse_lenient(&entry.formula);
    if fell_back {
        tracing::warn!(
            owner,
            formula = %entry.formula,
            "Unreadable damage formula, using {}",
            DiceFormula::FALLBACK
        );
        warnings.push(format!(
            "{owner}: damage '{}' could not be read, used {}",
            entry.formula,
            DiceFormula::FALLBACK
        ));
    }
    DamagePart {
        number: Some(dice.dice_count),
        denomination: Some(dice.die_size),
        bonus: bonus.to_string(),
        types: if entry.damage_type.is_empty() {
            Vec::new()
        } else {
            vec![entry.damage_type.clone()]
        },
        formula: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_kind_has_a_prompt_embedding_the_source() {
        for kind in DomainKind::ALL {
            let prompt = build_prompt(kind, "SOURCE-MARKER");
            assert!(prompt.contains("SOURCE-MARKER"), "{kind}");
            assert!(prompt.contains("JSON"), "{kind}");
        }
    }

    #[test]
    fn prompts_are_deterministic() {
        assert_eq!(
            build_prompt(DomainKind::Subclass, "text"),
            build_prompt(DomainKind::Subclass, "text")
        );
    }

    #[test]
    fn every_kind_validates_and_compiles_a_bare_name() {
        let ctx = CompileContext::default();
        for kind in DomainKind::ALL {
            let record = validate(kind, &json!({ "name": "Thing" })).unwrap();
            assert_eq!(record.kind(), kind);
            let compiled = compile(&record, &ctx);
            assert_eq!(compiled.primary.is_some(), kind != DomainKind::Feature);
        }
    }

    #[test]
    fn named_kinds_reject_missing_name() {
        for kind in DomainKind::ALL {
            let result = validate(kind, &json!({ "description": "x" }));
            if kind == DomainKind::Feature {
                assert!(result.is_ok());
            } else {
                assert!(result.unwrap_err().is_missing_field(), "{kind}");
            }
        }
    }

    #[test]
    fn dice_parts_parse_and_fall_back() {
        let mut warnings = Vec::new();
        let activity = natural_attack(
            "Claw",
            "dex",
            &[
                DamageEntry::new("2d8", "slashing"),
                DamageEntry::new("special", "piercing"),
            ],
            &mut warnings,
        );

        let parts = &activity.damage.as_ref().unwrap().parts;
        assert_eq!(parts[0].number, Some(2));
        assert_eq!(parts[0].denomination, Some(8));
        assert_eq!(parts[0].types, vec!["slashing"]);
        assert_eq!(parts[0].bonus, "@mod");
        assert_eq!((parts[1].number, parts[1].denomination), (Some(1), Some(6)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(activity.attack.as_ref().unwrap().ability, "dex");
    }

    #[test]
    fn compile_is_idempotent_apart_from_ids() {
        let record = validate(
            DomainKind::Species,
            &json!({
                "name": "Tabaxi",
                "traits": [
                    { "name": "Darkvision", "description": "See in the dark." },
                    { "name": "Claws", "description": "1d4 slashing damage", "isAttack": true }
                ]
            }),
        )
        .unwrap();
        let ctx = CompileContext::default();

        let strip = |docs: CompiledDocuments| {
            let mut json = serde_json::to_value(docs).unwrap();
            strip_ids(&mut json);
            json
        };

        assert_eq!(strip(compile(&record, &ctx)), strip(compile(&record, &ctx)));
    }

    fn strip_ids(value: &mut Value) {
        match value {
            Value::Object(map) => {
                map.remove("_id");
                map.values_mut().for_each(strip_ids);
            }
            Value::Array(items) => items.iter_mut().for_each(strip_ids),
            _ => {}
        }
    }
}
