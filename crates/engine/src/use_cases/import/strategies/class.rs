//! Class import.

use chronicle_domain::{
    ability_code, icons, Advancement, AdvancementConfig, ClassRecord, CompiledDocuments,
    DocumentBody, DocumentSpec, DocumentType, DomainError, SkillChoice, TraitConfig,
};
use serde_json::Value;

use super::feature::parse_features;
use super::CompileContext;
use crate::use_cases::import::features::{feature_document, level_grants, FeatureOrigin};
use crate::use_cases::import::json_fields as field;
use crate::use_cases::import::text::{dashed_identifier, html_paragraphs};

const INSTRUCTIONS: &str = r#"You are extracting a character class for a tabletop RPG content library.
Answer with ONE JSON object, nothing else.

JSON shape:
{
  "name": "Class Name",
  "description": "Class flavor text.",
  "hitDie": "d8",
  "savingThrows": ["dex", "int"],
  "skills": { "count": 2, "options": ["acr", "ste", "prc"] },
  "features": [
    { "name": "Feature Name", "description": "Full feature text.", "level": 1 }
  ]
}

Rules:
1. List every class feature in the text together with the level it is gained at.
2. "hitDie" is one of d6, d8, d10, d12.
3. Saving throws use ability codes: str, dex, con, int, wis, cha.
4. Skill codes: acr, ani, arc, ath, dec, his, ins, itm, inv, med, nat, prc, prf, per, rel, slt, ste, sur.
5. A feature gained again at a higher level is listed once, at its first level.

Example source:
Rangers wander the wilds. Hit Dice: 1d10 per ranger level. Saving Throws: Strength, Dexterity.
Skills: Choose three from Animal Handling, Athletics, Insight, Investigation, Nature, Perception, Stealth, and Survival.
1st level: Favored Enemy. You have significant experience studying one type of enemy.
2nd level: Fighting Style. You adopt a particular style of fighting.

Example answer:
{"name":"Ranger","description":"Rangers wander the wilds.","hitDie":"d10","savingThrows":["str","dex"],"skills":{"count":3,"options":["ani","ath","ins","inv","nat","prc","ste","sur"]},"features":[{"name":"Favored Enemy","description":"You have significant experience studying one type of enemy.","level":1},{"name":"Fighting Style","description":"You adopt a particular style of fighting.","level":2}]}"#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

pub fn validate(data: &Value) -> Result<ClassRecord, DomainError> {
    let name = field::string(data, "name").ok_or(DomainError::missing("name"))?;
    let mut record = ClassRecord::named(name);

    record.description = field::string_or_empty(data, "description");
    if let Some(die) = data.get("hitDie").and_then(hit_die) {
        record.hit_die = die;
    }
    record.saving_throws = field::string_list(data, "savingThrows")
        .iter()
        .filter_map(|s| ability_code(s))
        .map(str::to_string)
        .collect();
    if let Some(skills) = data.get("skills") {
        record.skills = SkillChoice {
            count: field::uint(skills, "count").unwrap_or(0),
            options: field::string_list(skills, "options")
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        };
    }
    record.features = parse_features(field::array(data, "features"), 1);
    Ok(record)
}

/// `"d10"`, `"1d10"` and `10` all read as 10.
fn hit_die(raw: &Value) -> Option<u32> {
    let die = match raw {
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            let size = s.split_once('d').map_or(s.as_str(), |(_, size)| size);
            size.trim().parse().ok()
        }
        other => field::as_uint(other),
    }?;
    (die >= 2).then_some(die)
}

pub fn compile(record: &ClassRecord, ctx: &CompileContext) -> CompiledDocuments {
    let origin = FeatureOrigin::owned_by(format!("{} Class Feature", record.name), &record.name);
    let auxiliaries = record
        .features
        .iter()
        .map(|f| feature_document(f, &origin))
        .collect();

    let mut advancement = level_grants(
        record.features.iter().map(|f| (f.name.as_str(), f.level)),
        "Class Features",
    );
    advancement.push(
        Advancement::new(
            1,
            AdvancementConfig::HitPoints {
                denomination: record.hit_die,
            },
        )
        .with_title("Hit Points"),
    );

    let saves: Vec<String> = record
        .saving_throws
        .iter()
        .filter_map(|s| ctx.ruleset.save_trait(s))
        .collect();
    if !saves.is_empty() {
        advancement.push(
            Advancement::new(1, AdvancementConfig::Trait(TraitConfig::grants(saves)))
                .with_title("Saving Throws"),
        );
    }

    if record.skills.count > 0 {
        let pool = if record.skills.options.is_empty() {
            ctx.ruleset.skill_pool()
        } else {
            record
                .skills
                .options
                .iter()
                .map(|s| {
                    ctx.ruleset
                        .skill_trait(s)
                        .unwrap_or_else(|| format!("skills:{s}"))
                })
                .collect()
        };
        advancement.push(
            Advancement::new(
                1,
                AdvancementConfig::Trait(TraitConfig::choice(record.skills.count, pool, false)),
            )
            .with_title("Skills")
            .with_hint(format!("Choose {} skills", record.skills.count)),
        );
    }

    let mut class = DocumentSpec::new(
        &record.name,
        DocumentType::Class,
        icons::MYSTERY_MAN,
        DocumentBody::Class {
            identifier: dashed_identifier(&record.name),
            hit_dice: record.hit_die_label(),
        },
    )
    .with_description(html_paragraphs(&record.description));
    class.advancement = advancement;

    CompiledDocuments {
        primary: Some(class),
        auxiliaries,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::RulesetFlavor;
    use serde_json::json;

    fn ranger() -> ClassRecord {
        validate(&json!({
            "name": "Ranger",
            "hitDie": "1d10",
            "savingThrows": ["Strength", "dex"],
            "skills": { "count": 3, "options": ["ani", "perc", "Stealth"] },
            "features": [
                { "name": "Fighting Style", "description": "Style.", "level": 2 },
                { "name": "Favored Enemy", "description": "Enemy.", "level": 1 },
                { "name": "Natural Explorer", "description": "Explorer.", "level": 1 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn hit_die_forms() {
        assert_eq!(hit_die(&json!("d10")), Some(10));
        assert_eq!(hit_die(&json!("1d12")), Some(12));
        assert_eq!(hit_die(&json!(6)), Some(6));
        assert_eq!(hit_die(&json!("big")), None);
        assert_eq!(validate(&json!({ "name": "Commoner" })).unwrap().hit_die, 8);
    }

    #[test]
    fn validate_normalizes_saves_and_sorts_features() {
        let record = ranger();
        assert_eq!(record.hit_die, 10);
        assert_eq!(record.saving_throws, vec!["str", "dex"]);
        let names: Vec<_> = record.features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Favored Enemy", "Natural Explorer", "Fighting Style"]);
    }

    #[test]
    fn compile_builds_class_grants() {
        let compiled = compile(&ranger(), &CompileContext::new(RulesetFlavor::Dnd5e));
        let class = compiled.primary.unwrap();

        assert!(matches!(
            class.system,
            DocumentBody::Class { ref hit_dice, .. } if hit_dice == "d10"
        ));

        let grants: Vec<_> = class.advancement_of("ItemGrant").collect();
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].title.as_deref(), Some("Class Features"));
        assert_eq!(
            grants[0].item_grant().unwrap().pending,
            vec!["Favored Enemy", "Natural Explorer"]
        );

        let hp = class.advancement_of("HitPoints").next().unwrap();
        assert_eq!(hp.config, AdvancementConfig::HitPoints { denomination: 10 });

        let traits: Vec<_> = class.advancement_of("Trait").collect();
        assert_eq!(
            traits[0].trait_config().unwrap().grants,
            vec!["saves:str", "saves:dex"]
        );
        let skills = traits[1].trait_config().unwrap();
        assert!(!skills.allow_replacements);
        assert_eq!(
            skills.choices[0].pool,
            vec!["skills:ani", "skills:prc", "skills:ste"]
        );
        assert_eq!(traits[1].hint.as_deref(), Some("Choose 3 skills"));

        assert_eq!(compiled.auxiliaries.len(), 3);
        assert!(matches!(
            compiled.auxiliaries[2].system,
            DocumentBody::Feat { ref source, ref requirements, .. }
                if source == "Ranger Class Feature" && requirements == "Ranger 2"
        ));
    }
}
