//! Species (race) import.

use std::collections::{BTreeMap, HashSet};

use chronicle_domain::{
    ability_code, icons, size_code, AbilityScoreConfig, AbilityScoreIncrease, Advancement,
    AdvancementConfig, AttackDamage, CompiledDocuments, DamageEntry, DocumentBody, DocumentSpec,
    DocumentType, DomainError, Languages, Movement, Senses, SizeRule, SkillProficiencies,
    SpeciesRecord, TraitChoice, TraitConfig, TraitDescriptor, DEFAULT_SIZE,
};
use serde_json::Value;

use super::feature::damage_entries;
use super::{natural_attack, CompileContext};
use crate::use_cases::import::dedupe::dedupe_traits;
use crate::use_cases::import::json_fields as field;
use crate::use_cases::import::safety_net::{damage_from_prose, scan_skill_choice};
use crate::use_cases::import::text::{dashed_identifier, html_paragraphs};

const INSTRUCTIONS: &str = r#"You are extracting a playable species (race) for a tabletop RPG content library.
Read the source text and answer with ONE JSON object, nothing else.

JSON shape:
{
  "name": "Species Name",
  "description": "Flavor text about the species.",
  "creatureType": "Humanoid",
  "size": { "value": "med", "options": ["sm", "med"] },
  "movement": { "walk": 30, "climb": 0, "fly": 0, "swim": 0 },
  "senses": { "darkvision": 0, "blindsight": 0, "tremorsense": 0, "truesight": 0 },
  "abilityScoreIncrease": { "type": "flexible", "options": { "increases": 3, "pool": [1, 1, 1] } },
  "traits": [
    {
      "name": "Trait Name",
      "description": "The full trait text.",
      "isAttack": false,
      "damage": { "base": "str", "parts": [["1d4", "slashing"]] }
    }
  ],
  "languages": { "value": ["common"], "custom": "" },
  "proficiencies": { "skills": [], "skillCount": 0, "traitName": "" }
}

Rules:
1. Every bolded or emphasized header in the text is a trait. Keep all of them, including odd ones like "Mimicry".
2. Use the header text exactly as the trait name.
3. Set "isAttack" to true only for natural weapons (claws, bite, horns, talons) and fill "damage" from the text.
4. Sizes use codes: tiny, sm, med, lg, huge, grg.
5. If a trait lets the player choose skills ("choose two skills", "proficiency in one skill of your choice"),
   set "skillCount" to that number, set "traitName" to that trait's name, and leave "skills" empty.
6. Put skills granted outright (no choice) in "skills" as codes like "prc" or "ste".
7. Languages the player picks freely go in "custom" as a short phrase ("one extra language of your choice").

Example source:
**Tabaxi** Tabaxi are catlike humanoids. Medium size. Speed 30 ft, climb 20 ft.
**Darkvision.** You can see in dim light within 60 feet of you.
**Cat's Claws.** Your claws are natural weapons that deal 1d4 slashing damage.
**Cat's Talent.** You have proficiency in the Perception and Stealth skills.

Example answer:
{"name":"Tabaxi","description":"Tabaxi are catlike humanoids.","creatureType":"Humanoid","size":{"value":"med","options":["med"]},"movement":{"walk":30,"climb":20},"senses":{"darkvision":60},"abilityScoreIncrease":{"type":"flexible","options":{"increases":3,"pool":[1,1,1]}},"traits":[{"name":"Darkvision","description":"You can see in dim light within 60 feet of you.","isAttack":false},{"name":"Cat's Claws","description":"Your claws are natural weapons that deal 1d4 slashing damage.","isAttack":true,"damage":{"base":"str","parts":[["1d4","slashing"]]}},{"name":"Cat's Talent","description":"You have proficiency in the Perception and Stealth skills.","isAttack":false}],"languages":{"value":["common"],"custom":""},"proficiencies":{"skills":["prc","ste"],"skillCount":0,"traitName":""}}"#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

pub fn validate(data: &Value) -> Result<SpeciesRecord, DomainError> {
    let name = field::string(data, "name").ok_or(DomainError::missing("name"))?;
    let mut record = SpeciesRecord::named(name);

    record.description = field::string_or_empty(data, "description");
    if let Some(creature_type) = field::string(data, "creatureType") {
        record.creature_type = creature_type;
    }
    record.size = size_rule(data.get("size"));
    record.movement = movement(data.get("movement"));
    record.senses = senses(data.get("senses"));
    if let Some(asi) = data.get("abilityScoreIncrease").and_then(ability_scores) {
        record.ability_scores = asi;
    }
    record.traits = dedupe_traits(
        field::array(data, "traits")
            .iter()
            .filter_map(trait_descriptor)
            .collect(),
    );
    record.languages = languages(data.get("languages"));
    record.proficiencies = proficiencies(data.get("proficiencies"));

    if let Some(trait_name) = record.proficiencies.trait_name.as_deref() {
        if record.trait_named(trait_name).is_none() {
            tracing::warn!(
                species = %record.name,
                trait_name,
                "Skill choice names a trait that was not extracted; granting on the species"
            );
            record.proficiencies.trait_name = None;
        }
    }

    if record.proficiencies.skill_count == 0 {
        if let Some(hit) = scan_skill_choice(&record.traits) {
            tracing::info!(
                species = %record.name,
                count = hit.count,
                trait_name = %hit.trait_name,
                "Safety net found a skill choice in trait text"
            );
            record.proficiencies.skill_count = hit.count;
            record.proficiencies.trait_name = Some(hit.trait_name);
        }
    }

    Ok(record)
}

fn size_rule(raw: Option<&Value>) -> SizeRule {
    let code = |s: &str| size_code(s).unwrap_or(DEFAULT_SIZE).to_string();
    match raw {
        Some(Value::String(label)) => SizeRule::single(code(label)),
        Some(obj @ Value::Object(_)) => {
            let value = field::string(obj, "value")
                .map(|v| code(&v))
                .unwrap_or_else(|| DEFAULT_SIZE.to_string());
            let mut options: Vec<String> = field::string_list(obj, "options")
                .iter()
                .filter_map(|o| size_code(o))
                .map(str::to_string)
                .collect();
            let mut seen = HashSet::new();
            options.retain(|o| seen.insert(o.clone()));
            if options.is_empty() {
                options.push(value.clone());
            }
            SizeRule { value, options }
        }
        _ => SizeRule::default(),
    }
}

pub(super) fn movement(raw: Option<&Value>) -> Movement {
    let mut movement = Movement::default();
    match raw {
        Some(obj @ Value::Object(_)) => {
            movement.walk = field::uint(obj, "walk").filter(|w| *w > 0).unwrap_or(30);
            movement.climb = field::uint(obj, "climb").filter(|v| *v > 0);
            movement.fly = field::uint(obj, "fly").filter(|v| *v > 0);
            movement.swim = field::uint(obj, "swim").filter(|v| *v > 0);
        }
        Some(other) => {
            if let Some(walk) = field::as_uint(other).filter(|w| *w > 0) {
                movement.walk = walk;
            }
        }
        None => {}
    }
    movement
}

fn senses(raw: Option<&Value>) -> Senses {
    let Some(raw) = raw else {
        return Senses::default();
    };
    let range = |key: &str| field::uint(raw, key).filter(|v| *v > 0);
    Senses {
        darkvision: range("darkvision"),
        blindsight: range("blindsight"),
        tremorsense: range("tremorsense"),
        truesight: range("truesight"),
    }
}

fn ability_scores(raw: &Value) -> Option<AbilityScoreIncrease> {
    let is_fixed = field::string(raw, "type").is_some_and(|t| t.eq_ignore_ascii_case("fixed"));
    if is_fixed {
        let source = field::object(raw, "scores").or_else(|| field::object(raw, "options"))?;
        let scores: BTreeMap<String, i32> = source
            .iter()
            .filter_map(|(key, value)| {
                let code = ability_code(key)?;
                let bonus = match value {
                    Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
                    Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
                    _ => None,
                }?;
                Some((code.to_string(), bonus))
            })
            .collect();
        return (!scores.is_empty()).then_some(AbilityScoreIncrease::Fixed { scores });
    }

    let options = raw.get("options").unwrap_or(raw);
    let points = field::uint(options, "increases")
        .or_else(|| field::uint(options, "points"))
        .filter(|p| *p > 0)
        .unwrap_or(3);
    let pool: Vec<u32> = field::array(options, "pool")
        .iter()
        .filter_map(field::as_uint)
        .collect();
    Some(AbilityScoreIncrease::Flexible {
        points,
        pool: if pool.is_empty() { vec![1, 1, 1] } else { pool },
    })
}

fn trait_descriptor(raw: &Value) -> Option<TraitDescriptor> {
    let name = field::string(raw, "name")?;
    let mut descriptor = TraitDescriptor::new(name, field::string_or_empty(raw, "description"));
    descriptor.is_attack = field::boolean(raw, "isAttack");
    if !descriptor.is_attack {
        return Some(descriptor);
    }

    let mut damage = raw.get("damage").map(attack_damage).unwrap_or_default();
    if damage.parts.is_empty() {
        if let Some(entry) = damage_from_prose(&descriptor.description) {
            tracing::debug!(name = %descriptor.name, formula = %entry.formula, "Damage read from trait text");
            damage.parts.push(entry);
        }
    }
    descriptor.damage = Some(damage);
    Some(descriptor)
}

fn attack_damage(raw: &Value) -> AttackDamage {
    AttackDamage {
        ability: field::string(raw, "base").and_then(|b| ability_code(&b).map(str::to_string)),
        parts: damage_entries(raw.get("parts")),
    }
}

fn languages(raw: Option<&Value>) -> Languages {
    match raw {
        Some(list @ (Value::Array(_) | Value::String(_))) => Languages {
            value: field::as_string_list(list)
                .into_iter()
                .map(|l| l.to_lowercase())
                .collect(),
            custom: String::new(),
        },
        Some(obj @ Value::Object(_)) => Languages {
            value: field::string_list(obj, "value"),
            custom: field::string_or_empty(obj, "custom"),
        },
        _ => Languages::default(),
    }
}

fn proficiencies(raw: Option<&Value>) -> SkillProficiencies {
    let Some(raw) = raw else {
        return SkillProficiencies::default();
    };
    SkillProficiencies {
        skills: field::string_list(raw, "skills"),
        skill_count: field::uint(raw, "skillCount").unwrap_or(0),
        trait_name: field::string(raw, "traitName"),
    }
}

pub fn compile(record: &SpeciesRecord, ctx: &CompileContext) -> CompiledDocuments {
    let mut warnings = Vec::new();
    let choice = &record.proficiencies;
    let housing_trait = choice
        .trait_name
        .as_deref()
        .filter(|_| choice.skill_count > 0);

    let auxiliaries = record
        .traits
        .iter()
        .map(|t| {
            let mut doc = trait_document(record, t, &mut warnings);
            if housing_trait == Some(t.name.as_str()) {
                doc.advancement.push(skill_choice(choice.skill_count, ctx, true));
            }
            doc
        })
        .collect();

    let mut species = DocumentSpec::new(
        &record.name,
        DocumentType::Race,
        icons::MYSTERY_MAN,
        DocumentBody::Race {
            identifier: dashed_identifier(&record.name),
            creature_type: record.creature_type.to_lowercase(),
            movement: record.movement.clone(),
            senses: record.senses.clone(),
        },
    )
    .with_description(html_paragraphs(&record.description));

    species.advancement = species_advancement(record, ctx, housing_trait.is_some());

    CompiledDocuments {
        primary: Some(species),
        auxiliaries,
        warnings,
    }
}

fn trait_document(
    record: &SpeciesRecord,
    descriptor: &TraitDescriptor,
    warnings: &mut Vec<String>,
) -> DocumentSpec {
    let img = if descriptor.is_attack {
        icons::NATURAL_WEAPON
    } else {
        icons::UPGRADE
    };
    let mut doc = DocumentSpec::new(
        &descriptor.name,
        DocumentType::Feat,
        img,
        DocumentBody::Feat {
            feat_type: "race".to_string(),
            source: format!("{} Trait", record.name),
            requirements: String::new(),
            uses: None,
        },
    )
    .with_description(html_paragraphs(&descriptor.description));

    if let Some(damage) = descriptor.damage.as_ref().filter(|d| !d.parts.is_empty()) {
        let ability = damage.ability.as_deref().unwrap_or("str");
        doc.activities
            .push(natural_attack(&descriptor.name, ability, &damage.parts, warnings));
    }
    doc
}

fn skill_choice(count: u32, ctx: &CompileContext, allow_replacements: bool) -> Advancement {
    Advancement::new(
        0,
        AdvancementConfig::Trait(TraitConfig::choice(
            count,
            ctx.ruleset.skill_pool(),
            allow_replacements,
        )),
    )
    .with_title("Skills")
    .with_hint(format!("Choose any {count} skill proficiencies"))
}

fn species_advancement(
    record: &SpeciesRecord,
    ctx: &CompileContext,
    choice_on_trait: bool,
) -> Vec<Advancement> {
    let mut advancement = vec![Advancement::new(
        0,
        AdvancementConfig::Size {
            sizes: record.size.options.clone(),
        },
    )];

    let asi = match &record.ability_scores {
        AbilityScoreIncrease::Flexible { points, .. } => AbilityScoreConfig {
            points: *points,
            cap: 2,
            fixed: BTreeMap::new(),
        },
        AbilityScoreIncrease::Fixed { scores } => AbilityScoreConfig {
            points: 0,
            cap: 2,
            fixed: scores.clone(),
        },
    };
    advancement.push(Advancement::new(
        0,
        AdvancementConfig::AbilityScoreImprovement(asi),
    ));

    let mut languages = TraitConfig::grants(record.languages.value.clone());
    if !record.languages.custom.is_empty() {
        languages.choices.push(TraitChoice {
            count: 1,
            pool: Vec::new(),
        });
    }
    let mut language_grant =
        Advancement::new(0, AdvancementConfig::Trait(languages)).with_title("Languages");
    if !record.languages.custom.is_empty() {
        language_grant = language_grant.with_hint(&record.languages.custom);
    }
    advancement.push(language_grant);

    advancement.extend(
        record
            .traits
            .iter()
            .map(|t| Advancement::pending_items(0, &t.name, vec![t.name.clone()])),
    );

    let fixed: Vec<String> = record
        .proficiencies
        .skills
        .iter()
        .map(|raw| {
            ctx.ruleset.skill_trait(raw).unwrap_or_else(|| {
                tracing::warn!(skill = %raw, ruleset = %ctx.ruleset, "Unknown skill kept as written");
                raw.to_lowercase()
            })
        })
        .collect();
    if !fixed.is_empty() {
        advancement.push(
            Advancement::new(0, AdvancementConfig::Trait(TraitConfig::grants(fixed)))
                .with_title("Skill Proficiency"),
        );
    }

    if record.proficiencies.skill_count > 0 && !choice_on_trait {
        advancement.push(skill_choice(record.proficiencies.skill_count, ctx, true));
    }

    advancement
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::{ActivityKind, RulesetFlavor};
    use serde_json::json;

    fn ctx() -> CompileContext {
        CompileContext::new(RulesetFlavor::Dnd5e)
    }

    #[test]
    fn name_is_required() {
        let err = validate(&json!({ "description": "no name" })).unwrap_err();
        assert!(err.is_missing_field());
        assert!(validate(&json!({ "name": "   " })).is_err());
    }

    #[test]
    fn defaults_fill_a_bare_record() {
        let record = validate(&json!({ "name": "Goblin" })).unwrap();

        assert_eq!(record.creature_type, "Humanoid");
        assert_eq!(record.size, SizeRule::single("med"));
        assert_eq!(record.movement.walk, 30);
        assert_eq!(record.languages.value, vec!["common"]);
        assert_eq!(record.ability_scores, AbilityScoreIncrease::default());
        assert!(record.traits.is_empty());
        assert_eq!(record.proficiencies.skill_count, 0);
    }

    #[test]
    fn legacy_size_strings_and_language_lists() {
        let record = validate(&json!({
            "name": "Halfling",
            "size": "Small",
            "movement": { "walk": 0, "swim": "25 ft" },
            "languages": ["Common", "Halfling"]
        }))
        .unwrap();

        assert_eq!(record.size, SizeRule::single("sm"));
        assert_eq!(record.movement.walk, 30);
        assert_eq!(record.movement.swim, Some(25));
        assert_eq!(record.languages.value, vec!["common", "halfling"]);
        assert_eq!(record.languages.custom, "");

        let unknown = validate(&json!({ "name": "Titan", "size": "Colossal" })).unwrap();
        assert_eq!(unknown.size.value, "med");
    }

    #[test]
    fn size_object_without_options_uses_value() {
        let record =
            validate(&json!({ "name": "Orc", "size": { "value": "Medium", "options": [] } }))
                .unwrap();
        assert_eq!(record.size.options, vec!["med"]);
    }

    #[test]
    fn repeated_size_options_collapse_in_order() {
        let record = validate(&json!({
            "name": "Gnoll",
            "size": { "value": "sm", "options": ["Small", "Medium", "sm", "med"] }
        }))
        .unwrap();
        assert_eq!(record.size.options, vec!["sm", "med"]);
    }

    #[test]
    fn garbage_typed_fields_still_validate_and_compile() {
        let record = validate(&json!({
            "name": "Oddity",
            "size": 7,
            "movement": "fast",
            "senses": [1, 2],
            "abilityScoreIncrease": "lots",
            "traits": "none",
            "languages": 12,
            "proficiencies": { "skills": "prc, ste", "skillCount": "two" }
        }))
        .unwrap();

        let compiled = compile(&record, &ctx());
        assert!(compiled.primary.is_some());
        assert!(compiled.auxiliaries.is_empty());
    }

    #[test]
    fn safety_net_sets_count_and_housing_trait() {
        let record = validate(&json!({
            "name": "Kenku",
            "traits": [
                { "name": "Expert Duplication", "description": "You can copy writing." },
                { "name": "Kenku Recall", "description": "You gain proficiency in two skills of your choice." }
            ],
            "proficiencies": { "skills": [], "skillCount": 0 }
        }))
        .unwrap();

        assert_eq!(record.proficiencies.skill_count, 2);
        assert_eq!(record.proficiencies.trait_name.as_deref(), Some("Kenku Recall"));
    }

    #[test]
    fn unknown_trait_name_is_cleared() {
        let record = validate(&json!({
            "name": "Human",
            "traits": [{ "name": "Resourceful", "description": "You gain inspiration." }],
            "proficiencies": { "skillCount": 1, "traitName": "Skillful" }
        }))
        .unwrap();

        assert_eq!(record.proficiencies.skill_count, 1);
        assert_eq!(record.proficiencies.trait_name, None);

        let compiled = compile(&record, &ctx());
        let species = compiled.primary.unwrap();
        let skills = species
            .advancement_of("Trait")
            .find(|a| a.title.as_deref() == Some("Skills"))
            .unwrap();
        assert_eq!(skills.trait_config().unwrap().choices[0].count, 1);
    }

    #[test]
    fn natural_weapon_damage_from_prose() {
        let record = validate(&json!({
            "name": "Tabaxi",
            "traits": [{
                "name": "Cat's Claws",
                "description": "Your claws deal 1d4 slashing damage on a hit.",
                "isAttack": true
            }]
        }))
        .unwrap();

        let damage = record.traits[0].damage.as_ref().unwrap();
        assert_eq!(damage.parts, vec![DamageEntry::new("1d4", "slashing")]);
    }

    #[test]
    fn compile_emits_grants_and_trait_documents() {
        let mut record = SpeciesRecord::named("Hill Dwarf");
        record.traits = vec![
            TraitDescriptor::new("Darkvision", "You can see in the dark."),
            TraitDescriptor::new("Dwarven Toughness", "Your hit point maximum increases by 1."),
        ];
        record.proficiencies.skills = vec!["Perception".into()];
        record.languages.custom = "one language of your choice".into();

        let compiled = compile(&record, &ctx());
        let species = compiled.primary.unwrap();

        assert!(matches!(
            species.system,
            DocumentBody::Race { ref identifier, ref creature_type, .. }
                if identifier == "hill-dwarf" && creature_type == "humanoid"
        ));
        assert_eq!(species.advancement_of("Size").count(), 1);
        assert_eq!(species.advancement_of("ItemGrant").count(), 2);

        let languages = species
            .advancement_of("Trait")
            .find(|a| a.title.as_deref() == Some("Languages"))
            .unwrap();
        assert_eq!(languages.hint.as_deref(), Some("one language of your choice"));
        assert_eq!(languages.trait_config().unwrap().choices[0].count, 1);

        let fixed = species
            .advancement_of("Trait")
            .find(|a| a.title.as_deref() == Some("Skill Proficiency"))
            .unwrap();
        assert_eq!(fixed.trait_config().unwrap().grants, vec!["skills:prc"]);

        assert_eq!(compiled.auxiliaries.len(), 2);
        assert!(matches!(
            compiled.auxiliaries[0].system,
            DocumentBody::Feat { ref source, ref feat_type, .. }
                if source == "Hill Dwarf Trait" && feat_type == "race"
        ));
    }

    #[test]
    fn fixed_ability_scores_compile_to_a_map() {
        let record = validate(&json!({
            "name": "Mountain Dwarf",
            "abilityScoreIncrease": { "type": "fixed", "scores": { "Constitution": 2, "str": "+2" } }
        }))
        .unwrap();

        let species = compile(&record, &ctx()).primary.unwrap();
        let asi = species.advancement_of("AbilityScoreImprovement").next().unwrap();
        match &asi.config {
            AdvancementConfig::AbilityScoreImprovement(config) => {
                assert_eq!(config.fixed.get("con"), Some(&2));
                assert_eq!(config.fixed.get("str"), Some(&2));
            }
            other => panic!("unexpected config {other:?}"),
        }
    }

    #[test]
    fn unparseable_claw_damage_falls_back_with_warning() {
        let mut claws = TraitDescriptor::new("Claws", "Special claws.");
        claws.is_attack = true;
        claws.damage = Some(AttackDamage {
            ability: None,
            parts: vec![DamageEntry::new("special", "slashing")],
        });
        let mut record = SpeciesRecord::named("Oddkin");
        record.traits = vec![claws];

        let compiled = compile(&record, &ctx());

        let activity = &compiled.auxiliaries[0].activities[0];
        assert_eq!(activity.kind, ActivityKind::Attack);
        let part = &activity.damage.as_ref().unwrap().parts[0];
        assert_eq!((part.number, part.denomination), (Some(1), Some(6)));
        assert_eq!(compiled.warnings.len(), 1);
    }
}
