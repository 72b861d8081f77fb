//! Spell import.

use chronicle_domain::{
    icons, ActivationRule, Activity, ActivityDamage, ActivityKind, CastingTime,
    CompiledDocuments, DocumentBody, DocumentSpec, DocumentType, DomainError, DurationRule,
    Materials, RangeRule, SaveProfile, SpellComponents, SpellRecord,
};
use serde_json::Value;

use super::dice_parts;
use super::feature::{damage_entries, save, target};
use crate::use_cases::import::features::activity_target;
use crate::use_cases::import::json_fields as field;
use crate::use_cases::import::text::html_paragraphs;

const INSTRUCTIONS: &str = r#"You are extracting a spell for a tabletop RPG content library.
Answer with ONE JSON object, nothing else.

JSON shape:
{
  "name": "Spell Name",
  "level": 3,
  "school": "evocation",
  "castingTime": { "value": 1, "unit": "action" },
  "range": { "value": 150, "units": "ft" },
  "duration": { "value": 0, "units": "inst" },
  "components": { "v": true, "s": true, "m": false, "material": "" },
  "description": "Full spell text.",
  "damage": { "parts": [["8d6", "fire"]], "scaling": "level" },
  "save": { "ability": "dex", "dc": null, "scaling": "spell" },
  "target": { "value": 20, "units": "ft", "type": "sphere" }
}

Rules:
1. "school" is lower case: abjuration, conjuration, divination, enchantment, evocation, illusion, necromancy, transmutation.
2. Cantrips are level 0.
3. Duration units: inst, round, minute, hour, day, perm.
4. Casting time units: action, bonus, reaction, minute, hour.
5. Target type: sphere, cone, cylinder, line, cube, self, creature.
6. Leave "damage" parts empty and "save" ability blank when the spell has none.

Example source:
Frost Lance. 1st-level evocation. Casting Time: 1 action. Range: 60 feet. Components: V, S, M (a shard of ice). Duration: Instantaneous.
A lance of ice strikes one creature you can see within range. The target makes a Constitution saving throw, taking 2d8 cold damage on a failed save.

Example answer:
{"name":"Frost Lance","level":1,"school":"evocation","castingTime":{"value":1,"unit":"action"},"range":{"value":60,"units":"ft"},"duration":{"value":0,"units":"inst"},"components":{"v":true,"s":true,"m":true,"material":"a shard of ice"},"description":"A lance of ice strikes one creature you can see within range. The target makes a Constitution saving throw, taking 2d8 cold damage on a failed save.","damage":{"parts":[["2d8","cold"]],"scaling":"level"},"save":{"ability":"con","dc":null,"scaling":"spell"},"target":{"value":1,"units":"","type":"creature"}}"#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

pub fn validate(data: &Value) -> Result<SpellRecord, DomainError> {
    let name = field::string(data, "name").ok_or(DomainError::missing("name"))?;
    let mut record = SpellRecord::named(name);

    record.level = field::uint(data, "level").unwrap_or(0).min(9) as u8;
    record.school = field::string_or_empty(data, "school").to_lowercase();
    if let Some(casting) = data.get("castingTime") {
        record.casting_time = casting_time(casting);
    }
    if let Some(range) = data.get("range") {
        record.range = spell_range(range);
    }
    if let Some(duration) = data.get("duration") {
        record.duration = DurationRule {
            value: field::uint(duration, "value").unwrap_or(0),
            units: field::string(duration, "units")
                .map(|u| u.to_lowercase())
                .unwrap_or_else(|| "inst".to_string()),
        };
    }
    if let Some(components) = data.get("components") {
        record.components = spell_components(components);
    }
    record.description = field::string_or_empty(data, "description");
    record.damage = damage_entries(data.get("damage"));
    record.damage_scaling = data
        .get("damage")
        .and_then(|d| field::string(d, "scaling"));
    record.save = data.get("save").and_then(save);
    record.target = data.get("target").and_then(target);
    Ok(record)
}

fn casting_time(raw: &Value) -> CastingTime {
    let mut casting = CastingTime::default();
    match raw {
        Value::Object(_) => {
            if let Some(value) = field::uint(raw, "value").filter(|v| *v > 0) {
                casting.value = value;
            }
            if let Some(unit) = field::string(raw, "unit").or_else(|| field::string(raw, "units"))
            {
                casting.unit = unit.to_lowercase();
            }
        }
        // "1 bonus action", "10 minutes"
        Value::String(s) => {
            let lower = s.to_lowercase();
            if let Some(value) = field::as_uint(raw).filter(|v| *v > 0) {
                casting.value = value;
            }
            casting.unit = ["bonus", "reaction", "minute", "hour"]
                .into_iter()
                .find(|unit| lower.contains(unit))
                .unwrap_or("action")
                .to_string();
        }
        _ => {}
    }
    casting
}

fn spell_range(raw: &Value) -> RangeRule {
    match raw {
        Value::Object(_) => RangeRule {
            value: field::uint(raw, "value"),
            units: field::string(raw, "units")
                .map(|u| u.to_lowercase())
                .unwrap_or_else(|| "ft".to_string()),
        },
        Value::String(s) if s.trim().eq_ignore_ascii_case("self") => RangeRule {
            value: None,
            units: "self".to_string(),
        },
        Value::String(s) if s.trim().eq_ignore_ascii_case("touch") => RangeRule {
            value: None,
            units: "touch".to_string(),
        },
        other => RangeRule {
            value: field::as_uint(other),
            units: "ft".to_string(),
        },
    }
}

fn spell_components(raw: &Value) -> SpellComponents {
    let materials = field::string(raw, "material")
        .or_else(|| field::string(raw, "materials"))
        .unwrap_or_default();
    SpellComponents {
        vocal: field::boolean(raw, "v") || field::boolean(raw, "vocal"),
        somatic: field::boolean(raw, "s") || field::boolean(raw, "somatic"),
        material: field::boolean(raw, "m") || !materials.is_empty(),
        materials,
    }
}

pub fn compile(record: &SpellRecord) -> CompiledDocuments {
    let mut warnings = Vec::new();
    let activation = ActivationRule {
        kind: record.casting_time.unit.clone(),
        cost: Some(record.casting_time.value),
        condition: None,
    };

    let mut properties = Vec::new();
    if record.components.vocal {
        properties.push("vocal".to_string());
    }
    if record.components.somatic {
        properties.push("somatic".to_string());
    }
    let materials = record.components.material.then(|| {
        properties.push("material".to_string());
        Materials {
            value: record.components.materials.clone(),
            consumed: false,
            cost: 0,
        }
    });

    let mut spell = DocumentSpec::new(
        &record.name,
        DocumentType::Spell,
        icons::SPELL,
        DocumentBody::Spell {
            level: record.level,
            school: record.school.clone(),
            activation: activation.clone(),
            duration: record.duration.clone(),
            range: record.range.clone(),
            target: record.target.clone(),
            properties,
            materials,
        },
    )
    .with_description(html_paragraphs(&record.description));

    if record.save.is_some() || !record.damage.is_empty() {
        let kind = if record.save.is_some() {
            ActivityKind::Save
        } else {
            ActivityKind::Attack
        };
        let mut activity = Activity::new(kind, &record.name);
        activity.activation = Some(activation);
        activity.target = record.target.as_ref().and_then(activity_target);
        activity.save = record.save.as_ref().map(|s| SaveProfile {
            abilities: vec![s.ability.clone()],
            dc_calculation: "spell".to_string(),
            dc_formula: None,
        });
        activity.damage = Some(ActivityDamage {
            include_base: false,
            parts: dice_parts(&record.name, &record.damage, "", &mut warnings),
        });
        spell.activities.push(activity);
    }

    CompiledDocuments {
        primary: Some(spell),
        auxiliaries: Vec::new(),
        warnings,
    }
}
