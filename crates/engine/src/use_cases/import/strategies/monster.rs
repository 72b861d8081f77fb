//! Monster stat-block import.

use chronicle_domain::{
    ability_code, icons, size_code, ArmorClass, CompiledDocuments, DamageEntry, DocumentBody,
    DocumentSpec, DocumentType, DomainError, HitPointRule, MonsterAction, MonsterRecord,
};
use serde_json::Value;

use super::natural_attack;
use super::species::movement;
use crate::use_cases::import::json_fields as field;
use crate::use_cases::import::safety_net::damage_from_prose;
use crate::use_cases::import::text::html_paragraphs;

const INSTRUCTIONS: &str = r#"You are extracting a monster stat block for a tabletop RPG content library.
Answer with ONE JSON object, nothing else.

JSON shape:
{
  "name": "Monster Name",
  "description": "Lore and flavor text.",
  "size": "med",
  "type": "beast",
  "ac": { "value": 13, "calc": "natural" },
  "hp": { "value": 22, "formula": "4d8+4" },
  "speed": { "walk": 30, "climb": 0, "fly": 0, "swim": 0 },
  "stats": { "str": 10, "dex": 10, "con": 10, "int": 10, "wis": 10, "cha": 10 },
  "cr": "1/4",
  "actions": [
    { "name": "Bite", "desc": "Melee Weapon Attack: +4 to hit, reach 5 ft. Hit: 6 (1d8 + 2) piercing damage.", "damage": "1d8+2", "damageType": "piercing" }
  ]
}

Rules:
1. Sizes use codes: tiny, sm, med, lg, huge, grg.
2. "type" is the creature type in lower case (beast, undead, fiend...).
3. "calc" is "natural" for natural armor, "armor" for worn armor, otherwise "flat".
4. "cr" may be a fraction such as "1/2".
5. Every action, including multiattack, goes in "actions". Leave "damage" empty when the action deals none."#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

pub fn validate(data: &Value) -> Result<MonsterRecord, DomainError> {
    let name = field::string(data, "name").ok_or(DomainError::missing("name"))?;
    let mut record = MonsterRecord::named(name);

    record.description = field::string_or_empty(data, "description");
    if let Some(size) = field::string(data, "size").as_deref().and_then(size_code) {
        record.size = size.to_string();
    }
    if let Some(kind) = field::string(data, "type") {
        record.creature_type = kind.to_lowercase();
    }
    match data.get("ac") {
        Some(obj @ Value::Object(_)) => {
            record.armor_class = ArmorClass {
                value: field::uint(obj, "value").unwrap_or(10),
                calc: field::string(obj, "calc")
                    .map(|c| c.to_lowercase())
                    .unwrap_or_else(|| "flat".to_string()),
            }
        }
        Some(other) => {
            if let Some(value) = field::as_uint(other) {
                record.armor_class.value = value;
            }
        }
        None => {}
    }
    match data.get("hp") {
        Some(obj @ Value::Object(_)) => {
            record.hit_points = HitPointRule {
                value: field::uint(obj, "value").filter(|v| *v > 0).unwrap_or(1),
                formula: field::string(obj, "formula"),
            }
        }
        Some(other) => {
            if let Some(value) = field::as_uint(other).filter(|v| *v > 0) {
                record.hit_points.value = value;
            }
        }
        None => {}
    }
    if data.get("speed").is_some() {
        record.speed = movement(data.get("speed"));
    }
    if let Some(stats) = field::object(data, "stats") {
        for (key, score) in stats {
            let (Some(code), Some(score)) = (ability_code(key), score_value(score)) else {
                continue;
            };
            record.abilities.insert(code.to_string(), score);
        }
    }
    record.challenge_rating = field::float(data, "cr")
        .filter(|cr| *cr >= 0.0)
        .unwrap_or(0.0);
    record.actions = field::array(data, "actions")
        .iter()
        .filter_map(monster_action)
        .collect();
    Ok(record)
}

fn score_value(raw: &Value) -> Option<i32> {
    match raw {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn monster_action(raw: &Value) -> Option<MonsterAction> {
    let name = field::string(raw, "name")?;
    let description = field::string(raw, "desc")
        .or_else(|| field::string(raw, "description"))
        .unwrap_or_default();
    let mut damage = field::string(raw, "damage");
    let mut damage_type = field::string(raw, "damageType").map(|t| t.to_lowercase());

    if damage_type.is_none() {
        if let Some(prose) = damage_from_prose(&description) {
            tracing::debug!(action = %name, damage_type = %prose.damage_type, "Damage type read from action text");
            damage.get_or_insert(prose.formula);
            damage_type = Some(prose.damage_type);
        }
    }

    Some(MonsterAction {
        name,
        description,
        damage,
        damage_type,
    })
}

pub fn compile(record: &MonsterRecord) -> CompiledDocuments {
    let mut warnings = Vec::new();

    let mut actor = DocumentSpec::new(
        &record.name,
        DocumentType::Npc,
        icons::MYSTERY_MAN,
        DocumentBody::Npc {
            armor_class: record.armor_class.value,
            armor_calc: record.armor_class.calc.clone(),
            hit_points: record.hit_points.value,
            hit_point_formula: record.hit_points.formula.clone(),
            speed: record.speed.clone(),
            abilities: record.abilities.clone(),
            challenge_rating: record.challenge_rating,
            creature_type: record.creature_type.clone(),
            size: record.size.clone(),
        },
    )
    .with_description(html_paragraphs(&record.description));

    actor.embedded = record
        .actions
        .iter()
        .map(|action| action_document(action, &mut warnings))
        .collect();

    CompiledDocuments {
        primary: Some(actor),
        auxiliaries: Vec::new(),
        warnings,
    }
}

fn action_document(action: &MonsterAction, warnings: &mut Vec<String>) -> DocumentSpec {
    let mut weapon = DocumentSpec::new(
        &action.name,
        DocumentType::Weapon,
        icons::WEAPON,
        DocumentBody::Weapon {},
    )
    .with_description(html_paragraphs(&action.description));

    if let Some(formula) = &action.damage {
        let entry = DamageEntry::new(formula, action.damage_type.clone().unwrap_or_default());
        weapon
            .activities
            .push(natural_attack(&action.name, "str", &[entry], warnings));
    }
    weapon
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wolf() -> MonsterRecord {
        validate(&json!({
            "name": "Dire Wolf",
            "size": "Large",
            "type": "Beast",
            "ac": { "value": 14, "calc": "natural" },
            "hp": { "value": 37, "formula": "5d10+10" },
            "speed": { "walk": 50 },
            "stats": { "Strength": 17, "dex": "15" },
            "cr": "1/4",
            "actions": [
                { "name": "Bite", "desc": "Hit: 10 (2d6 + 3) piercing damage.", "damage": "2d6+3" },
                { "name": "Howl", "description": "The wolf howls." },
                { "desc": "Nameless." }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn validate_normalizes_stat_block() {
        let record = wolf();
        assert_eq!(record.size, "lg");
        assert_eq!(record.creature_type, "beast");
        assert_eq!(record.armor_class.calc, "natural");
        assert_eq!(record.hit_points.formula.as_deref(), Some("5d10+10"));
        assert_eq!(record.speed.walk, 50);
        assert_eq!(record.abilities["str"], 17);
        assert_eq!(record.abilities["dex"], 15);
        assert_eq!(record.abilities["cha"], 10);
        assert_eq!(record.challenge_rating, 0.25);
        assert_eq!(record.actions.len(), 2);
    }

    #[test]
    fn missing_damage_type_is_read_from_action_text() {
        let bite = &wolf().actions[0];
        assert_eq!(bite.damage.as_deref(), Some("2d6+3"));
        assert_eq!(bite.damage_type.as_deref(), Some("piercing"));
        assert!(wolf().actions[1].damage_type.is_none());
    }

    #[test]
    fn defaults_for_a_bare_name() {
        let record = validate(&json!({ "name": "Commoner", "size": "enormous" })).unwrap();
        assert_eq!(record.size, "med");
        assert_eq!(record.creature_type, "humanoid");
        assert_eq!(record.armor_class.value, 10);
        assert_eq!(record.hit_points.value, 1);
        assert_eq!(record.speed.walk, 30);
        assert_eq!(record.challenge_rating, 0.0);
    }

    #[test]
    fn compile_embeds_actions_as_weapons() {
        let compiled = compile(&wolf());
        let actor = compiled.primary.unwrap();
        assert_eq!(actor.doc_type, DocumentType::Npc);
        assert!(matches!(
            actor.system,
            DocumentBody::Npc { armor_class: 14, hit_points: 37, ref size, .. } if size == "lg"
        ));

        assert_eq!(actor.embedded.len(), 2);
        let bite = &actor.embedded[0];
        assert_eq!(bite.img, icons::WEAPON);
        let part = &bite.activities[0].damage.as_ref().unwrap().parts[0];
        assert_eq!((part.number, part.denomination), (Some(2), Some(6)));
        assert_eq!(part.types, vec!["piercing"]);
        assert!(actor.embedded[1].activities.is_empty());
        assert!(compiled.warnings.is_empty());
    }
}
