//! Stand-alone class feature import, plus the feature parser the class and
//! subclass validators share.

use chronicle_domain::{
    ability_code, ActivationRule, CompiledDocuments, DamageEntry, FeatureBatch,
    FeatureDescriptor, RangeRule, SaveRule, TargetRule, UsesRule,
};
use serde_json::Value;

use crate::use_cases::import::dedupe::dedupe_features;
use crate::use_cases::import::features::{feature_document, FeatureOrigin};
use crate::use_cases::import::json_fields as field;

const INSTRUCTIONS: &str = r#"You are a strict data extraction engine for tabletop RPG class features.
Answer with ONE JSON object, nothing else.

Rules:
1. Copy feature text word for word. Never summarize, and keep every paragraph ("Additionally...", "Once you use...").
2. Read mechanics from anywhere in the feature: action type, range, target, saving throw, damage, uses.
3. Format descriptions as HTML: <p> for paragraphs, <ul>/<li> for lists.
4. Choice lists ("Choose one:", bullet options) stay inside the description. Never make them separate features.
5. The feature name is the header text exactly. Never rename a feature after a term used inside its text.
6. A feature that mentions another feature ("When you use Misty Escape...") is still named after its own header.
7. Fill "requirements" only when the text states one. Never invent a class name.

JSON shape:
{
  "features": [
    {
      "name": "Feature Name",
      "description": "<p>Full feature text.</p>",
      "level": 1,
      "activation": { "type": "action", "cost": 1 },
      "range": { "value": null, "units": "ft" },
      "target": { "value": null, "units": "ft", "type": "" },
      "save": { "ability": "", "scaling": "spell" },
      "damage": [ { "formula": "1d6", "type": "fire" } ],
      "uses": { "value": null, "max": "", "per": "" },
      "requirements": ""
    }
  ]
}

Example source:
Level 3: Cinder Step. As a bonus action, you teleport up to 30 feet to a space you can see. Each creature within 5 feet of the space you leave takes 1d6 fire damage.

Level 7: Ashen Veil. When you use Cinder Step, you can become invisible until the start of your next turn.
Once you use this feature, you can't use it again until you finish a long rest.

Example answer:
{"features":[{"name":"Cinder Step","description":"<p>As a bonus action, you teleport up to 30 feet to a space you can see. Each creature within 5 feet of the space you leave takes 1d6 fire damage.</p>","level":3,"activation":{"type":"bonus","cost":1},"range":{"value":30,"units":"ft"},"target":{"value":5,"units":"ft","type":"radius"},"save":{},"damage":[{"formula":"1d6","type":"fire"}],"uses":{}},{"name":"Ashen Veil","description":"<p>When you use Cinder Step, you can become invisible until the start of your next turn.</p><p>Once you use this feature, you can't use it again until you finish a long rest.</p>","level":7,"activation":{},"range":{},"target":{},"save":{},"uses":{"value":1,"max":"1","per":"lr"}}]}"#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

/// Feature batches have no identifying name, so validation never fails.
pub fn validate(data: &Value) -> FeatureBatch {
    let raw: &[Value] = match data {
        Value::Array(items) => items,
        Value::Object(_) if data.get("features").is_some() => field::array(data, "features"),
        Value::Object(_) => std::slice::from_ref(data),
        _ => &[],
    };
    FeatureBatch {
        features: parse_features(raw, 0),
    }
}

pub fn compile(batch: &FeatureBatch) -> CompiledDocuments {
    let origin = FeatureOrigin::standalone("Imported Feature");
    let mut warnings = Vec::new();
    if batch.features.is_empty() {
        tracing::warn!("No features found in text");
        warnings.push("No features found in text.".to_string());
    }
    CompiledDocuments {
        primary: None,
        auxiliaries: batch
            .features
            .iter()
            .map(|f| feature_document(f, &origin))
            .collect(),
        warnings,
    }
}

/// Parse, dedupe and level-sort a feature array.
pub(super) fn parse_features(raw: &[Value], default_level: u32) -> Vec<FeatureDescriptor> {
    dedupe_features(
        raw.iter()
            .filter_map(|f| feature_descriptor(f, default_level))
            .collect(),
    )
}

fn feature_descriptor(raw: &Value, default_level: u32) -> Option<FeatureDescriptor> {
    let name = field::string(raw, "name")?;
    let level = field::uint(raw, "level").unwrap_or(default_level);
    let mut feature =
        FeatureDescriptor::new(name, field::string_or_empty(raw, "description"), level);

    feature.activation = raw.get("activation").and_then(activation);
    feature.range = raw.get("range").and_then(range);
    feature.target = raw.get("target").and_then(target);
    feature.save = raw.get("save").and_then(save);
    feature.damage = damage_entries(raw.get("damage"));
    feature.uses = raw.get("uses").and_then(uses);
    feature.requirements = field::string(raw, "requirements");
    Some(feature)
}

fn activation(raw: &Value) -> Option<ActivationRule> {
    let rule = ActivationRule {
        kind: field::string_or_empty(raw, "type").to_lowercase(),
        cost: field::uint(raw, "cost"),
        condition: field::string(raw, "condition"),
    };
    (!rule.is_empty()).then_some(rule)
}

fn range(raw: &Value) -> Option<RangeRule> {
    let rule = RangeRule {
        value: field::uint(raw, "value"),
        units: field::string_or_empty(raw, "units"),
    };
    (!rule.is_empty()).then_some(rule)
}

pub(super) fn target(raw: &Value) -> Option<TargetRule> {
    let rule = TargetRule {
        value: field::uint(raw, "value"),
        units: field::string_or_empty(raw, "units"),
        kind: field::string_or_empty(raw, "type"),
    };
    (!rule.is_empty()).then_some(rule)
}

pub(super) fn save(raw: &Value) -> Option<SaveRule> {
    let ability = field::string(raw, "ability")?;
    Some(SaveRule {
        ability: ability_code(&ability)
            .map(str::to_string)
            .unwrap_or_else(|| ability.to_lowercase()),
        dc: field::uint(raw, "dc"),
        scaling: field::string(raw, "scaling").unwrap_or_else(|| "spell".to_string()),
    })
}

fn uses(raw: &Value) -> Option<UsesRule> {
    let rule = UsesRule {
        value: field::uint(raw, "value"),
        max: field::string_or_empty(raw, "max"),
        per: field::string_or_empty(raw, "per"),
    };
    (!rule.is_empty()).then_some(rule)
}

/// Damage as `[{formula, type}]`, `[[formula, type]]` or `{parts: [...]}`.
pub(super) fn damage_entries(raw: Option<&Value>) -> Vec<DamageEntry> {
    let items: &[Value] = match raw {
        Some(Value::Array(items)) => items,
        Some(obj @ Value::Object(_)) => field::array(obj, "parts"),
        _ => &[],
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Array(pair) => {
                let formula = pair.first()?.as_str()?.trim();
                let damage_type = pair.get(1).and_then(Value::as_str).unwrap_or("");
                (!formula.is_empty())
                    .then(|| DamageEntry::new(formula, damage_type.trim().to_lowercase()))
            }
            Value::Object(_) => {
                let formula = field::string(item, "formula")?;
                let damage_type = field::string(item, "type")
                    .or_else(|| field::string(item, "damageType"))
                    .unwrap_or_default();
                Some(DamageEntry::new(formula, damage_type.to_lowercase()))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mechanics_and_drops_empty_objects() {
        let batch = validate(&json!({
            "features": [
                {
                    "name": "Magma Mastery",
                    "description": "<p>Fire.</p>",
                    "level": "3",
                    "activation": { "type": "Action", "cost": 1 },
                    "target": { "value": 15, "units": "ft", "type": "cone" },
                    "save": { "ability": "Dexterity" },
                    "damage": [{ "formula": "3d6", "type": "Fire" }],
                    "uses": { "value": 1, "max": "1", "per": "sr" }
                },
                {
                    "name": "Phantom Echo",
                    "description": "<p>Echo.</p>",
                    "level": 6,
                    "activation": {},
                    "range": {},
                    "target": {},
                    "save": {},
                    "uses": {}
                }
            ]
        }));

        let magma = &batch.features[0];
        assert_eq!(magma.level, 3);
        assert_eq!(magma.activation.as_ref().unwrap().kind, "action");
        let save = magma.save.as_ref().unwrap();
        assert_eq!((save.ability.as_str(), save.scaling.as_str()), ("dex", "spell"));
        assert_eq!(magma.damage, vec![DamageEntry::new("3d6", "fire")]);

        let echo = &batch.features[1];
        assert!(echo.activation.is_none());
        assert!(echo.range.is_none());
        assert!(echo.target.is_none());
        assert!(echo.save.is_none());
        assert!(echo.uses.is_none());
    }

    #[test]
    fn accepts_bare_arrays_and_single_objects() {
        assert_eq!(
            validate(&json!([{ "name": "A" }, { "name": "" }])).features.len(),
            1
        );
        assert_eq!(validate(&json!({ "name": "Solo" })).features.len(), 1);
        assert!(validate(&json!("nothing")).features.is_empty());
    }

    #[test]
    fn compile_creates_standalone_feature_documents() {
        let batch = validate(&json!({
            "features": [
                { "name": "Cinder Step", "level": 3, "damage": [["1d6", "fire"]] },
                { "name": "Cinder Step", "level": 3, "description": "A much longer description." }
            ]
        }));

        let compiled = compile(&batch);

        assert!(compiled.primary.is_none());
        assert_eq!(compiled.auxiliaries.len(), 1);
        let doc = &compiled.auxiliaries[0];
        assert_eq!(doc.description, "<p>A much longer description.</p>");
        assert!(matches!(
            doc.system,
            chronicle_domain::DocumentBody::Feat { ref source, ref requirements, .. }
                if source == "Imported Feature" && requirements == "Level 3"
        ));
        assert!(doc.activities.is_empty());
    }

    #[test]
    fn empty_batch_warns() {
        let compiled = compile(&FeatureBatch::default());
        assert!(compiled.auxiliaries.is_empty());
        assert_eq!(compiled.warnings, vec!["No features found in text."]);
    }
}
