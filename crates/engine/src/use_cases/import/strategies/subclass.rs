//! Subclass import.
//!
//! Subclass text is the messiest input: overview tables repeat feature names,
//! headers come as "Feature (Level X)" or "Level X: Feature", and some
//! subclasses carry an expanded spell list that has no document of its own.

use std::collections::BTreeMap;

use chronicle_domain::{
    icons, CompiledDocuments, DocumentBody, DocumentSpec, DocumentType, DomainError,
    FeatureDescriptor, SpellListEntry, SubclassRecord,
};
use serde_json::Value;

use super::feature::parse_features;
use crate::use_cases::import::features::{feature_document, level_grants, FeatureOrigin};
use crate::use_cases::import::json_fields as field;
use crate::use_cases::import::text::{dashed_identifier, html_paragraphs, slug};

/// Name of the pseudo-feature holding an expanded spell list.
pub const SPELL_LIST_FEATURE: &str = "Expanded Spell List";

const INSTRUCTIONS: &str = r#"You are a strict data extraction engine for tabletop RPG subclasses.
Answer with ONE JSON object, nothing else.

Rules:
1. Copy feature text word for word. Never summarize, and keep every paragraph ("Additionally...", "Once you use...").
2. Read mechanics from anywhere in the feature: action type, range, target, saving throw, damage, uses.
3. The text may list features twice: a short overview ("Level 3: Feature Name") and a full section. Skip the overview and extract the full section.
4. Format descriptions as HTML: <p> for paragraphs, <ul>/<li> for lists.
5. Choice lists ("Choose one:", bullet options) stay inside the description. Never make them separate features.
6. The feature name is the header text exactly. Never rename a feature after a term used inside its text.
7. An "Expanded Spell List" goes in "spells" with each spell's level, not in "features".
8. When no name is labeled, take it from the opening sentence ("The Faceless One is..." gives "The Faceless One").
9. Headers appear as "Feature Name (Level X)" and as "Level X: Feature Name". Both give the feature name and its level.

JSON shape:
{
  "name": "Subclass Name",
  "baseClass": "Base Class",
  "description": "Flavor text",
  "features": [
    {
      "name": "Feature Name",
      "description": "<p>Full feature text.</p>",
      "level": 3,
      "activation": { "type": "action", "cost": 1 },
      "range": { "value": null, "units": "ft" },
      "target": { "value": null, "units": "ft", "type": "" },
      "save": { "ability": "", "scaling": "spell" },
      "damage": [ { "formula": "", "type": "" } ],
      "uses": { "value": null, "max": "", "per": "" }
    }
  ],
  "spells": [ { "name": "Spell Name", "level": 1 } ]
}

Example source:
Level 3: Magma Mastery. As an action, you create a sphere of magma in a 15-foot cone. Each creature in that area must make a Dexterity saving throw. On a failed save, the creature takes 3d6 fire damage.

Additionally, you choose one of the following benefits:
* Searing Skin: You deal 1d4 fire damage to creatures that touch you.
* Molten Core: You gain resistance to cold damage.

Once you use this feature, you cannot use it again until you finish a short or long rest.

Example answer:
{"features":[{"name":"Magma Mastery","description":"<p>As an action, you create a sphere of magma in a 15-foot cone. Each creature in that area must make a Dexterity saving throw. On a failed save, the creature takes 3d6 fire damage.</p><p>Additionally, you choose one of the following benefits:</p><ul><li><strong>Searing Skin:</strong> You deal 1d4 fire damage to creatures that touch you.</li><li><strong>Molten Core:</strong> You gain resistance to cold damage.</li></ul><p>Once you use this feature, you cannot use it again until you finish a short or long rest.</p>","level":3,"activation":{"type":"action","cost":1},"range":{"value":15,"units":"ft"},"target":{"value":15,"units":"ft","type":"cone"},"save":{"ability":"dex","scaling":"spell"},"damage":[{"formula":"3d6","type":"fire"}],"uses":{"value":1,"max":"1","per":"sr"}}]}"#;

pub fn build_prompt(source: &str) -> String {
    format!("{INSTRUCTIONS}\n\nSOURCE TEXT:\n{source}")
}

pub fn validate(data: &Value) -> Result<SubclassRecord, DomainError> {
    let name = field::string(data, "name").ok_or(DomainError::missing("name"))?;
    let mut record = SubclassRecord::named(name);

    if let Some(base_class) = field::string(data, "baseClass") {
        record.base_class = base_class;
    }
    record.description = field::string_or_empty(data, "description");
    record.features = parse_features(field::array(data, "features"), 3);
    record.spells = field::array(data, "spells")
        .iter()
        .filter_map(|spell| match spell {
            Value::String(name) if !name.trim().is_empty() => Some(SpellListEntry {
                name: name.trim().to_string(),
                level: 1,
            }),
            Value::Object(_) => Some(SpellListEntry {
                name: field::string(spell, "name")?,
                level: field::uint(spell, "level").filter(|l| *l > 0).unwrap_or(1),
            }),
            _ => None,
        })
        .collect();

    tracing::debug!(
        subclass = %record.name,
        base_class = %record.base_class,
        features = record.features.len(),
        spells = record.spells.len(),
        "Validated subclass"
    );
    Ok(record)
}

/// HTML table of spell names grouped by ascending spell level.
pub fn spell_list_table(spells: &[SpellListEntry]) -> String {
    let mut by_level: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for spell in spells {
        by_level.entry(spell.level).or_default().push(&spell.name);
    }

    let mut html = String::from(
        "<h3>Expanded Spell List</h3><table border='1'><thead><tr><th>Spell Level</th><th>Spells</th></tr></thead><tbody>",
    );
    for (level, names) in by_level {
        html.push_str(&format!(
            "<tr><td>{level}</td><td>{}</td></tr>",
            names.join(", ")
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Features in grant order, with the spell list pseudo-feature first.
fn features_with_spell_list(record: &SubclassRecord) -> Vec<FeatureDescriptor> {
    let mut features = Vec::with_capacity(record.features.len() + 1);
    if !record.spells.is_empty() {
        features.push(FeatureDescriptor::new(
            SPELL_LIST_FEATURE,
            spell_list_table(&record.spells),
            1,
        ));
    }
    features.extend(record.features.iter().cloned());
    features
}

pub fn compile(record: &SubclassRecord) -> CompiledDocuments {
    let features = features_with_spell_list(record);
    let origin = FeatureOrigin::owned_by(
        format!("{} ({})", record.name, record.base_class),
        &record.base_class,
    );

    let auxiliaries = features
        .iter()
        .map(|f| feature_document(f, &origin))
        .collect();

    let mut subclass = DocumentSpec::new(
        &record.name,
        DocumentType::Subclass,
        icons::MYSTERY_MAN,
        DocumentBody::Subclass {
            identifier: slug(&record.name),
            class_identifier: dashed_identifier(&record.base_class),
        },
    )
    .with_description(html_paragraphs(&record.description))
    .in_folder(record.base_class.trim());
    subclass.advancement = level_grants(
        features.iter().map(|f| (f.name.as_str(), f.level)),
        "Subclass Features",
    );

    CompiledDocuments {
        primary: Some(subclass),
        auxiliaries,
        warnings: Vec::new(),
    }
}
