//! Feature document compilation shared by the class, subclass and feature imports.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chronicle_domain::{
    icons, ActivationRule, ActiveEffect, Activity, ActivityDamage, ActivityKind, ActivityTarget,
    Advancement, DamageEntry, DamagePart, DocumentBody, DocumentSpec, DocumentType,
    FeatureDescriptor, SaveProfile, TargetRule,
};
use regex_lite::Regex;

use super::text::html_paragraphs;

const TEMPLATE_SHAPES: [&str; 9] = [
    "circle", "cone", "cube", "cylinder", "line", "sphere", "square", "wall", "radius",
];

const CONDITIONS: [&str; 9] = [
    "Charmed",
    "Frightened",
    "Paralyzed",
    "Restrained",
    "Invisible",
    "Prone",
    "Stunned",
    "Poisoned",
    "Grappled",
];

static CONDITION_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    CONDITIONS
        .iter()
        .map(|name| {
            let re = Regex::new(&format!(r"(?i)\b{name}\b")).expect("valid regex");
            (*name, re)
        })
        .collect()
});

/// Where a feature came from, used for its source and requirements lines.
#[derive(Debug, Clone)]
pub struct FeatureOrigin {
    pub source: String,
    /// Owner named in requirements ("Wizard 2"); `None` gives "Level 2".
    pub owner: Option<String>,
}

impl FeatureOrigin {
    pub fn owned_by(source: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            owner: Some(owner.into()),
        }
    }

    pub fn standalone(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            owner: None,
        }
    }

    fn requirements_for(&self, feature: &FeatureDescriptor) -> String {
        if let Some(explicit) = feature.requirements.as_deref().filter(|r| !r.trim().is_empty()) {
            return explicit.to_string();
        }
        match (&self.owner, feature.level) {
            (Some(owner), level) => format!("{owner} {level}"),
            (None, 0) => String::new(),
            (None, level) => format!("Level {level}"),
        }
    }
}

/// Build the feat document for one class-style feature.
pub fn feature_document(feature: &FeatureDescriptor, origin: &FeatureOrigin) -> DocumentSpec {
    let description = html_paragraphs(&feature.description);
    let mut doc = DocumentSpec::new(
        &feature.name,
        DocumentType::Feat,
        icons::BOOK,
        DocumentBody::Feat {
            feat_type: "class".to_string(),
            source: origin.source.clone(),
            requirements: origin.requirements_for(feature),
            uses: feature.uses.clone().filter(|u| !u.is_empty()),
        },
    );

    doc.activities.extend(feature_activity(feature));
    doc.effects = condition_effects(&description);
    doc.with_description(description)
}

/// Save if the feature has a save ability, else damage, else utility.
fn feature_activity(feature: &FeatureDescriptor) -> Option<Activity> {
    let save_ability = feature
        .save
        .as_ref()
        .filter(|s| !s.ability.trim().is_empty());
    let activation = feature.activation.as_ref().filter(|a| !a.kind.is_empty());

    let mut activity = if let Some(save) = save_ability {
        let mut activity = Activity::new(ActivityKind::Save, &feature.name);
        activity.save = Some(SaveProfile {
            abilities: vec![save.ability.clone()],
            dc_calculation: if save.scaling.is_empty() {
                "spell".to_string()
            } else {
                save.scaling.clone()
            },
            dc_formula: None,
        });
        activity.damage = Some(formula_damage(&feature.damage));
        activity
    } else if !feature.damage.is_empty() {
        let mut activity = Activity::new(ActivityKind::Damage, &feature.name);
        activity.damage = Some(formula_damage(&feature.damage));
        activity
    } else if activation.is_some() {
        Activity::new(ActivityKind::Utility, &feature.name)
    } else {
        return None;
    };

    activity.activation = activation.map(|a| ActivationRule {
        cost: a.cost.or(Some(1)),
        ..a.clone()
    });
    activity.range = feature.range.clone().filter(|r| !r.is_empty());
    activity.target = feature.target.as_ref().and_then(activity_target);
    Some(activity)
}

/// Damage parts that keep the model's formula verbatim.
fn formula_damage(entries: &[DamageEntry]) -> ActivityDamage {
    ActivityDamage {
        include_base: false,
        parts: entries
            .iter()
            .map(|entry| DamagePart {
                number: None,
                denomination: None,
                bonus: String::new(),
                types: vec![entry.damage_type.clone()],
                formula: Some(entry.formula.clone()),
            })
            .collect(),
    }
}

/// Area shapes become templates; anything else targets creatures.
pub fn activity_target(target: &TargetRule) -> Option<ActivityTarget> {
    if target.is_empty() {
        return None;
    }
    let raw = target.kind.trim().to_lowercase();
    match TEMPLATE_SHAPES.iter().find(|shape| raw.contains(*shape)) {
        Some(shape) => Some(ActivityTarget::Template {
            shape: shape.to_string(),
            size: target.value,
            units: target.units.clone(),
        }),
        None => Some(ActivityTarget::Affects {
            kind: if raw.is_empty() {
                "creature".to_string()
            } else {
                raw
            },
            count: target.value,
        }),
    }
}

/// One effect per status condition named in the description.
pub fn condition_effects(description: &str) -> Vec<ActiveEffect> {
    CONDITION_RES
        .iter()
        .filter(|(_, re)| re.is_match(description))
        .map(|(name, _)| ActiveEffect::condition(name))
        .collect()
}

/// One pending item grant per level, listing every feature name at that level.
pub fn level_grants<'a>(
    features: impl IntoIterator<Item = (&'a str, u32)>,
    title: &str,
) -> Vec<Advancement> {
    let mut by_level: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (name, level) in features {
        by_level.entry(level).or_default().push(name.to_string());
    }
    by_level
        .into_iter()
        .map(|(level, names)| Advancement::pending_items(level, title, names))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::{RangeRule, SaveRule, UsesRule};

    fn magma_mastery() -> FeatureDescriptor {
        FeatureDescriptor {
            activation: Some(ActivationRule::action(1)),
            range: Some(RangeRule {
                value: Some(15),
                units: "ft".into(),
            }),
            target: Some(TargetRule {
                value: Some(15),
                units: "ft".into(),
                kind: "Cone".into(),
            }),
            save: Some(SaveRule {
                ability: "dex".into(),
                dc: None,
                scaling: "spell".into(),
            }),
            damage: vec![DamageEntry::new("2d10", "fire")],
            ..FeatureDescriptor::new(
                "Magma Mastery",
                "Creatures in the cone must save or be knocked prone.",
                3,
            )
        }
    }

    #[test]
    fn save_feature_gets_save_activity_with_template() {
        let origin = FeatureOrigin::owned_by("Fathomless (Warlock)", "Warlock");
        let doc = feature_document(&magma_mastery(), &origin);

        assert_eq!(doc.img, icons::BOOK);
        assert_eq!(
            doc.description,
            "<p>Creatures in the cone must save or be knocked prone.</p>"
        );
        match &doc.system {
            DocumentBody::Feat { requirements, source, .. } => {
                assert_eq!(requirements, "Warlock 3");
                assert_eq!(source, "Fathomless (Warlock)");
            }
            other => panic!("unexpected body {other:?}"),
        }

        let activity = &doc.activities[0];
        assert_eq!(activity.kind, ActivityKind::Save);
        assert_eq!(activity.save.as_ref().unwrap().abilities, vec!["dex"]);
        assert_eq!(
            activity.target,
            Some(ActivityTarget::Template {
                shape: "cone".into(),
                size: Some(15),
                units: "ft".into(),
            })
        );
        let part = &activity.damage.as_ref().unwrap().parts[0];
        assert_eq!(part.formula.as_deref(), Some("2d10"));
        assert_eq!(part.types, vec!["fire"]);

        assert_eq!(doc.effects.len(), 1);
        assert_eq!(doc.effects[0].statuses, vec!["prone"]);
    }

    #[test]
    fn activity_selection_falls_through() {
        let origin = FeatureOrigin::standalone("Imported Feature");

        let mut damage_only = FeatureDescriptor::new("Searing Strike", "", 2);
        damage_only.damage = vec![DamageEntry::new("1d8", "fire")];
        let doc = feature_document(&damage_only, &origin);
        assert_eq!(doc.activities[0].kind, ActivityKind::Damage);

        let mut utility = FeatureDescriptor::new("Second Wind", "", 1);
        utility.activation = Some(ActivationRule {
            kind: "bonus".into(),
            cost: None,
            condition: None,
        });
        let doc = feature_document(&utility, &origin);
        assert_eq!(doc.activities[0].kind, ActivityKind::Utility);
        assert_eq!(doc.activities[0].activation.as_ref().unwrap().cost, Some(1));

        let passive = FeatureDescriptor::new("Unarmored Defense", "", 1);
        assert!(feature_document(&passive, &origin).activities.is_empty());
    }

    #[test]
    fn limited_uses_reach_the_feat_body() {
        let origin = FeatureOrigin::standalone("Imported Feature");
        let mut veil = FeatureDescriptor::new("Ashen Veil", "", 7);
        veil.uses = Some(UsesRule {
            value: Some(1),
            max: "1".into(),
            per: "sr".into(),
        });

        let doc = feature_document(&veil, &origin);
        match &doc.system {
            DocumentBody::Feat { uses: Some(uses), .. } => {
                assert_eq!(uses.value, Some(1));
                assert_eq!(uses.max, "1");
                assert_eq!(uses.per, "sr");
            }
            other => panic!("unexpected body {other:?}"),
        }

        let passive = feature_document(&FeatureDescriptor::new("Ki", "", 2), &origin);
        assert!(matches!(passive.system, DocumentBody::Feat { uses: None, .. }));
    }

    #[test]
    fn requirements_fall_back_to_level() {
        let origin = FeatureOrigin::standalone("Imported Feature");
        let doc = feature_document(&FeatureDescriptor::new("Ki", "", 2), &origin);
        assert!(matches!(
            doc.system,
            DocumentBody::Feat { ref requirements, .. } if requirements == "Level 2"
        ));

        let mut explicit = FeatureDescriptor::new("Ki", "", 2);
        explicit.requirements = Some("Monk 2".into());
        let doc = feature_document(&explicit, &origin);
        assert!(matches!(
            doc.system,
            DocumentBody::Feat { ref requirements, .. } if requirements == "Monk 2"
        ));
    }

    #[test]
    fn non_template_targets_affect_creatures() {
        let target = TargetRule {
            value: Some(2),
            units: String::new(),
            kind: String::new(),
        };
        assert_eq!(
            activity_target(&target),
            Some(ActivityTarget::Affects {
                kind: "creature".into(),
                count: Some(2),
            })
        );
        assert_eq!(activity_target(&TargetRule::default()), None);
    }

    #[test]
    fn conditions_match_whole_words_only() {
        let effects = condition_effects("The target is Frightened and proneness is not prone-ish.");
        let names: Vec<_> = effects.iter().map(|e| e.name.as_str()).collect();
        // "prone-ish" still has a word boundary after "prone"
        assert_eq!(names, vec!["Frightened", "Prone"]);

        assert!(condition_effects("Unstunned and poisonous").is_empty());
    }

    #[test]
    fn grants_group_by_level() {
        let grants = level_grants(
            [("Fighting Style", 1), ("Second Wind", 1), ("Action Surge", 2)],
            "Class Features",
        );

        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].level, 1);
        assert_eq!(
            grants[0].item_grant().unwrap().pending,
            vec!["Fighting Style", "Second Wind"]
        );
        assert_eq!(grants[1].title.as_deref(), Some("Class Features"));
    }
}
