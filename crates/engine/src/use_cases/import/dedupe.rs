//! Merge repeated extractions of the same feature.
//!
//! Models often summarize a feature in an overview table and then describe it
//! in full further down. Entries are keyed by exact name; the longer
//! description wins and a tie keeps the first one seen. The surviving entry
//! takes the position of the first occurrence.

use std::collections::HashMap;

use chronicle_domain::{FeatureDescriptor, TraitDescriptor};

/// Something with a name and a description worth comparing.
pub trait Described {
    fn name(&self) -> &str;
    fn description_len(&self) -> usize;
}

impl Described for FeatureDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description_len(&self) -> usize {
        FeatureDescriptor::description_len(self)
    }
}

impl Described for TraitDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description_len(&self) -> usize {
        self.description.chars().count()
    }
}

/// Keep one entry per name, preferring the richer description.
pub fn dedupe_by_name<T: Described>(items: Vec<T>) -> Vec<T> {
    let mut slots: Vec<T> = Vec::with_capacity(items.len());
    let mut position: HashMap<String, usize> = HashMap::new();

    for item in items {
        match position.get(item.name()) {
            Some(&idx) => {
                if item.description_len() > slots[idx].description_len() {
                    tracing::debug!(name = %item.name(), "Replacing shorter duplicate");
                    slots[idx] = item;
                }
            }
            None => {
                position.insert(item.name().to_string(), slots.len());
                slots.push(item);
            }
        }
    }
    slots
}

/// Dedupe features and order them by level (stable within a level).
pub fn dedupe_features(features: Vec<FeatureDescriptor>) -> Vec<FeatureDescriptor> {
    let mut features = dedupe_by_name(features);
    features.sort_by_key(|f| f.level);
    features
}

pub fn dedupe_traits(traits: Vec<TraitDescriptor>) -> Vec<TraitDescriptor> {
    dedupe_by_name(traits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_description_wins() {
        let short = FeatureDescriptor::new("Magma Mastery", "x".repeat(40), 3);
        let long = FeatureDescriptor::new("Magma Mastery", "y".repeat(120), 3);

        let result = dedupe_features(vec![short, long]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].description_len(), 120);
    }

    #[test]
    fn tie_keeps_first_and_its_position() {
        let features = vec![
            FeatureDescriptor::new("A", "first", 1),
            FeatureDescriptor::new("B", "bbb", 1),
            FeatureDescriptor::new("A", "secnd", 1),
        ];

        let result = dedupe_features(features);

        let names: Vec<_> = result.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(result[0].description, "first");
    }

    #[test]
    fn sorted_by_level_stably() {
        let features = vec![
            FeatureDescriptor::new("Late", "", 6),
            FeatureDescriptor::new("Early B", "", 1),
            FeatureDescriptor::new("Early A", "", 1),
        ];

        let names: Vec<_> = dedupe_features(features)
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(names, vec!["Early B", "Early A", "Late"]);
    }

    #[test]
    fn traits_keep_extraction_order() {
        let traits = vec![
            TraitDescriptor::new("Darkvision", "short"),
            TraitDescriptor::new("Claws", "Your claws are natural weapons."),
            TraitDescriptor::new("Darkvision", "You can see in dim light within 60 feet."),
        ];

        let result = dedupe_traits(traits);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Darkvision");
        assert!(result[0].description.contains("60 feet"));
    }
}
