//! Resolves item-grant names to library references.

use chronicle_domain::{DocumentRef, DocumentSpec};

use crate::infrastructure::ports::IndexEntry;

/// One way of matching a pending name against known documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Case-insensitive exact name among documents written in this run.
    CreatedExact,
    /// Case-insensitive exact name in the pre-existing collection index.
    ExistingExact,
    /// Alphanumeric-only lower-case forms, one containing the other.
    Fuzzy,
}

/// Documents a linker may point grants at.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    pub created: Vec<IndexEntry>,
    pub existing: Vec<IndexEntry>,
    /// Whether the pre-existing index takes part in matching.
    pub use_existing: bool,
}

impl LinkIndex {
    pub fn created(created: Vec<IndexEntry>) -> Self {
        Self {
            created,
            ..Self::default()
        }
    }

    pub fn with_existing(mut self, existing: Vec<IndexEntry>) -> Self {
        self.existing = existing;
        self.use_existing = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// `(name, reference)` for every resolved grant entry.
    pub resolved: Vec<(String, DocumentRef)>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Linker {
    tiers: Vec<MatchTier>,
}

impl Default for Linker {
    fn default() -> Self {
        Self::new(vec![
            MatchTier::CreatedExact,
            MatchTier::ExistingExact,
            MatchTier::Fuzzy,
        ])
    }
}

impl Linker {
    /// Tiers are tried in order; the first match wins.
    pub fn new(tiers: Vec<MatchTier>) -> Self {
        Self { tiers }
    }

    /// Move every resolvable pending grant name on `document` into its item list.
    pub fn link(&self, document: &mut DocumentSpec, index: &LinkIndex) -> LinkReport {
        let mut report = LinkReport::default();

        for advancement in &mut document.advancement {
            let Some(grant) = advancement.item_grant_mut() else {
                continue;
            };
            let mut still_pending = Vec::new();
            for name in std::mem::take(&mut grant.pending) {
                match self.resolve(&name, index) {
                    Some((tier, reference)) => {
                        tracing::debug!(name = %name, ?tier, reference = %reference, "Linked grant item");
                        grant.items.push(reference.clone());
                        report.resolved.push((name, reference));
                    }
                    None => {
                        tracing::warn!(
                            owner = %document.name,
                            name = %name,
                            "No document matches granted item"
                        );
                        report.unresolved.push(name.clone());
                        still_pending.push(name);
                    }
                }
            }
            grant.pending = still_pending;
        }
        report
    }

    fn resolve(&self, name: &str, index: &LinkIndex) -> Option<(MatchTier, DocumentRef)> {
        self.tiers.iter().find_map(|tier| {
            let found = match tier {
                MatchTier::CreatedExact => exact(name, &index.created),
                MatchTier::ExistingExact if index.use_existing => exact(name, &index.existing),
                MatchTier::ExistingExact => None,
                MatchTier::Fuzzy => fuzzy(name, &index.created).or_else(|| {
                    index
                        .use_existing
                        .then(|| fuzzy(name, &index.existing))
                        .flatten()
                }),
            };
            found.map(|reference| (*tier, reference))
        })
    }
}

fn exact(name: &str, entries: &[IndexEntry]) -> Option<DocumentRef> {
    let needle = name.trim();
    entries
        .iter()
        .find(|e| e.name.trim().eq_ignore_ascii_case(needle))
        .map(|e| e.reference.clone())
}

fn fuzzy(name: &str, entries: &[IndexEntry]) -> Option<DocumentRef> {
    let needle = match_form(name);
    if needle.is_empty() {
        return None;
    }
    entries
        .iter()
        .find(|e| {
            let candidate = match_form(&e.name);
            !candidate.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
        })
        .map(|e| e.reference.clone())
}

/// Lower-case ASCII letters and digits only.
fn match_form(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::{icons, Advancement, DocumentBody, DocumentType, Movement, Senses};

    fn entry(name: &str, key: &str) -> IndexEntry {
        IndexEntry::new(name, DocumentRef::new(format!("Compendium.test.Item.{key}")))
    }

    fn granting(names: &[&str]) -> DocumentSpec {
        let mut doc = DocumentSpec::new(
            "Tabaxi",
            DocumentType::Race,
            icons::MYSTERY_MAN,
            DocumentBody::Race {
                identifier: "tabaxi".into(),
                creature_type: "humanoid".into(),
                movement: Movement::default(),
                senses: Senses::default(),
            },
        );
        doc.advancement = names
            .iter()
            .map(|n| Advancement::pending_items(0, *n, vec![n.to_string()]))
            .collect();
        doc
    }

    #[test]
    fn exact_match_ignores_case() {
        let mut doc = granting(&["Darkvision"]);
        let index = LinkIndex::created(vec![entry("darkvision", "a")]);

        let report = Linker::default().link(&mut doc, &index);

        assert!(report.unresolved.is_empty());
        let grant = doc.advancement[0].item_grant().unwrap();
        assert_eq!(grant.items[0].as_str(), "Compendium.test.Item.a");
        assert!(grant.pending.is_empty());
    }

    #[test]
    fn exact_beats_fuzzy_and_created_beats_existing() {
        let mut doc = granting(&["Claws"]);
        let index = LinkIndex::created(vec![entry("Sharp Claws", "fuzzy"), entry("Claws", "made")])
            .with_existing(vec![entry("Claws", "old")]);

        Linker::default().link(&mut doc, &index);

        assert_eq!(
            doc.advancement[0].item_grant().unwrap().items[0].as_str(),
            "Compendium.test.Item.made"
        );
    }

    #[test]
    fn existing_index_only_when_enabled() {
        let existing = vec![entry("Tentacle of the Deeps", "old")];

        let mut doc = granting(&["Tentacle of the Deeps"]);
        let disabled = LinkIndex {
            existing: existing.clone(),
            ..LinkIndex::default()
        };
        let report = Linker::default().link(&mut doc, &disabled);
        assert_eq!(report.unresolved, vec!["Tentacle of the Deeps"]);

        let mut doc = granting(&["Tentacle of the Deeps"]);
        let report = Linker::default().link(&mut doc, &LinkIndex::default().with_existing(existing));
        assert_eq!(report.resolved.len(), 1);
    }

    #[test]
    fn fuzzy_matches_punctuation_variants() {
        let mut doc = granting(&["Cat's Claws"]);
        let index = LinkIndex::created(vec![entry("Cats Claws (Natural Weapon)", "c")]);

        let report = Linker::default().link(&mut doc, &index);

        assert_eq!(report.resolved[0].1.as_str(), "Compendium.test.Item.c");
    }

    #[test]
    fn unresolved_names_stay_pending() {
        let mut doc = granting(&["Mimicry", "???"]);
        let index = LinkIndex::created(vec![entry("Darkvision", "a"), entry("!!!", "b")]);

        let report = Linker::default().link(&mut doc, &index);

        assert_eq!(report.unresolved, vec!["Mimicry", "???"]);
        assert_eq!(doc.advancement[1].item_grant().unwrap().pending, vec!["???"]);
    }

    #[test]
    fn exact_only_linker_skips_fuzzy() {
        let mut doc = granting(&["Cat's Claws"]);
        let index = LinkIndex::created(vec![entry("Cats Claws", "c")]);

        let report = Linker::new(vec![MatchTier::CreatedExact]).link(&mut doc, &index);

        assert_eq!(report.unresolved.len(), 1);
    }
}
