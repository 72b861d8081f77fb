//! Import configuration.
//!
//! Read once per run from the environment (after `.env` is loaded) and passed
//! explicitly to the pipeline. Nothing downstream reads the environment.

use chronicle_domain::{DomainKind, RulesetFlavor};

use crate::infrastructure::ollama::{
    DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_TIMEOUT_SECS,
};

/// Model server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt; 0 disables the retry wrapper.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: DEFAULT_OLLAMA_TIMEOUT_SECS,
            max_retries: 0,
        }
    }
}

/// Library collection identifiers, one per document family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTargets {
    pub species: String,
    /// Species traits; falls back to `species` when unset in the environment.
    pub traits: String,
    pub classes: String,
    pub subclasses: String,
    pub features: String,
    pub spells: String,
    pub actors: String,
}

impl Default for CollectionTargets {
    fn default() -> Self {
        Self {
            species: "world.chronicle-keeper-species".to_string(),
            traits: "world.chronicle-keeper-species".to_string(),
            classes: "world.chronicle-keeper-classes".to_string(),
            subclasses: "world.chronicle-keeper-subclasses".to_string(),
            features: "world.chronicle-keeper-features".to_string(),
            spells: "world.chronicle-keeper-spells".to_string(),
            actors: "world.chronicle-keeper-actors".to_string(),
        }
    }
}

impl CollectionTargets {
    /// Collection receiving the primary document of `kind`.
    pub fn primary_for(&self, kind: DomainKind) -> &str {
        match kind {
            DomainKind::Species => &self.species,
            DomainKind::Class => &self.classes,
            DomainKind::Subclass => &self.subclasses,
            DomainKind::Spell => &self.spells,
            DomainKind::Monster => &self.actors,
            DomainKind::Feature => &self.features,
        }
    }

    /// Collection receiving auxiliary documents of `kind`.
    pub fn auxiliary_for(&self, kind: DomainKind) -> &str {
        match kind {
            DomainKind::Species => &self.traits,
            _ => &self.features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportConfig {
    pub llm: LlmConfig,
    pub collections: CollectionTargets,
    pub ruleset: RulesetFlavor,
}

impl ImportConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let llm = LlmConfig {
            base_url: get("OLLAMA_BASE_URL")
                .or_else(|| get("OLLAMA_URL"))
                .unwrap_or(defaults.llm.base_url),
            model: get("OLLAMA_MODEL").unwrap_or(defaults.llm.model),
            timeout_secs: parse_or(
                get("OLLAMA_TIMEOUT_SECS"),
                "OLLAMA_TIMEOUT_SECS",
                defaults.llm.timeout_secs,
            ),
            max_retries: parse_or(
                get("OLLAMA_MAX_RETRIES"),
                "OLLAMA_MAX_RETRIES",
                defaults.llm.max_retries,
            ),
        };

        let species = get("CHRONICLE_SPECIES_COLLECTION").unwrap_or(defaults.collections.species);
        let collections = CollectionTargets {
            traits: get("CHRONICLE_TRAITS_COLLECTION").unwrap_or_else(|| species.clone()),
            species,
            classes: get("CHRONICLE_CLASS_COLLECTION").unwrap_or(defaults.collections.classes),
            subclasses: get("CHRONICLE_SUBCLASS_COLLECTION")
                .unwrap_or(defaults.collections.subclasses),
            features: get("CHRONICLE_FEATURE_COLLECTION").unwrap_or(defaults.collections.features),
            spells: get("CHRONICLE_SPELL_COLLECTION").unwrap_or(defaults.collections.spells),
            actors: get("CHRONICLE_ACTOR_COLLECTION").unwrap_or(defaults.collections.actors),
        };

        let ruleset = match get("CHRONICLE_RULESET") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, value = %raw, "Unknown CHRONICLE_RULESET, using dnd5e");
                RulesetFlavor::Dnd5e
            }),
            None => RulesetFlavor::Dnd5e,
        };

        Self {
            llm,
            collections,
            ruleset,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "Invalid numeric setting, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ImportConfig::from_lookup(lookup(&[]));

        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.ruleset, RulesetFlavor::Dnd5e);
        // Traits share the species collection unless configured separately
        assert_eq!(config.collections.traits, config.collections.species);
    }

    #[test]
    fn reads_overrides() {
        let config = ImportConfig::from_lookup(lookup(&[
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("OLLAMA_MODEL", "qwen2.5:14b"),
            ("OLLAMA_TIMEOUT_SECS", "300"),
            ("OLLAMA_MAX_RETRIES", "2"),
            ("CHRONICLE_RULESET", "pf2e"),
            ("CHRONICLE_TRAITS_COLLECTION", "world.my-traits"),
        ]));

        assert_eq!(config.llm.base_url, "http://gpu-box:11434");
        assert_eq!(config.llm.model, "qwen2.5:14b");
        assert_eq!(config.llm.timeout_secs, 300);
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.ruleset, RulesetFlavor::Pf2e);
        assert_eq!(config.collections.traits, "world.my-traits");
    }

    #[test]
    fn bad_values_fall_back() {
        let config = ImportConfig::from_lookup(lookup(&[
            ("OLLAMA_TIMEOUT_SECS", "soon"),
            ("CHRONICLE_RULESET", "gurps"),
            ("OLLAMA_MODEL", "   "),
        ]));

        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.ruleset, RulesetFlavor::Dnd5e);
        assert_eq!(config.llm.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn routes_collections_by_kind() {
        let targets = CollectionTargets::default();
        assert_eq!(targets.primary_for(DomainKind::Monster), targets.actors);
        assert_eq!(targets.auxiliary_for(DomainKind::Species), targets.traits);
        assert_eq!(targets.auxiliary_for(DomainKind::Subclass), targets.features);
    }
}
