//! Regex fallbacks for information the model failed to emit as fields.

use std::sync::LazyLock;

use chronicle_domain::{DamageEntry, TraitDescriptor};
use regex_lite::Regex;

static SKILL_CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:choose|select|pick|proficiency\s+in)\s+(?:any\s+)?(\d+|one|two|three|four)\s+skills?")
        .expect("valid regex")
});

static DAMAGE_PROSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d*d\d+)[^.]*?\b(acid|bludgeoning|cold|fire|force|lightning|necrotic|piercing|poison|psychic|radiant|slashing|thunder)\s+damage",
    )
    .expect("valid regex")
});

/// A skill choice found in trait prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillChoiceHit {
    pub count: u32,
    pub trait_name: String,
}

fn count_word(raw: &str) -> u32 {
    raw.parse().unwrap_or_else(|_| match raw.to_lowercase().as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        _ => 0,
    })
}

/// First trait whose description offers a positive skill choice.
pub fn scan_skill_choice(traits: &[TraitDescriptor]) -> Option<SkillChoiceHit> {
    traits.iter().find_map(|t| {
        let caps = SKILL_CHOICE_RE.captures(&t.description)?;
        let count = count_word(caps.get(1)?.as_str());
        (count > 0).then(|| SkillChoiceHit {
            count,
            trait_name: t.name.clone(),
        })
    })
}

/// First "XdY <type> damage" phrase in `text`.
pub fn damage_from_prose(text: &str) -> Option<DamageEntry> {
    let caps = DAMAGE_PROSE_RE.captures(text)?;
    Some(DamageEntry::new(
        caps.get(1)?.as_str().to_lowercase(),
        caps.get(2)?.as_str().to_lowercase(),
    ))
}
