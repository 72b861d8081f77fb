//! Source text cleanup and HTML helpers.

use std::sync::LazyLock;

use regex_lite::Regex;

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip `[PHB]`-style citation tags, normalize CRLF, collapse blank-line runs.
pub fn clean_source_text(text: &str) -> String {
    let without_tags = CITATION_RE.replace_all(text, "");
    let unix = without_tags.replace("\r\n", "\n");
    BLANK_RUN_RE.replace_all(&unix, "\n\n").into_owned()
}

/// Wrap plain text as HTML paragraphs; text already starting with a tag is kept.
pub fn html_paragraphs(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    format!(
        "<p>{}</p>",
        trimmed.replace("\n\n", "</p><p>").replace('\n', "<br>")
    )
}

/// `"The Faceless One"` -> `"the-faceless-one"`.
pub fn slug(name: &str) -> String {
    NON_SLUG_RE
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Lower-case with whitespace runs turned into dashes (`"Dragon Born"` -> `"dragon-born"`).
pub fn dashed_identifier(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_removes_citations_and_blank_runs() {
        let raw = "Magma Mastery [XGE]\r\nAs an action [p. 12]...\r\n\r\n\r\n\r\nLevel 6";
        assert_eq!(clean_source_text(raw), "Magma Mastery \nAs an action ...\n\nLevel 6");
    }

    #[test]
    fn citation_match_is_not_greedy() {
        assert_eq!(clean_source_text("[A] keep [B]"), " keep ");
    }

    #[test]
    fn paragraphs_wrap_plain_text_only() {
        assert_eq!(
            html_paragraphs("First.\n\nSecond line\nthird"),
            "<p>First.</p><p>Second line<br>third</p>"
        );
        assert_eq!(html_paragraphs("<p>Already</p>"), "<p>Already</p>");
    }

    #[test]
    fn identifiers() {
        assert_eq!(slug("The Faceless One!"), "the-faceless-one");
        assert_eq!(dashed_identifier("Hill  Dwarf"), "hill-dwarf");
    }
}
