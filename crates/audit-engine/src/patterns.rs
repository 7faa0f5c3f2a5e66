//! Shared matching primitives for heading detection and rule evaluation

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    /// Leading enumerator such as "1. ", "2.3 " or "4.1.2) "
    pub static ref ENUMERATOR_PATTERN: Regex = Regex::new(r"^\s*\d+(\.\d+)*[.)]?\s+").unwrap();

    /// Date tokens: ISO (2024-01-31) or day-first with ./-/ separators (31.01.2024)
    static ref DATE_PATTERN: Regex =
        Regex::new(r"(\d{4}-\d{2}-\d{2})|(\d{2}[./-]\d{2}[./-]\d{4})").unwrap();
}

/// Prefix marking a match spec as a raw regex rather than a literal.
pub const REGEX_MARKER: &str = "re:";

fn build_insensitive(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .ok()
}

/// All matches of `pattern` in `text`, case-insensitive and multi-line.
/// An invalid pattern yields no matches rather than an error.
pub fn find_all<'t>(pattern: &str, text: &'t str) -> Vec<regex::Match<'t>> {
    match build_insensitive(pattern) {
        Some(re) => re.find_iter(text).collect(),
        None => Vec::new(),
    }
}

fn has_any_literal<'a, I>(words: I, text: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    words.into_iter().filter(|w| !w.is_empty()).any(|w| {
        let pattern = format!(r"\b{}\b", regex::escape(w));
        build_insensitive(&pattern)
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    })
}

/// Flexible field matching, used by every evaluator:
///   - `re:...`  → search as a case-insensitive, multi-line regex
///   - `a|b|c`   → any of the alternatives as a whole-word literal
///   - otherwise → a single whole-word literal
///
/// Invalid regexes and empty specs are non-matches, never errors.
pub fn match_token(spec: &str, text: &str) -> bool {
    let spec = spec.trim();
    if spec.is_empty() {
        return false;
    }
    if let Some(pattern) = spec.strip_prefix(REGEX_MARKER) {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return false;
        }
        return build_insensitive(pattern)
            .map(|re| re.is_match(text))
            .unwrap_or(false);
    }
    if spec.contains('|') {
        return has_any_literal(spec.split('|').map(str::trim), text);
    }
    has_any_literal([spec], text)
}

/// Extract every date-like token from `text`.
pub fn extract_date_hits(text: &str) -> Vec<&str> {
    DATE_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}
