//! Section segmentation: classified headings become boundaries that
//! partition the line corpus into canonical section bodies.

use std::collections::BTreeMap;

use tracing::warn;
use valuation_types::{HeadingCandidate, Line};

/// Partition the corpus into section bodies keyed by canonical section.
///
/// Each candidate with a canonical key is re-located in the corpus: the
/// first line on its page whose trimmed text equals the candidate's text
/// marks the boundary. A candidate whose text cannot be found on its
/// claimed page contributes nothing. The k-th boundary's body is every
/// non-empty line strictly between it and the next boundary (end of corpus
/// for the last), newline-joined. A key seen more than once accumulates
/// its bodies in occurrence order, separated by a blank line. Lines before
/// the first boundary belong to no section.
pub fn group_by_section(
    lines: &[Line],
    headings: &[HeadingCandidate],
) -> BTreeMap<String, String> {
    let mut index_by_page: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, line) in lines.iter().enumerate() {
        index_by_page.entry(line.page).or_default().push(i);
    }

    // (corpus index, canonical key) per relocated heading occurrence
    let mut occurrences: Vec<(usize, &str)> = Vec::new();
    for h in headings {
        let Some(canonical) = h.canonical.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let text = h.text.trim();
        let located = index_by_page
            .get(&h.page)
            .into_iter()
            .flatten()
            .find(|&&i| lines[i].text.trim() == text);
        match located {
            Some(&i) => occurrences.push((i, canonical)),
            None => warn!(page = h.page, text, "heading not found on claimed page"),
        }
    }
    occurrences.sort_by_key(|(i, _)| *i);

    let mut bodies: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, &(start, canonical)) in occurrences.iter().enumerate() {
        let end = occurrences
            .get(k + 1)
            .map(|&(i, _)| i)
            .unwrap_or(lines.len());
        // Two candidates can relocate to the same index (a heading repeated
        // verbatim on one page); the first one's span is then empty.
        let body: Vec<&str> = lines
            .get(start + 1..end)
            .unwrap_or(&[])
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !body.is_empty() {
            bodies
                .entry(canonical.to_string())
                .or_default()
                .push(body.join("\n"));
        }
    }

    bodies
        .into_iter()
        .map(|(k, parts)| (k, parts.join("\n\n")))
        .collect()
}
