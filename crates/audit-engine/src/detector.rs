//! Multi-signal heading detection over an extracted line corpus
//!
//! Each line is scored from four signals: font size relative to the page
//! baseline, bold emphasis, a leading enumerator, and keyword overlap with
//! the headings dictionary. Thresholds split the scored lines into heading,
//! suspect, and other; "other" never leaves the detector.

use tracing::debug;
use valuation_types::{HeadingCandidate, HeadingStatus, Line};

use crate::dictionary::HeadingsDictionary;
use crate::patterns::ENUMERATOR_PATTERN;

/// Lines longer than this are presumed paragraph body, not headings.
const MAX_HEADING_LEN: usize = 140;

/// Floor for the size-normalization denominator, so near-uniform font sizes
/// do not divide by zero.
const SIZE_DENOM_EPSILON: f64 = 1e-3;

/// Signal weights. Their sum is 1.10, not 1.0 — kept literally, since
/// renormalizing would shift the heading/suspect boundary.
const W_SIZE: f64 = 0.35;
const W_BOLD: f64 = 0.25;
const W_NUMBERED: f64 = 0.25;
const W_KEYWORD: f64 = 0.25;

/// Classification thresholds, caller-supplied and profile-selectable.
/// `strict >= suspect_low` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub strict: f64,
    pub suspect_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strict: 0.70,
            suspect_low: 0.50,
        }
    }
}

fn is_bold(font: Option<&str>, flags: Option<u32>) -> bool {
    if font
        .map(|f| f.to_lowercase().contains("bold"))
        .unwrap_or(false)
    {
        return true;
    }
    // Style flags vary by extractor; any non-zero bitmask means an
    // emphasized span in practice.
    flags.map(|f| f != 0).unwrap_or(false)
}

/// Linear-interpolated quantile of a sorted slice, `q` in [0, 1].
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Score every line and return the heading/suspect candidates, sorted by
/// (page ascending, score descending). Deterministic for fixed inputs.
pub fn detect_headings(
    lines: &[Line],
    dictionary: &HeadingsDictionary,
    thresholds: Thresholds,
) -> Vec<HeadingCandidate> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut sizes: Vec<f64> = lines.iter().map(|l| l.size).collect();
    sizes.sort_by(f64::total_cmp);
    let median = quantile(&sizes, 0.5);
    let p90 = quantile(&sizes, 0.9);
    let denom = (p90 - median).max(SIZE_DENOM_EPSILON);

    let mut candidates = Vec::new();
    for line in lines {
        let text = line.text.trim();
        if text.is_empty() || text.chars().count() > MAX_HEADING_LEN {
            continue;
        }

        let text_lc = text.to_lowercase();
        let size_norm = clamp01((line.size - median) / denom);
        let bold = if is_bold(line.font.as_deref(), line.flags) {
            1.0
        } else {
            0.0
        };
        let numbered = if ENUMERATOR_PATTERN.is_match(text) {
            1.0
        } else {
            0.0
        };
        let (canonical, kw_score) = match dictionary.best_match(&text_lc) {
            Some((key, score)) => (Some(key.to_string()), score),
            None => (None, 0.0),
        };

        let score =
            W_SIZE * size_norm + W_BOLD * bold + W_NUMBERED * numbered + W_KEYWORD * kw_score;

        let status = if score >= thresholds.strict {
            HeadingStatus::Heading
        } else if score >= thresholds.suspect_low {
            HeadingStatus::Suspect
        } else {
            continue;
        };

        candidates.push(HeadingCandidate {
            page: line.page,
            text: text.to_string(),
            font: line.font.clone(),
            size: line.size,
            score: (score * 1000.0).round() / 1000.0,
            status,
            canonical,
        });
    }

    candidates.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| b.score.total_cmp(&a.score))
    });
    debug!(
        candidates = candidates.len(),
        lines = lines.len(),
        "heading detection finished"
    );
    candidates
}
