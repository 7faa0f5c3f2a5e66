//! Headings dictionary: canonical section keys and their keyword variants

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::ConfigError;

/// Default dictionary shipped with the engine.
const BUILTIN_DICTIONARY: &str = include_str!("../data/headings.yaml");

/// Immutable mapping of canonical section key to keyword variants.
///
/// Keys are ordered (BTreeMap) so that scoring ties resolve the same way on
/// every run. A variant value may be written as a single string in YAML;
/// it is normalized to a one-element list at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadingsDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl HeadingsDictionary {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, OneOrMany> = serde_yaml::from_str(yaml)?;
        let entries = raw
            .into_iter()
            .map(|(key, value)| {
                let variants = match value {
                    OneOrMany::One(s) => vec![s],
                    OneOrMany::Many(v) => v,
                };
                (key, variants)
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The dictionary embedded in the crate.
    pub fn builtin() -> Self {
        Self::from_yaml_str(BUILTIN_DICTIONARY).expect("builtin headings dictionary must parse")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Best keyword match for an already-lowercased line: counts how many
    /// variants of each key occur as substrings and converts the hit count
    /// to a score capped at 1.0. Returns the highest-scoring key.
    pub fn best_match(&self, text_lc: &str) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (key, variants) in self.iter() {
            let hits = variants
                .iter()
                .filter(|v| !v.is_empty() && text_lc.contains(v.to_lowercase().as_str()))
                .count();
            if hits == 0 {
                continue;
            }
            // Cap so a key with many short variants cannot dominate.
            let score = (0.35 + 0.15 * hits as f64).min(1.0);
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((key, score));
            }
        }
        best
    }
}
