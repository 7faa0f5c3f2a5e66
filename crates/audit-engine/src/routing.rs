//! Field-to-section routing: which section bodies form a rule's context
//!
//! The table is versioned data (`data/section_hints.yaml`), not code, so
//! catalog vocabulary changes do not require engine changes.

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::ConfigError;

const BUILTIN_HINTS: &str = include_str!("../data/section_hints.yaml");

/// Resolves a rule's `field` to the concatenated text of its hinted
/// sections.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRouter {
    hints: BTreeMap<String, Vec<String>>,
}

impl SectionRouter {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let hints = serde_yaml::from_str(yaml)?;
        Ok(Self { hints })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn hints_for(&self, field: &str) -> Option<&[String]> {
        self.hints.get(field).map(Vec::as_slice)
    }

    /// Evaluation context for a rule:
    ///   - no field        → every section body, blank-line joined
    ///   - field with hints → the hinted sections that exist, in hint order
    ///   - field without an entry → empty text (such rules trend toward
    ///     "missing"; the coverage test below guards the builtin catalog)
    pub fn context_for(
        &self,
        sections: &BTreeMap<String, String>,
        field: Option<&str>,
    ) -> String {
        match field {
            None => sections
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Some(field) => match self.hints_for(field) {
                None => String::new(),
                Some(keys) => keys
                    .iter()
                    .filter_map(|k| sections.get(k))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            },
        }
    }
}

impl Default for SectionRouter {
    fn default() -> Self {
        Self::from_yaml_str(BUILTIN_HINTS).expect("builtin section hints must parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;
    use pretty_assertions::assert_eq;

    fn sections() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("identity".to_string(), "Owner: Jane Doe".to_string()),
            ("zoning".to_string(), "Residential zone".to_string()),
            ("method".to_string(), "Sales comparison".to_string()),
        ])
    }

    #[test]
    fn test_no_field_concatenates_everything() {
        let router = SectionRouter::default();
        let ctx = router.context_for(&sections(), None);
        assert_eq!(ctx, "Owner: Jane Doe\n\nSales comparison\n\nResidential zone");
    }

    #[test]
    fn test_field_selects_hinted_sections_in_order() {
        let router = SectionRouter::default();
        // Dates routes to [identity, method]
        let ctx = router.context_for(&sections(), Some("Dates"));
        assert_eq!(ctx, "Owner: Jane Doe\n\nSales comparison");
    }

    #[test]
    fn test_missing_hinted_sections_skipped() {
        let router = SectionRouter::default();
        // Attachments routes to [attachments], absent from the corpus
        assert_eq!(router.context_for(&sections(), Some("Attachments")), "");
    }

    #[test]
    fn test_unrouted_field_yields_empty_context() {
        let router = SectionRouter::default();
        assert_eq!(router.context_for(&sections(), Some("NoSuchField")), "");
    }

    #[test]
    fn test_builtin_catalog_fields_all_routed() {
        // Catches catalog fields that would silently evaluate against empty
        // text because the routing table has no entry for them.
        let router = SectionRouter::default();
        let catalog = RuleCatalog::builtin();
        for rule in catalog.all_rules() {
            if let Some(field) = &rule.field {
                assert!(
                    router.hints_for(field).is_some(),
                    "field '{}' (rule '{}') has no routing entry",
                    field,
                    rule.title
                );
            }
        }
    }
}
