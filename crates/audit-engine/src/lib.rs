//! Audit engine for real-estate valuation reports
//!
//! Pipeline: extracted line corpus → heading detection → section
//! segmentation → rule evaluation against section contexts → aggregated
//! verdict. All inputs are immutable and the pipeline is purely
//! functional: identical inputs produce identical results, and concurrent
//! invocations share no state.

pub mod catalog;
pub mod detector;
pub mod dictionary;
pub mod eval;
pub mod patterns;
pub mod routing;
pub mod segment;

use tracing::debug;
use valuation_types::{AuditReport, AuditResult, Finding, Line, ReportDocument};

pub use catalog::{ConfigError, Rule, RuleCatalog, RuleKind};
pub use detector::Thresholds;
pub use dictionary::HeadingsDictionary;
pub use routing::SectionRouter;

/// Per-invocation engine configuration. Explicit, never ambient: there is
/// no process-global state to toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
}

/// The audit pipeline entry point, bundling the loaded dictionary, catalog,
/// and routing table.
#[derive(Debug, Clone)]
pub struct AuditEngine {
    dictionary: HeadingsDictionary,
    catalog: RuleCatalog,
    router: SectionRouter,
    config: EngineConfig,
}

impl AuditEngine {
    pub fn new(dictionary: HeadingsDictionary, catalog: RuleCatalog) -> Self {
        Self {
            dictionary,
            catalog,
            router: SectionRouter::default(),
            config: EngineConfig::default(),
        }
    }

    /// Engine over the builtin dictionary and catalog.
    pub fn builtin() -> Self {
        Self::new(HeadingsDictionary::builtin(), RuleCatalog::builtin())
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_router(mut self, router: SectionRouter) -> Self {
        self.router = router;
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Audit a line corpus for the given asset type. An unrecognized asset
    /// type falls back to the common rules alone.
    pub fn audit(&self, lines: &[Line], asset_type: &str) -> AuditResult {
        let headings = detector::detect_headings(lines, &self.dictionary, self.config.thresholds);
        let sections = segment::group_by_section(lines, &headings);
        debug!(
            asset_type,
            headings = headings.len(),
            sections = sections.len(),
            "corpus segmented"
        );

        let mut findings: Vec<Finding> = Vec::new();
        for rule in self.catalog.queue(asset_type) {
            let base_id = rule.ensured_id();
            let severity = self.catalog.severity_of(rule);
            let context = self.router.context_for(&sections, rule.field.as_deref());
            for draft in eval::evaluate(rule, &context) {
                findings.push(Finding {
                    rule_id: draft.rule_id,
                    base_rule_id: base_id.clone(),
                    status: draft.status,
                    title: draft.title,
                    detail: draft.detail,
                    severity,
                });
            }
        }

        AuditResult::from_findings(findings)
    }

    /// Audit a wrapped document, stamping the check time.
    pub fn audit_document(&self, document: &ReportDocument, asset_type: &str) -> AuditReport {
        AuditReport {
            document_id: document.id.clone(),
            asset_type: asset_type.to_string(),
            result: self.audit(&document.lines, asset_type),
            checked_at: chrono::Utc::now().timestamp() as u64,
        }
    }
}
