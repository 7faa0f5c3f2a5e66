//! Per-kind rule evaluators and the total dispatch over them
//!
//! Every evaluator is a pure function from context text to finding drafts.
//! Dispatch never drops a rule and never errors: unknown kinds produce an
//! explicit no-op finding, invalid regexes fail open to non-matches inside
//! `patterns`.

use valuation_types::FindingStatus;

use crate::catalog::{AttachmentSpec, QualityCheck, Rule, RuleKind};
use crate::patterns::{extract_date_hits, find_all, match_token};

/// A finding before the owning rule's id and severity are stamped on.
#[derive(Debug, Clone, PartialEq)]
pub struct FindingDraft {
    pub rule_id: String,
    pub status: FindingStatus,
    pub title: String,
    pub detail: Option<String>,
}

impl FindingDraft {
    fn new(rule_id: impl Into<String>, status: FindingStatus, title: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            status,
            title: title.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

fn presence(found: bool) -> FindingStatus {
    if found {
        FindingStatus::Present
    } else {
        FindingStatus::Missing
    }
}

/// Evaluate one rule against its routed context text. Total: always yields
/// at least one draft.
pub fn evaluate(rule: &Rule, text: &str) -> Vec<FindingDraft> {
    let id = rule.ensured_id();
    match &rule.kind {
        RuleKind::RequiredFields { fields } => fields
            .iter()
            .map(|field| {
                FindingDraft::new(
                    format!("{id}:{field}"),
                    presence(match_token(field, text)),
                    format!("{} -> {}", rule.title, field),
                )
            })
            .collect(),

        RuleKind::NonemptyText => vec![FindingDraft::new(
            id,
            presence(!text.trim().is_empty()),
            &rule.title,
        )],

        RuleKind::Coexist { fields } => {
            let all = fields.iter().all(|f| match_token(f, text));
            vec![FindingDraft::new(id, presence(all), &rule.title)]
        }

        RuleKind::TableColumns { columns } => columns
            .iter()
            .map(|col| {
                FindingDraft::new(
                    format!("{id}:{col}"),
                    presence(match_token(col, text)),
                    format!("{} -> column {}", rule.title, col),
                )
            })
            .collect(),

        RuleKind::ListMinCount { row_hint, min } => {
            let count = find_all(row_hint, text).len() as u32;
            let status = if count >= *min {
                FindingStatus::Present
            } else {
                FindingStatus::Wrong
            };
            vec![FindingDraft::new(id, status, &rule.title)
                .with_detail(format!("count={count}, min={min}"))]
        }

        RuleKind::Enum { allowed } => {
            let any = allowed.iter().any(|a| match_token(a, text));
            vec![FindingDraft::new(id, presence(any), &rule.title)]
        }

        RuleKind::Flags { flags, optional } => flags
            .iter()
            .map(|flag| {
                let status = if match_token(flag, text) {
                    FindingStatus::Present
                } else if *optional {
                    FindingStatus::OptionalAbsent
                } else {
                    FindingStatus::Missing
                };
                FindingDraft::new(
                    format!("{id}:{flag}"),
                    status,
                    format!("{} -> {}", rule.title, flag),
                )
            })
            .collect(),

        RuleKind::DateTriplet => eval_date_triplet(&id, &rule.title, text),

        RuleKind::AttachmentsCheck { attachments } => eval_attachments(&id, attachments, text),

        RuleKind::QualityRules { checks } => eval_quality(&id, checks, text),

        RuleKind::Legacy { kind } => {
            vec![
                FindingDraft::new(id, presence(!text.trim().is_empty()), &rule.title)
                    .with_detail(format!("type={kind} (partial check)")),
            ]
        }

        RuleKind::Unknown { kind } => vec![FindingDraft::new(
            id,
            FindingStatus::Present,
            format!("{} (unsupported type: {})", rule.title, kind),
        )],
    }
}

const DATE_LABELS: [&str; 3] = ["request", "inspection", "report"];

/// A label counts as found when the word occurs anywhere in the context AND
/// the context contains at least one date token anywhere. No positional
/// correlation between label and date is attempted.
fn eval_date_triplet(id: &str, title: &str, text: &str) -> Vec<FindingDraft> {
    let dates = extract_date_hits(text);
    let found: Vec<bool> = DATE_LABELS
        .iter()
        .map(|label| !dates.is_empty() && !find_all(&format!(r"\b{label}\b"), text).is_empty())
        .collect();
    let all = found.iter().all(|f| *f);
    let detail = format!(
        "request={}, inspection={}, report={}, dates={}",
        found[0],
        found[1],
        found[2],
        dates.len()
    );
    vec![FindingDraft::new(id, presence(all), title).with_detail(detail)]
}

fn eval_attachments(id: &str, spec: &AttachmentSpec, text: &str) -> Vec<FindingDraft> {
    let mut out = Vec::new();
    for name in &spec.required {
        out.push(FindingDraft::new(
            format!("{id}:{name}"),
            presence(match_token(name, text)),
            format!("Required attachment: {name}"),
        ));
    }
    for name in &spec.optional {
        let status = if match_token(name, text) {
            FindingStatus::Present
        } else {
            FindingStatus::OptionalAbsent
        };
        out.push(FindingDraft::new(
            format!("{id}:{name}"),
            status,
            format!("Optional attachment: {name}"),
        ));
    }
    out
}

fn eval_quality(id: &str, checks: &[QualityCheck], text: &str) -> Vec<FindingDraft> {
    let mut out = Vec::new();
    for check in checks {
        match check.kind.as_str() {
            "forbid_terms" => {
                let bad: Vec<&str> = check
                    .terms
                    .iter()
                    .filter(|t| match_token(t, text))
                    .map(String::as_str)
                    .collect();
                let status = if bad.is_empty() {
                    FindingStatus::Present
                } else {
                    FindingStatus::Wrong
                };
                out.push(
                    FindingDraft::new(format!("{id}:forbid_terms"), status, "Forbidden wording")
                        .with_detail(bad.join(", ")),
                );
            }
            "date_format" => {
                // Existence check only for now; format validation pending.
                let any = !extract_date_hits(text).is_empty();
                out.push(FindingDraft::new(
                    format!("{id}:date"),
                    presence(any),
                    "Date format (heuristic)",
                ));
            }
            other => out.push(FindingDraft::new(
                format!("{id}:{other}"),
                FindingStatus::Present,
                format!("Not yet supported: {other}"),
            )),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, title: &str, kind: RuleKind) -> Rule {
        Rule {
            id: Some(id.to_string()),
            title: title.to_string(),
            field: None,
            severity: None,
            kind,
        }
    }

    #[test]
    fn test_required_fields_one_finding_per_field() {
        let r = rule(
            "R1",
            "Identity",
            RuleKind::RequiredFields {
                fields: vec!["A".to_string(), "B".to_string()],
            },
        );
        let drafts = evaluate(&r, "only the word A appears");
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].rule_id, "R1:A");
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(drafts[1].rule_id, "R1:B");
        assert_eq!(drafts[1].status, FindingStatus::Missing);
    }

    #[test]
    fn test_nonempty_text() {
        let r = rule("R2", "Zoning", RuleKind::NonemptyText);
        assert_eq!(evaluate(&r, "zoned")[0].status, FindingStatus::Present);
        assert_eq!(evaluate(&r, "  \n ")[0].status, FindingStatus::Missing);
    }

    #[test]
    fn test_coexist_requires_all() {
        let r = rule(
            "R3",
            "Owner and share",
            RuleKind::Coexist {
                fields: vec!["Owner".to_string(), "Share".to_string()],
            },
        );
        assert_eq!(
            evaluate(&r, "Owner: Jane, Share: 1/2")[0].status,
            FindingStatus::Present
        );
        assert_eq!(
            evaluate(&r, "Owner: Jane only")[0].status,
            FindingStatus::Missing
        );
    }

    #[test]
    fn test_table_columns_per_column() {
        let r = rule(
            "T1",
            "Comparable table",
            RuleKind::TableColumns {
                columns: vec!["Area".to_string(), "Unit price".to_string()],
            },
        );
        let drafts = evaluate(&r, "Area | Price");
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(drafts[1].status, FindingStatus::Missing);
        assert_eq!(drafts[1].rule_id, "T1:Unit price");
    }

    #[test]
    fn test_list_min_count_states_count_and_min() {
        let r = rule(
            "C1",
            "Comparables",
            RuleKind::ListMinCount {
                row_hint: "(Comparable|Similar)".to_string(),
                min: 2,
            },
        );
        let text = "Comparable 1 ... Comparable 2 ... Similar listing";
        let drafts = evaluate(&r, text);
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(drafts[0].detail.as_deref(), Some("count=3, min=2"));

        let drafts = evaluate(&r, "Comparable 1 only");
        assert_eq!(drafts[0].status, FindingStatus::Wrong);
        assert_eq!(drafts[0].detail.as_deref(), Some("count=1, min=2"));
    }

    #[test]
    fn test_enum_any_allowed_token() {
        let r = rule(
            "E1",
            "Marketability",
            RuleKind::Enum {
                allowed: vec!["marketable".to_string(), "not marketable".to_string()],
            },
        );
        assert_eq!(
            evaluate(&r, "the asset is marketable")[0].status,
            FindingStatus::Present
        );
        assert_eq!(
            evaluate(&r, "no assessment given")[0].status,
            FindingStatus::Missing
        );
    }

    #[test]
    fn test_flags_required_vs_optional() {
        let required = rule(
            "F1",
            "Risks",
            RuleKind::Flags {
                flags: vec!["earthquake".to_string()],
                optional: false,
            },
        );
        assert_eq!(evaluate(&required, "")[0].status, FindingStatus::Missing);

        let optional = rule(
            "F2",
            "Restrictions",
            RuleKind::Flags {
                flags: vec!["easement".to_string()],
                optional: true,
            },
        );
        assert_eq!(
            evaluate(&optional, "")[0].status,
            FindingStatus::OptionalAbsent
        );
        assert_eq!(
            evaluate(&optional, "an easement exists")[0].status,
            FindingStatus::Present
        );
    }

    #[test]
    fn test_date_triplet_needs_all_labels_and_a_date() {
        let r = rule("D1", "Report dates", RuleKind::DateTriplet);
        let ok = "request 01.02.2024, inspection 03.02.2024, report 05.02.2024";
        assert_eq!(evaluate(&r, ok)[0].status, FindingStatus::Present);

        // A label without any date in the context fails the triplet.
        let no_dates = "request, inspection and report are all mentioned";
        let drafts = evaluate(&r, no_dates);
        assert_eq!(drafts[0].status, FindingStatus::Missing);
        assert!(drafts[0].detail.as_deref().unwrap().contains("dates=0"));

        // One label plus dates elsewhere is still not enough.
        let partial = "request 01.02.2024 and report 05.02.2024";
        assert_eq!(evaluate(&r, partial)[0].status, FindingStatus::Missing);
    }

    #[test]
    fn test_attachments_required_and_optional() {
        let r = rule(
            "A1",
            "Attachments",
            RuleKind::AttachmentsCheck {
                attachments: AttachmentSpec {
                    required: vec!["photographs".to_string(), "title deed copy".to_string()],
                    optional: vec!["zoning certificate".to_string()],
                },
            },
        );
        let drafts = evaluate(&r, "photographs attached");
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(drafts[1].status, FindingStatus::Missing);
        assert_eq!(drafts[2].status, FindingStatus::OptionalAbsent);
        assert_eq!(drafts[2].title, "Optional attachment: zoning certificate");
    }

    #[test]
    fn test_quality_forbid_terms_lists_matches() {
        let r = rule(
            "Q1",
            "Quality",
            RuleKind::QualityRules {
                checks: vec![
                    QualityCheck {
                        kind: "forbid_terms".to_string(),
                        terms: vec!["approximately".to_string(), "roughly".to_string()],
                    },
                    QualityCheck {
                        kind: "date_format".to_string(),
                        terms: vec![],
                    },
                ],
            },
        );
        let drafts = evaluate(&r, "the area is approximately 500 sqm, signed 01.02.2024");
        assert_eq!(drafts[0].status, FindingStatus::Wrong);
        assert_eq!(drafts[0].detail.as_deref(), Some("approximately"));
        assert_eq!(drafts[1].status, FindingStatus::Present);
    }

    #[test]
    fn test_quality_unknown_subkind_marked_unsupported() {
        let r = rule(
            "Q2",
            "Quality",
            RuleKind::QualityRules {
                checks: vec![QualityCheck {
                    kind: "unit_consistency".to_string(),
                    terms: vec![],
                }],
            },
        );
        let drafts = evaluate(&r, "whatever");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(drafts[0].title, "Not yet supported: unit_consistency");
    }

    #[test]
    fn test_legacy_kind_presence_level() {
        let r = rule(
            "L1",
            "Insurance value calculation",
            RuleKind::Legacy {
                kind: "separate_calc".to_string(),
            },
        );
        let drafts = evaluate(&r, "insurance value computed separately");
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert_eq!(
            drafts[0].detail.as_deref(),
            Some("type=separate_calc (partial check)")
        );
        assert_eq!(evaluate(&r, "")[0].status, FindingStatus::Missing);
    }

    #[test]
    fn test_unknown_kind_is_a_safe_no_op() {
        let r = rule(
            "U1",
            "Mystery rule",
            RuleKind::Unknown {
                kind: "foobar".to_string(),
            },
        );
        let drafts = evaluate(&r, "anything at all");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].status, FindingStatus::Present);
        assert!(drafts[0].title.contains("foobar"));
    }
}
