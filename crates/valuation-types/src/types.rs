/// One text span extracted from a valuation report PDF, in reading order.
///
/// Produced by an external extractor; pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Line {
    pub page: u32,
    pub text: String,
    pub font: Option<String>,
    pub size: f64,
    pub flags: Option<u32>,
    pub bbox: Option<[f64; 4]>,
}

impl Line {
    pub fn new(page: u32, text: impl Into<String>, size: f64) -> Self {
        Self {
            page,
            text: text.into(),
            font: None,
            size,
            flags: None,
            bbox: None,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = Some(flags);
        self
    }
}

/// A valuation report as handed over by the PDF extraction collaborator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportDocument {
    pub id: String,
    pub filename: String,
    pub pages: u32,
    pub lines: Vec<Line>,
    pub created_at: u64,
}

impl ReportDocument {
    pub fn new(filename: impl Into<String>, pages: u32, lines: Vec<Line>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            pages,
            lines,
            created_at: chrono::Utc::now().timestamp() as u64,
        }
    }
}

/// Classification of a scored heading line. Lines scoring below the suspect
/// threshold never leave the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStatus {
    Heading,
    Suspect,
}

/// A line hypothesized to be a section title, with its composite score and
/// the canonical section key matched from the headings dictionary (if any).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeadingCandidate {
    pub page: u32,
    pub text: String,
    pub font: Option<String>,
    pub size: f64,
    pub score: f64,
    pub status: HeadingStatus,
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Info,
}

/// Outcome of one evaluated check. The four-value set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Present,
    Missing,
    Wrong,
    OptionalAbsent,
}

/// One evaluated rule outcome. `rule_id` may carry a `BASE:field` suffix
/// when a rule yields one finding per sub-field; `base_rule_id` is always
/// the owning rule's id and is attached together with `severity` when the
/// rule queue is assembled, never re-derived from the composite id.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub base_rule_id: String,
    pub status: FindingStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "INCOMPLETE")]
    Incomplete,
}

/// Per-status finding counts over the closed status set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryCounts {
    pub present: u32,
    pub missing: u32,
    pub wrong: u32,
    pub optional_absent: u32,
}

impl SummaryCounts {
    pub fn record(&mut self, status: FindingStatus) {
        match status {
            FindingStatus::Present => self.present += 1,
            FindingStatus::Missing => self.missing += 1,
            FindingStatus::Wrong => self.wrong += 1,
            FindingStatus::OptionalAbsent => self.optional_absent += 1,
        }
    }

    /// Incomplete iff anything is missing or wrong; optional absences never
    /// affect the verdict.
    pub fn verdict(&self) -> Verdict {
        if self.missing > 0 || self.wrong > 0 {
            Verdict::Incomplete
        } else {
            Verdict::Ok
        }
    }
}

/// Aggregate audit outcome: binary verdict, per-status counts, and the
/// ordered findings the counts were derived from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuditResult {
    pub verdict: Verdict,
    pub summary_counts: SummaryCounts,
    pub findings: Vec<Finding>,
}

impl AuditResult {
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let mut counts = SummaryCounts::default();
        for f in &findings {
            counts.record(f.status);
        }
        Self {
            verdict: counts.verdict(),
            summary_counts: counts,
            findings,
        }
    }

    /// The missing/wrong subset, in finding order. This is what commentary
    /// and annotation collaborators consume.
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| matches!(f.status, FindingStatus::Missing | FindingStatus::Wrong))
    }
}

/// Audit outcome bound to a specific document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuditReport {
    pub document_id: String,
    pub asset_type: String,
    pub result: AuditResult,
    pub checked_at: u64,
}
