pub mod types;

pub use types::{
    AuditReport, AuditResult, Finding, FindingStatus, HeadingCandidate, HeadingStatus, Line,
    ReportDocument, Severity, SummaryCounts, Verdict,
};
