//! Declarative rule catalog: load, validate, and model the compliance rules
//!
//! Rules are a tagged union over the known kinds, validated once at load
//! time. Unknown kinds are preserved by name so they stay evaluable as safe
//! no-ops rather than load failures.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use valuation_types::Severity;

/// Default catalog shipped with the engine.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.yaml");

/// Row hint used by `list_min_count` when a rule supplies none.
pub const DEFAULT_ROW_HINT: &str = "(Comparable|Similar)";

/// The six kinds carried over from an earlier catalog generation that only
/// get a presence-level check.
pub const LEGACY_KINDS: &[&str] = &[
    "separate_calc",
    "doc_triplet_match",
    "compare_required",
    "area_pair",
    "boolean_required",
    "composite_presence",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid rule '{title}': {reason}")]
    InvalidRule { title: String, reason: String },
}

/// One sub-check of a `quality_rules` rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityCheck {
    pub kind: String,
    #[serde(default)]
    pub terms: Vec<String>,
}

/// Required/optional attachment name lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttachmentSpec {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

/// The kind-specific payload of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    RequiredFields { fields: Vec<String> },
    NonemptyText,
    Coexist { fields: Vec<String> },
    TableColumns { columns: Vec<String> },
    ListMinCount { row_hint: String, min: u32 },
    Enum { allowed: Vec<String> },
    Flags { flags: Vec<String>, optional: bool },
    DateTriplet,
    AttachmentsCheck { attachments: AttachmentSpec },
    QualityRules { checks: Vec<QualityCheck> },
    /// One of [`LEGACY_KINDS`]: presence-level check only.
    Legacy { kind: String },
    /// Anything else: evaluates to a safe no-op finding naming the kind.
    Unknown { kind: String },
}

/// A declarative audit rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: Option<String>,
    pub title: String,
    pub field: Option<String>,
    pub severity: Option<Severity>,
    pub kind: RuleKind,
}

impl Rule {
    /// The rule's id, defaulting to an uppercase/underscored form of the
    /// title when the catalog names none.
    pub fn ensured_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.title.to_uppercase().replace(' ', "_"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default = "default_severity")]
    pub default_severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Major
}

impl Default for CatalogMetadata {
    fn default() -> Self {
        Self {
            default_severity: default_severity(),
        }
    }
}

/// The full rule catalog: shared rules plus per-asset-type buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalog {
    pub metadata: CatalogMetadata,
    pub common: Vec<Rule>,
    pub by_type: BTreeMap<String, Vec<Rule>>,
}

impl RuleCatalog {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawCatalog = serde_yaml::from_str(yaml)?;
        let common = raw
            .common
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let by_type = raw
            .by_type
            .into_iter()
            .map(|(asset_type, rules)| {
                let rules = rules
                    .into_iter()
                    .map(Rule::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((asset_type, rules))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;
        Ok(Self {
            metadata: raw.metadata,
            common,
            by_type,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The representative catalog embedded in the crate.
    pub fn builtin() -> Self {
        Self::from_yaml_str(BUILTIN_CATALOG).expect("builtin catalog must parse")
    }

    /// Severity for a rule: its own, else the catalog default.
    pub fn severity_of(&self, rule: &Rule) -> Severity {
        rule.severity.unwrap_or(self.metadata.default_severity)
    }

    /// The evaluation queue for an asset type: common rules followed by the
    /// type bucket. An unknown asset type yields only the common rules.
    pub fn queue(&self, asset_type: &str) -> impl Iterator<Item = &Rule> {
        self.common
            .iter()
            .chain(self.by_type.get(asset_type).into_iter().flatten())
    }

    /// All rules in catalog order, common first.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        self.common
            .iter()
            .chain(self.by_type.values().flatten())
    }
}

// ---- raw YAML shapes -------------------------------------------------------

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    metadata: CatalogMetadata,
    #[serde(default)]
    common: Vec<RawRule>,
    #[serde(default)]
    by_type: BTreeMap<String, Vec<RawRule>>,
}

#[derive(Deserialize)]
struct RawRule {
    id: Option<String>,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    field: Option<String>,
    severity: Option<Severity>,
    #[serde(flatten)]
    rest: serde_yaml::Mapping,
}

impl RawRule {
    fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_yaml::from_value(serde_yaml::Value::Mapping(self.rest.clone())).map_err(|e| {
            ConfigError::InvalidRule {
                title: self.title.clone(),
                reason: e.to_string(),
            }
        })
    }
}

#[derive(Deserialize)]
struct FieldsPayload {
    fields: Vec<String>,
}

#[derive(Deserialize)]
struct ColumnsPayload {
    columns_required: Option<Vec<String>>,
    #[serde(default)]
    constraints: ColumnConstraints,
}

#[derive(Deserialize, Default)]
struct ColumnConstraints {
    columns_required: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct MinCountPayload {
    row_hint_regex: Option<String>,
    min: Option<u32>,
    min_count: Option<u32>,
}

#[derive(Deserialize)]
struct EnumPayload {
    allowed: Vec<String>,
}

#[derive(Deserialize)]
struct FlagsPayload {
    flags: Vec<String>,
}

#[derive(Deserialize)]
struct AttachmentsPayload {
    #[serde(default)]
    attachments: AttachmentSpec,
}

#[derive(Deserialize)]
struct QualityPayload {
    rules: Vec<QualityCheck>,
}

fn ensure_nonempty(title: &str, what: &str, len: usize) -> Result<(), ConfigError> {
    if len == 0 {
        return Err(ConfigError::InvalidRule {
            title: title.to_string(),
            reason: format!("empty {what}"),
        });
    }
    Ok(())
}

impl TryFrom<RawRule> for Rule {
    type Error = ConfigError;

    fn try_from(raw: RawRule) -> Result<Self, ConfigError> {
        let kind = match raw.kind.as_str() {
            "required_fields" => {
                let p: FieldsPayload = raw.payload()?;
                ensure_nonempty(&raw.title, "fields", p.fields.len())?;
                RuleKind::RequiredFields { fields: p.fields }
            }
            "nonempty_text" => RuleKind::NonemptyText,
            "coexist" => {
                let p: FieldsPayload = raw.payload()?;
                ensure_nonempty(&raw.title, "fields", p.fields.len())?;
                RuleKind::Coexist { fields: p.fields }
            }
            "table_columns" | "takidat_table" => {
                let p: ColumnsPayload = raw.payload()?;
                let columns = p
                    .columns_required
                    .or(p.constraints.columns_required)
                    .ok_or_else(|| ConfigError::InvalidRule {
                        title: raw.title.clone(),
                        reason: "missing columns_required".to_string(),
                    })?;
                ensure_nonempty(&raw.title, "columns_required", columns.len())?;
                RuleKind::TableColumns { columns }
            }
            "list_min_count" => {
                let p: MinCountPayload = raw.payload()?;
                RuleKind::ListMinCount {
                    row_hint: p
                        .row_hint_regex
                        .unwrap_or_else(|| DEFAULT_ROW_HINT.to_string()),
                    min: p.min.or(p.min_count).unwrap_or(0),
                }
            }
            "enum" => {
                let p: EnumPayload = raw.payload()?;
                RuleKind::Enum { allowed: p.allowed }
            }
            "flags" | "flags_optional" => {
                let p: FlagsPayload = raw.payload()?;
                ensure_nonempty(&raw.title, "flags", p.flags.len())?;
                RuleKind::Flags {
                    flags: p.flags,
                    optional: raw.kind == "flags_optional",
                }
            }
            "date_triplet" => RuleKind::DateTriplet,
            "attachments_check" => {
                let p: AttachmentsPayload = raw.payload()?;
                ensure_nonempty(
                    &raw.title,
                    "attachments",
                    p.attachments.required.len() + p.attachments.optional.len(),
                )?;
                RuleKind::AttachmentsCheck {
                    attachments: p.attachments,
                }
            }
            "quality_rules" => {
                let p: QualityPayload = raw.payload()?;
                ensure_nonempty(&raw.title, "rules", p.rules.len())?;
                RuleKind::QualityRules { checks: p.rules }
            }
            kind if LEGACY_KINDS.contains(&kind) => RuleKind::Legacy {
                kind: kind.to_string(),
            },
            other => RuleKind::Unknown {
                kind: other.to_string(),
            },
        };

        Ok(Rule {
            id: raw.id,
            title: raw.title,
            field: raw.field,
            severity: raw.severity,
            kind,
        })
    }
}
