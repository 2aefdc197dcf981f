//! Pipeline module specifications (SSDC-MS).
//!
//! These documents are titled by `\modulename` rather than `\title` and carry
//! the module's pipeline level, difficulty and diagram index.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::{put, put_opt, SpherexParser};
use super::DocumentParser;
use crate::core::texutils::{CommandElement, LatexCommand};
use crate::metadata::{ApprovalInfo, DocumentMetadata, FieldMap, SpherexMetadata};
use crate::utils::error::{ExtractionError, ExtractionResult, ExtractionWarning, WarningKind};

/// Document status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Delivered,
    #[default]
    Unknown,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Delivered, Status::Unknown];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Delivered => "Delivered",
            Status::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Delivered" => Some(Status::Delivered),
            "Unknown" => Some(Status::Unknown),
            _ => None,
        }
    }

    fn labels() -> String {
        Self::ALL.map(Status::as_str).join(", ")
    }
}

/// Unrecognized labels fall back to `Unknown`; extraction reports them.
impl From<String> for Status {
    fn from(label: String) -> Self {
        Status::from_label(&label).unwrap_or_default()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Low,
    Medium,
    High,
    #[default]
    Unassigned,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Low,
        Difficulty::Medium,
        Difficulty::High,
        Difficulty::Unassigned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Low => "Low",
            Difficulty::Medium => "Medium",
            Difficulty::High => "High",
            Difficulty::Unassigned => "Unassigned",
        }
    }

    /// Exact label lookup; `None` for anything outside the enumeration.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Low" => Some(Difficulty::Low),
            "Medium" => Some(Difficulty::Medium),
            "High" => Some(Difficulty::High),
            "Unassigned" => Some(Difficulty::Unassigned),
            _ => None,
        }
    }

    fn labels() -> String {
        Self::ALL.map(Difficulty::as_str).join(", ")
    }
}

/// Unrecognized labels fall back to `Unassigned`; extraction reports them.
impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        Difficulty::from_label(&label).unwrap_or_default()
    }
}

impl From<Difficulty> for String {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for SPHEREx pipeline module documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineModuleMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,

    /// The pipeline level designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_level: Option<String>,

    #[serde(default)]
    pub status: Status,

    /// Technical difficulty.
    #[serde(default)]
    pub difficulty: Difficulty,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalInfo>,
}

impl DocumentMetadata for PipelineModuleMetadata {
    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineModuleParser;

impl DocumentParser for PipelineModuleParser {
    type Metadata = PipelineModuleMetadata;
    const NAME: &'static str = "spherex-pipeline-module";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        let mut m = FieldMap::new();
        put(&mut m, "title", parse_module_name(parser)?)?;
        put_opt(&mut m, "version", parser.parse_version())?;
        put_opt(&mut m, "pipeline_level", parser.parse_single("pipelevel"))?;
        put(&mut m, "difficulty", parse_difficulty(parser))?;
        put_opt(&mut m, "diagram_index", parse_diagram_index(parser)?)?;
        put(&mut m, "authors", parser.parse_authors()?)?;
        put_opt(&mut m, "date_modified", parser.parse_date()?)?;
        put_opt(&mut m, "identifier", parser.parse_handle())?;
        put_opt(&mut m, "approval", parser.parse_approved())?;
        check_label_overrides(parser);
        Ok(m)
    }
}

/// Report enumerated overrides that will fall back to their sentinel.
fn check_label_overrides(parser: &mut SpherexParser<'_>) {
    let checks: [(&str, fn(&str) -> bool, String); 2] = [
        (
            "difficulty",
            |label| Difficulty::from_label(label).is_some(),
            Difficulty::labels(),
        ),
        (
            "status",
            |label| Status::from_label(label).is_some(),
            Status::labels(),
        ),
    ];
    for (field, recognized, labels) in checks {
        let Some(label) = parser.override_value(field).and_then(|v| v.as_str()) else {
            continue;
        };
        if !recognized(label) {
            parser.warn(ExtractionWarning::new(
                WarningKind::UnrecognizedValue,
                format!("{} override {} is not one of: {}", field, label, labels),
            ));
        }
    }
}

/// Parse the pipeline module name, which serves as the title.
fn parse_module_name(parser: &SpherexParser<'_>) -> ExtractionResult<String> {
    let command = LatexCommand::new("modulename", [CommandElement::required("name")]);
    command
        .last(parser.source())
        .and_then(|inv| inv.get("name").map(str::to_string))
        .ok_or_else(|| ExtractionError::missing("modulename"))
}

fn parse_difficulty(parser: &mut SpherexParser<'_>) -> Difficulty {
    let Some(value) = parser.parse_single("difficulty") else {
        return Difficulty::Unassigned;
    };
    Difficulty::from_label(&value).unwrap_or_else(|| {
        parser.warn(
            ExtractionWarning::new(
                WarningKind::UnrecognizedValue,
                format!(
                    "Difficulty value {} is not one of: {}",
                    value,
                    Difficulty::labels()
                ),
            )
            .with_command("difficulty"),
        );
        Difficulty::Unassigned
    })
}

fn parse_diagram_index(parser: &mut SpherexParser<'_>) -> ExtractionResult<Option<i64>> {
    let Some(value) = parser.parse_single("diagramindex") else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| ExtractionError::malformed("diagramindex", value.as_str(), e.to_string()))
}
