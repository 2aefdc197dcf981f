//! SSDC test reports (SSDC-TR).
//!
//! Besides the approval block, test reports carry an IPAC Jira ticket and
//! DOORS identifiers for either the requirement (`\ReqDoorsID`) or the
//! verification activity (`\VADoorsID`) they cover.

use serde::{Deserialize, Serialize};

use super::common::{put, put_opt, SpherexParser};
use super::DocumentParser;
use crate::core::texutils::{CommandElement, LatexCommand};
use crate::metadata::{ApprovalInfo, DocumentMetadata, DoorsId, FieldMap, SpherexMetadata};
use crate::utils::error::{ExtractionResult, ExtractionWarning, WarningKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdcTrMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipac_jira_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub va_doors_id: Option<DoorsId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_doors_id: Option<DoorsId>,
}

impl DocumentMetadata for SsdcTrMetadata {
    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SsdcTrParser;

impl DocumentParser for SsdcTrParser {
    type Metadata = SsdcTrMetadata;
    const NAME: &'static str = "spherex-ssdc-tr";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        let mut m = FieldMap::new();
        put(&mut m, "title", parser.parse_title()?)?;
        put_opt(&mut m, "version", parser.parse_version())?;
        put(&mut m, "authors", parser.parse_authors()?)?;
        put_opt(&mut m, "date_modified", parser.parse_date()?)?;
        put_opt(&mut m, "identifier", parser.parse_handle())?;
        put_opt(&mut m, "approval", parser.parse_approved())?;
        put_opt(&mut m, "ipac_jira_id", parser.parse_single("IPACJiraID"))?;
        put_opt(&mut m, "va_doors_id", parse_doors_id(parser, "VADoorsID"))?;
        put_opt(&mut m, "req_doors_id", parse_doors_id(parser, "ReqDoorsID"))?;
        Ok(m)
    }
}

/// Parse a `\<name>[url]{id}` command.
///
/// An identifier without its URL is reported and left out.
fn parse_doors_id(parser: &mut SpherexParser<'_>, name: &str) -> Option<DoorsId> {
    let command = LatexCommand::new(
        name,
        [
            CommandElement::optional("url"),
            CommandElement::required("id"),
        ],
    );
    let inv = parser.find_last(&command)?;
    let id = inv.get("id")?.trim().to_string();
    match inv.get("url").map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => Some(DoorsId {
            id,
            url: url.to_string(),
        }),
        None => {
            parser.warn(
                ExtractionWarning::new(
                    WarningKind::IncompleteCommand,
                    format!("{} {} has no URL", name, id),
                )
                .with_command(name),
            );
            None
        }
    }
}
