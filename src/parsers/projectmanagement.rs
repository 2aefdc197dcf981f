//! Project management documents (SSDC-PM).
//!
//! The title may be absent from the source when the build settings supply
//! one as a metadata override.

use serde::{Deserialize, Serialize};

use super::common::{put_opt, SpherexParser};
use super::DocumentParser;
use crate::metadata::{ApprovalInfo, DocumentMetadata, FieldMap, SpherexMetadata};
use crate::utils::error::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManagementMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalInfo>,
}

impl DocumentMetadata for ProjectManagementMetadata {
    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectManagementParser;

impl DocumentParser for ProjectManagementParser {
    type Metadata = ProjectManagementMetadata;
    const NAME: &'static str = "spherex-project-management";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        let mut m = parser.collect_common_metadata()?;
        put_opt(&mut m, "approval", parser.parse_approved())?;
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CiMetadata;
    use crate::core::texutils::TexDocument;
    use crate::parsers::extract_metadata;
    use crate::settings::BuildSettings;
    use crate::utils::error::ExtractionError;

    const UNTITLED: &str = "\\spherexHandle{SSDC-PM-002}\n\\approved{2022-03-01}{A. Approver}\n";

    #[test]
    fn test_title_from_override() {
        let output = extract_metadata(
            &ProjectManagementParser,
            &TexDocument::new(UNTITLED),
            &CiMetadata::null(),
            &BuildSettings::default().with_override("title", "Operations Plan"),
        )
        .unwrap();
        assert_eq!(output.metadata.base.title, "Operations Plan");
        assert_eq!(output.metadata.base.identifier.as_deref(), Some("SSDC-PM-002"));
        assert_eq!(
            output.metadata.approval.map(|a| a.name),
            Some("A. Approver".to_string())
        );
    }

    #[test]
    fn test_missing_title_without_override() {
        let err = extract_metadata(
            &ProjectManagementParser,
            &TexDocument::new(UNTITLED),
            &CiMetadata::null(),
            &BuildSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::MissingCommand { ref command } if command == "title"
        ));
    }
}
