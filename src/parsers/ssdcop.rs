//! SSDC operations documents (SSDC-OP).

use serde::{Deserialize, Serialize};

use super::common::{put_opt, SpherexParser};
use super::DocumentParser;
use crate::metadata::{ApprovalInfo, DocumentMetadata, FieldMap, SpherexMetadata};
use crate::utils::error::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdcOpMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalInfo>,
}

impl DocumentMetadata for SsdcOpMetadata {
    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SsdcOpParser;

impl DocumentParser for SsdcOpParser {
    type Metadata = SsdcOpMetadata;
    const NAME: &'static str = "spherex-ssdc-op";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        let mut m = parser.collect_common_metadata()?;
        put_opt(&mut m, "approval", parser.parse_approved())?;
        Ok(m)
    }
}
