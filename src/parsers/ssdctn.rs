//! SSDC technical notes (SSDC-TN). Only the common fields apply.

use serde::{Deserialize, Serialize};

use super::common::SpherexParser;
use super::DocumentParser;
use crate::metadata::{DocumentMetadata, FieldMap, SpherexMetadata};
use crate::utils::error::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdcTnMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,
}

impl DocumentMetadata for SsdcTnMetadata {
    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SsdcTnParser;

impl DocumentParser for SsdcTnParser {
    type Metadata = SsdcTnMetadata;
    const NAME: &'static str = "spherex-ssdc-tn";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        parser.collect_common_metadata()
    }
}
