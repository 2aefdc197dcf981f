//! Document-class parsers
//!
//! Each SPHEREx document class has a parser that turns a [`TexDocument`] into
//! its own metadata record:
//! - `spherex-pipeline-module` (SSDC-MS module specifications)
//! - `spherex-ssdc-tr`, `spherex-ssdc-tn`, `spherex-ssdc-dp`, `spherex-ssdc-op`,
//!   `spherex-ssdc-if`
//! - `spherex-project-management`

pub mod common;
pub mod pipelinemodule;
pub mod projectmanagement;
pub mod ssdcdp;
pub mod ssdcif;
pub mod ssdcop;
pub mod ssdctn;
pub mod ssdctr;

use phf::phf_map;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::ci::CiMetadata;
use crate::core::texutils::TexDocument;
use crate::metadata::{DocumentMetadata, FieldMap};
use crate::settings::BuildSettings;
use crate::utils::error::{ExtractionError, ExtractionOutput, ExtractionResult};

pub use common::SpherexParser;
pub use pipelinemodule::{Difficulty, PipelineModuleMetadata, PipelineModuleParser, Status};
pub use projectmanagement::{ProjectManagementMetadata, ProjectManagementParser};
pub use ssdcdp::{SsdcDpMetadata, SsdcDpParser};
pub use ssdcif::{SsdcIfMetadata, SsdcIfParser};
pub use ssdcop::{SsdcOpMetadata, SsdcOpParser};
pub use ssdctn::{SsdcTnMetadata, SsdcTnParser};
pub use ssdctr::{SsdcTrMetadata, SsdcTrParser};

/// A parser for one document class.
pub trait DocumentParser {
    type Metadata: DocumentMetadata + Serialize + DeserializeOwned;

    /// Name used to select this parser in build settings.
    const NAME: &'static str;

    /// Parse the class's fields from the document, before any overlay.
    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap>;
}

/// Extract a document's metadata with parser `P`.
pub fn extract_metadata<P: DocumentParser>(
    class_parser: &P,
    document: &TexDocument,
    ci: &CiMetadata,
    settings: &BuildSettings,
) -> ExtractionResult<ExtractionOutput<P::Metadata>> {
    debug!("extracting metadata with {}", P::NAME);
    let mut parser = SpherexParser::new(document, ci, settings);
    let fields = class_parser.extract_fields(&mut parser)?;
    parser.finish(fields)
}

/// The supported document classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentClass {
    PipelineModule,
    SsdcTr,
    SsdcTn,
    SsdcDp,
    SsdcOp,
    SsdcIf,
    ProjectManagement,
}

static PARSER_NAMES: phf::Map<&'static str, DocumentClass> = phf_map! {
    "spherex-pipeline-module" => DocumentClass::PipelineModule,
    "spherex-ssdc-tr" => DocumentClass::SsdcTr,
    "spherex-ssdc-tn" => DocumentClass::SsdcTn,
    "spherex-ssdc-dp" => DocumentClass::SsdcDp,
    "spherex-ssdc-op" => DocumentClass::SsdcOp,
    "spherex-ssdc-if" => DocumentClass::SsdcIf,
    "spherex-project-management" => DocumentClass::ProjectManagement,
};

impl DocumentClass {
    /// Look up a class by parser name.
    pub fn from_name(name: &str) -> Option<Self> {
        PARSER_NAMES.get(name.trim()).copied()
    }

    /// All parser names, sorted.
    pub fn names() -> impl Iterator<Item = &'static str> {
        let mut names: Vec<_> = PARSER_NAMES.keys().copied().collect();
        names.sort_unstable();
        names.into_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            DocumentClass::PipelineModule => PipelineModuleParser::NAME,
            DocumentClass::SsdcTr => SsdcTrParser::NAME,
            DocumentClass::SsdcTn => SsdcTnParser::NAME,
            DocumentClass::SsdcDp => SsdcDpParser::NAME,
            DocumentClass::SsdcOp => SsdcOpParser::NAME,
            DocumentClass::SsdcIf => SsdcIfParser::NAME,
            DocumentClass::ProjectManagement => ProjectManagementParser::NAME,
        }
    }

    /// Extract metadata and serialize the record to its flat JSON form.
    pub fn extract_json(
        self,
        document: &TexDocument,
        ci: &CiMetadata,
        settings: &BuildSettings,
    ) -> ExtractionResult<ExtractionOutput<serde_json::Value>> {
        match self {
            DocumentClass::PipelineModule => {
                to_json(extract_metadata(&PipelineModuleParser, document, ci, settings)?)
            }
            DocumentClass::SsdcTr => to_json(extract_metadata(&SsdcTrParser, document, ci, settings)?),
            DocumentClass::SsdcTn => to_json(extract_metadata(&SsdcTnParser, document, ci, settings)?),
            DocumentClass::SsdcDp => to_json(extract_metadata(&SsdcDpParser, document, ci, settings)?),
            DocumentClass::SsdcOp => to_json(extract_metadata(&SsdcOpParser, document, ci, settings)?),
            DocumentClass::SsdcIf => to_json(extract_metadata(&SsdcIfParser, document, ci, settings)?),
            DocumentClass::ProjectManagement => to_json(extract_metadata(
                &ProjectManagementParser,
                document,
                ci,
                settings,
            )?),
        }
    }
}

fn to_json<M: Serialize>(
    output: ExtractionOutput<M>,
) -> ExtractionResult<ExtractionOutput<serde_json::Value>> {
    let value =
        serde_json::to_value(&output.metadata).map_err(|e| ExtractionError::invalid(e.to_string()))?;
    Ok(output.map(|_| value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_class_round_trips_its_name() {
        for name in DocumentClass::names() {
            let class = DocumentClass::from_name(name).unwrap();
            assert_eq!(class.name(), name);
        }
        assert_eq!(DocumentClass::names().count(), 7);
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(DocumentClass::from_name("lsst-technote"), None);
        assert_eq!(
            DocumentClass::from_name(" spherex-ssdc-tn "),
            Some(DocumentClass::SsdcTn)
        );
    }
}
