//! # spherexlander
//!
//! Metadata extraction for SPHEREx LaTeX documents.
//!
//! A document's source is prepared into a [`TexDocument`] (comments stripped,
//! macro definitions collected), then a document-class parser reads its title,
//! version, handle, date, authors and class-specific fields into a typed
//! record. CI provenance and operator overrides from [`BuildSettings`] are
//! layered on top.
//!
//! ## Example
//!
//! ```rust
//! use spherexlander::{extract_metadata, BuildSettings, CiMetadata, SsdcTnParser, TexDocument};
//!
//! let doc = TexDocument::new("\\title{Sky Survey Notes}\n\\version{1.0}\n");
//! let output = extract_metadata(
//!     &SsdcTnParser,
//!     &doc,
//!     &CiMetadata::null(),
//!     &BuildSettings::default(),
//! )
//! .unwrap();
//! assert_eq!(output.metadata.base.title, "Sky Survey Notes");
//! ```

pub mod ci;
pub mod core;
pub mod metadata;
pub mod parsers;
pub mod settings;
pub mod utils;

pub use ci::{CiMetadata, CiPlatform};
pub use core::texutils::{
    convert_tex_span, Bracket, CommandElement, CommandInvocation, KvOptionMap, LatexCommand,
    MacroTable, TexDocument,
};
pub use metadata::{
    ApprovalInfo, Contributor, DocumentMetadata, DoorsId, SpherexMetadata, INTERFACE_PARTNER,
    IPAC_LEAD, SPHEREX_LEAD,
};
pub use parsers::{
    extract_metadata, Difficulty, DocumentClass, DocumentParser, PipelineModuleMetadata,
    PipelineModuleParser, ProjectManagementMetadata, ProjectManagementParser, SsdcDpMetadata,
    SsdcDpParser, SsdcIfMetadata, SsdcIfParser, SsdcOpMetadata, SsdcOpParser, SsdcTnMetadata,
    SsdcTnParser, SsdcTrMetadata, SsdcTrParser, Status,
};
pub use settings::BuildSettings;
pub use utils::error::{
    ExtractionError, ExtractionOutput, ExtractionResult, ExtractionWarning, WarningKind,
};
