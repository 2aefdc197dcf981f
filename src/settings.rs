//! Build settings.
//!
//! Settings come from a `lander.yaml` style file and/or the command line:
//!
//! ```yaml
//! parser: spherex-pipeline-module
//! canonical_url: https://ssdc-ms-001.example.org/
//! metadata:
//!   status: Delivered
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metadata::FieldMap;
use crate::parsers::DocumentClass;
use crate::utils::error::{ExtractionError, ExtractionResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Path to the main LaTeX source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    /// Name of the document-class parser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Canonical URL of the landing page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,

    /// Field overrides applied after everything parsed from the document
    pub metadata: FieldMap,
}

impl BuildSettings {
    pub fn from_yaml_str(yaml: &str) -> ExtractionResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ExtractionError::settings(e.to_string()))
    }

    /// Load settings from a YAML file.
    ///
    /// A relative `source_path` is resolved against the file's directory.
    pub fn load(path: &Path) -> ExtractionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml_str(&text)?;
        if let (Some(source), Some(dir)) = (settings.source_path.as_mut(), path.parent()) {
            if source.is_relative() {
                *source = dir.join(&*source);
            }
        }
        Ok(settings)
    }

    pub fn with_parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = Some(parser.into());
        self
    }

    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    /// Add one field override.
    pub fn with_override(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(field.into(), value.into());
        self
    }

    /// The configured document class.
    pub fn document_class(&self) -> ExtractionResult<DocumentClass> {
        let name = self
            .parser
            .as_deref()
            .ok_or_else(|| ExtractionError::settings("no parser configured"))?;
        DocumentClass::from_name(name).ok_or_else(|| {
            ExtractionError::settings(format!(
                "unknown parser '{}' (expected one of: {})",
                name,
                DocumentClass::names().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_settings() {
        let settings = BuildSettings::from_yaml_str(
            "parser: spherex-ssdc-tr\n\
             canonical_url: https://ssdc-tr-000.example.org/\n\
             theme: spherex\n\
             metadata:\n  version: '2.0'\n  diagram_index: 3\n",
        )
        .unwrap();
        assert_eq!(settings.document_class().unwrap(), DocumentClass::SsdcTr);
        assert_eq!(
            settings.canonical_url.as_deref(),
            Some("https://ssdc-tr-000.example.org/")
        );
        assert_eq!(settings.metadata["version"], "2.0");
        assert_eq!(settings.metadata["diagram_index"], 3);
    }

    #[test]
    fn test_unknown_parser() {
        let settings = BuildSettings::default().with_parser("spherex-nope");
        let err = settings.document_class().unwrap_err();
        assert!(err.to_string().contains("spherex-nope"));
    }

    #[test]
    fn test_missing_parser() {
        assert!(BuildSettings::default().document_class().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            BuildSettings::from_yaml_str("metadata: [1, 2"),
            Err(ExtractionError::Settings { .. })
        ));
    }
}
