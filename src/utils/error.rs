//! Error handling for metadata extraction
//!
//! This module provides a unified error type and result type for all
//! extraction operations, plus the non-fatal warning record that extractors
//! collect while degrading optional fields.

use std::fmt;

use thiserror::Error;

/// Extraction error type
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A mandatory command is absent from the document
    #[error("Could not parse a {command} command")]
    MissingCommand { command: String },

    /// A command is present but its value cannot be interpreted
    #[error("Malformed value '{value}' in \\{command}: {reason}")]
    MalformedValue {
        command: String,
        value: String,
        reason: String,
    },

    /// A LaTeX span could not be converted to plain text
    #[error("Could not convert LaTeX to plain text ({message}): {text}")]
    TextConversion { text: String, message: String },

    /// The merged field dictionary does not form a valid record
    #[error("Invalid metadata: {message}")]
    InvalidMetadata { message: String },

    /// Build settings could not be loaded or are inconsistent
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;

// Convenience constructors for errors
impl ExtractionError {
    pub fn missing(command: impl Into<String>) -> Self {
        ExtractionError::MissingCommand {
            command: command.into(),
        }
    }

    pub fn malformed(
        command: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ExtractionError::MalformedValue {
            command: command.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn conversion(text: impl Into<String>, message: impl Into<String>) -> Self {
        ExtractionError::TextConversion {
            text: text.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ExtractionError::InvalidMetadata {
            message: message.into(),
        }
    }

    pub fn settings(message: impl Into<String>) -> Self {
        ExtractionError::Settings {
            message: message.into(),
        }
    }
}

/// Kind of a recoverable extraction problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An optional command was not found in the source
    MissingCommand,
    /// A value was outside its enumeration and fell back to a sentinel
    UnrecognizedValue,
    /// A command was found but lacked a part needed to build the field
    IncompleteCommand,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingCommand => write!(f, "missing command"),
            WarningKind::UnrecognizedValue => write!(f, "unrecognized value"),
            WarningKind::IncompleteCommand => write!(f, "incomplete command"),
        }
    }
}

/// Extraction warnings (non-fatal issues)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    pub message: String,
    /// Command the warning is about, without the leading backslash
    pub command: Option<String>,
}

impl ExtractionWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// The warning for an optional command that does not appear in the source.
    pub fn missing_command(command: &str) -> Self {
        ExtractionWarning::new(
            WarningKind::MissingCommand,
            format!("No {} command detected", command),
        )
        .with_command(command)
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref cmd) = self.command {
            write!(f, "[{}] \\{}: {}", self.kind, cmd, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

/// Extraction output with optional warnings
#[derive(Debug, Clone)]
pub struct ExtractionOutput<M> {
    /// The assembled metadata record
    pub metadata: M,
    /// Any warnings generated during extraction
    pub warnings: Vec<ExtractionWarning>,
}

impl<M> ExtractionOutput<M> {
    pub fn new(metadata: M) -> Self {
        Self {
            metadata,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(metadata: M, warnings: Vec<ExtractionWarning>) -> Self {
        Self { metadata, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Transform the record while keeping the collected warnings.
    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> ExtractionOutput<N> {
        ExtractionOutput {
            metadata: f(self.metadata),
            warnings: self.warnings,
        }
    }
}
