//! LaTeX source utilities
//!
//! This module contains the text-level machinery the document parsers build on:
//! - Comment stripping and the prepared [`TexDocument`]
//! - Command matching with nested-brace aware argument extraction
//! - Key-value option maps found in optional arguments
//! - Conversion of LaTeX spans to plain text
//! - The macro-definition table

pub mod command;
pub mod macros;
pub mod normalize;
pub mod options;

pub use command::{Bracket, CommandElement, CommandInvocation, CommandMatches, LatexCommand};
pub use macros::{collect_macro_definitions, MacroTable};
pub use normalize::convert_tex_span;
pub use options::KvOptionMap;

/// Strip LaTeX line comments (% ...) while preserving escaped \%.
///
/// A `%` preceded by an odd run of backslashes is a literal percent sign;
/// after an even run (`\\%`) it still starts a comment.
pub fn strip_latex_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.lines() {
        let mut backslashes = 0usize;
        for ch in line.chars() {
            if ch == '%' && backslashes % 2 == 0 {
                break;
            }
            out.push(ch);
            if ch == '\\' {
                backslashes += 1;
            } else {
                backslashes = 0;
            }
        }
        out.push('\n');
    }
    out
}

/// A LaTeX document prepared for metadata extraction.
///
/// The source is comment-stripped once on construction, so every command scan
/// over [`TexDocument::source`] ignores commented-out invocations.
#[derive(Debug, Clone)]
pub struct TexDocument {
    source: String,
    macros: MacroTable,
}

impl TexDocument {
    /// Prepare a document, building its macro table from the source itself.
    pub fn new(raw: &str) -> Self {
        let source = strip_latex_comments(raw);
        let macros = collect_macro_definitions(&source);
        Self { source, macros }
    }

    /// Prepare a document with a macro table produced by an upstream pre-pass.
    pub fn with_macros(raw: &str, macros: MacroTable) -> Self {
        Self {
            source: strip_latex_comments(raw),
            macros,
        }
    }

    /// Comment-free source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let src = "keep % drop\n% whole line\nalso keep";
        assert_eq!(strip_latex_comments(src), "keep \n\nalso keep\n");
    }

    #[test]
    fn test_escaped_percent_survives() {
        let src = r"50\% done % note";
        assert_eq!(strip_latex_comments(src), "50\\% done \n");
    }

    #[test]
    fn test_percent_after_line_break_is_comment() {
        let src = r"end\\% note";
        assert_eq!(strip_latex_comments(src), "end\\\\\n");
    }

    #[test]
    fn test_commented_invocation_is_never_matched() {
        let doc = TexDocument::new("% \\version{0.1}\n\\version{1.0} % \\version{9.9}\n");
        let cmd = LatexCommand::new("version", [CommandElement::required("version")]);
        let found: Vec<_> = cmd.parse(doc.source()).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("version"), Some("1.0"));
    }

    #[test]
    fn test_document_builds_macro_table() {
        let doc = TexDocument::new("\\newcommand{\\docDate}{2021-12-10}\n");
        assert_eq!(
            doc.macros().get("\\docDate").map(String::as_str),
            Some("2021-12-10")
        );
    }
}
