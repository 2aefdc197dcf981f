//! Locating custom command invocations in LaTeX source.
//!
//! A [`LatexCommand`] describes a macro by name and the ordered shape of its
//! arguments. Scanning a source string yields every invocation, in document
//! order, whose required arguments are all present. Arguments are delimited
//! by tracking nesting depth, so `\cmd{a {b} c}` yields `a {b} c` rather
//! than stopping at the first closing brace.
//!
//! The scanner does not know about comments; callers hand it text that has
//! already been through [`strip_latex_comments`](super::strip_latex_comments).

use std::ops::Range;

use indexmap::IndexMap;

/// Delimiter style of a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// `{...}`
    Brace,
    /// `[...]`
    Square,
}

impl Bracket {
    fn open(self) -> u8 {
        match self {
            Bracket::Brace => b'{',
            Bracket::Square => b'[',
        }
    }

    fn close(self) -> u8 {
        match self {
            Bracket::Brace => b'}',
            Bracket::Square => b']',
        }
    }
}

/// One declared argument of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandElement {
    pub name: String,
    pub required: bool,
    pub bracket: Bracket,
}

impl CommandElement {
    pub fn new(name: impl Into<String>, required: bool, bracket: Bracket) -> Self {
        Self {
            name: name.into(),
            required,
            bracket,
        }
    }

    /// A required `{...}` argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true, Bracket::Brace)
    }

    /// An optional `[...]` argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false, Bracket::Square)
    }
}

/// A command name together with the shape of its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexCommand {
    name: String,
    elements: Vec<CommandElement>,
}

impl LatexCommand {
    /// Create a command description. `name` is given without the backslash.
    pub fn new(name: impl Into<String>, elements: impl IntoIterator<Item = CommandElement>) -> Self {
        Self {
            name: name.into(),
            elements: elements.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[CommandElement] {
        &self.elements
    }

    /// Scan `source` for invocations of this command.
    ///
    /// The returned iterator is lazy; calling `parse` again (or cloning the
    /// iterator) restarts the scan.
    pub fn parse<'c, 's>(&'c self, source: &'s str) -> CommandMatches<'c, 's> {
        CommandMatches {
            command: self,
            source,
            needle: format!("\\{}", self.name),
            pos: 0,
        }
    }

    /// The last invocation in document order, if any.
    pub fn last(&self, source: &str) -> Option<CommandInvocation> {
        self.parse(source).last()
    }
}

/// A single located invocation of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    /// Byte range of the whole invocation, backslash through last argument.
    pub span: Range<usize>,
    args: IndexMap<String, String>,
}

impl CommandInvocation {
    /// Raw content of the named argument, if the invocation carries it.
    pub fn get(&self, element: &str) -> Option<&str> {
        self.args.get(element).map(String::as_str)
    }

    pub fn contains(&self, element: &str) -> bool {
        self.args.contains_key(element)
    }

    /// Arguments in source order.
    pub fn args(&self) -> impl Iterator<Item = (&str, &str)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Iterator over the invocations of one command in a source string.
#[derive(Debug, Clone)]
pub struct CommandMatches<'c, 's> {
    command: &'c LatexCommand,
    source: &'s str,
    needle: String,
    pos: usize,
}

impl Iterator for CommandMatches<'_, '_> {
    type Item = CommandInvocation;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();
        while self.pos < bytes.len() {
            let Some(offset) = self.source[self.pos..].find(&self.needle) else {
                self.pos = bytes.len();
                return None;
            };
            let start = self.pos + offset;
            let after = start + self.needle.len();
            self.pos = after;

            // \title must not match \titlepage
            if after < bytes.len() && bytes[after].is_ascii_alphabetic() {
                continue;
            }
            // \\title is a line break followed by a word
            if is_escaped(bytes, start) {
                continue;
            }

            if let Some((args, end)) = match_elements(self.source, after, &self.command.elements) {
                self.pos = end;
                return Some(CommandInvocation {
                    name: self.command.name.clone(),
                    span: start..end,
                    args,
                });
            }
        }
        None
    }
}

/// True when the byte at `idx` is preceded by an odd run of backslashes.
pub(super) fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    let run = bytes[..idx].iter().rev().take_while(|&&b| b == b'\\').count();
    run % 2 == 1
}

fn match_elements(
    source: &str,
    start: usize,
    elements: &[CommandElement],
) -> Option<(IndexMap<String, String>, usize)> {
    let bytes = source.as_bytes();
    let mut args = IndexMap::new();
    let mut idx = start;
    for element in elements {
        let mut j = idx;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        match extract_group_at(source, j, element.bracket) {
            Some((content, next)) => {
                args.insert(element.name.clone(), content);
                idx = next;
            }
            None if element.required => return None,
            None => {}
        }
    }
    Some((args, idx))
}

/// Extract the content of a delimited group starting at `start`.
///
/// Returns the inner text and the index just past the closing delimiter.
/// Escaped delimiters (`\{`, `\]`) do not count, and inside a `[...]` group a
/// `]` nested in braces does not close it.
pub fn extract_group_at(input: &str, start: usize, bracket: Bracket) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if start >= bytes.len() || bytes[start] != bracket.open() {
        return None;
    }
    let mut depth = 0i32;
    let mut brace_depth = 0i32;
    let mut idx = start;
    while idx < bytes.len() {
        let b = bytes[idx];
        if b == b'\\' {
            idx += 2;
            continue;
        }
        if bracket == Bracket::Square {
            match b {
                b'{' => brace_depth += 1,
                b'}' => brace_depth -= 1,
                _ => {}
            }
            if brace_depth > 0 {
                idx += 1;
                continue;
            }
        }
        if b == bracket.open() {
            depth += 1;
        } else if b == bracket.close() {
            depth -= 1;
            if depth == 0 {
                let content = input[start + 1..idx].to_string();
                return Some((content, idx + 1));
            }
        }
        idx += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> LatexCommand {
        LatexCommand::new(
            "person",
            [
                CommandElement::optional("options"),
                CommandElement::required("name"),
            ],
        )
    }

    #[test]
    fn test_two_required_arguments() {
        let cmd = LatexCommand::new(
            "approved",
            [CommandElement::required("date"), CommandElement::required("name")],
        );
        let found: Vec<_> = cmd.parse(r"\approved{2021-01-01}{Edwin Hubble}").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("date"), Some("2021-01-01"));
        assert_eq!(found[0].get("name"), Some("Edwin Hubble"));
    }

    #[test]
    fn test_nested_braces() {
        let cmd = LatexCommand::new(
            "cmd",
            [CommandElement::required("a"), CommandElement::required("b")],
        );
        let found: Vec<_> = cmd
            .parse(r"pre \cmd{x {y {z}} w}{\textbf{b}} post")
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("a"), Some("x {y {z}} w"));
        assert_eq!(found[0].get("b"), Some(r"\textbf{b}"));
    }

    #[test]
    fn test_optional_argument_present_and_absent() {
        let src = r"\person[email=a@example.com]{Alice} \person{Bob}";
        let found: Vec<_> = person().parse(src).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].get("options"), Some("email=a@example.com"));
        assert_eq!(found[0].get("name"), Some("Alice"));
        assert!(!found[1].contains("options"));
        assert_eq!(found[1].get("name"), Some("Bob"));
    }

    #[test]
    fn test_missing_required_argument_is_skipped() {
        let cmd = LatexCommand::new("version", [CommandElement::required("version")]);
        let found: Vec<_> = cmd.parse(r"\version and then \version{2.0}").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("version"), Some("2.0"));
    }

    #[test]
    fn test_name_boundary() {
        let cmd = LatexCommand::new("title", [CommandElement::required("title")]);
        assert_eq!(cmd.parse(r"\titlepage{x}").count(), 0);
        assert_eq!(cmd.parse(r"\title{x}").count(), 1);
        assert_eq!(cmd.parse(r"\\title{x}").count(), 0);
    }

    #[test]
    fn test_escaped_delimiters() {
        let cmd = LatexCommand::new("title", [CommandElement::required("title")]);
        let found = cmd.last(r"\title{Sets \{a\} and \}}").unwrap();
        assert_eq!(found.get("title"), Some(r"Sets \{a\} and \}"));
    }

    #[test]
    fn test_bracket_inside_braces() {
        let found = person().last(r"\person[note={a]b}]{Carol}").unwrap();
        assert_eq!(found.get("options"), Some("note={a]b}"));
        assert_eq!(found.get("name"), Some("Carol"));
    }

    #[test]
    fn test_whitespace_between_arguments() {
        let found = person().last("\\person [email=x]\n  {Dan}").unwrap();
        assert_eq!(found.get("name"), Some("Dan"));
    }

    #[test]
    fn test_unbalanced_group_is_skipped() {
        let cmd = LatexCommand::new("title", [CommandElement::required("title")]);
        assert_eq!(cmd.parse(r"\title{never closed").count(), 0);
    }

    #[test]
    fn test_document_order_and_spans() {
        let src = r"\version{1.0} text \version{1.1}";
        let cmd = LatexCommand::new("version", [CommandElement::required("version")]);
        let found: Vec<_> = cmd.parse(src).collect();
        assert_eq!(found.len(), 2);
        assert!(found[0].span.end <= found[1].span.start);
        assert_eq!(&src[found[1].span.clone()], r"\version{1.1}");
        assert_eq!(cmd.last(src).unwrap().get("version"), Some("1.1"));
    }

    #[test]
    fn test_scan_is_restartable() {
        let cmd = person();
        let src = r"\person{A} \person{B}";
        let first = cmd.parse(src);
        let again = first.clone();
        assert_eq!(first.count(), 2);
        assert_eq!(again.count(), 2);
        assert_eq!(cmd.parse(src).count(), 2);
    }

    #[test]
    fn test_args_keep_declared_order() {
        let found = person().last(r"\person[email=x]{Eve}").unwrap();
        let names: Vec<_> = found.args().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["options", "name"]);
    }
}
