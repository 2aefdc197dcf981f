//! The macro-definition table.
//!
//! Some values (notably the document date) are set through parameterless
//! macro definitions such as `\newcommand{\docDate}{2021-12-10}` rather than
//! through a command invocation. The table maps the macro name, backslash
//! included, to its raw replacement text.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::command::{extract_group_at, Bracket};

/// Macro name (with backslash) to raw replacement text.
pub type MacroTable = HashMap<String, String>;

lazy_static! {
    static ref MACRO_DEFINITION: Regex = Regex::new(
        r"\\(?:(re|provide)?newcommand\*?\s*\{?\s*|def\s*)(\\[A-Za-z@]+)\s*\}?\s*"
    )
    .expect("macro definition pattern is valid");
}

/// Collect parameterless macro definitions from comment-free source.
///
/// Definitions taking parameters (`[1]` or `#1`) are skipped. Later
/// definitions replace earlier ones, except `\providecommand`, which only
/// defines a macro that does not exist yet.
pub fn collect_macro_definitions(source: &str) -> MacroTable {
    let mut table = MacroTable::new();
    let bytes = source.as_bytes();
    for caps in MACRO_DEFINITION.captures_iter(source) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let end = whole.end();
        if end < bytes.len() && matches!(bytes[end], b'[' | b'#') {
            continue;
        }
        let provide = caps.get(1).is_some_and(|m| m.as_str() == "provide");
        if provide && table.contains_key(name.as_str()) {
            continue;
        }
        if let Some((value, _)) = extract_group_at(source, end, Bracket::Brace) {
            table.insert(name.as_str().to_string(), value);
        }
    }
    table
}
