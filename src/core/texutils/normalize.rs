//! Conversion of LaTeX spans to plain text.
//!
//! Spans (author names, for the most part) are parsed with `mitex-parser` and
//! the resulting tree is walked for its text: command names, braces, math
//! delimiters and optional arguments are dropped, escaped symbols become the
//! literal character, and every kind of whitespace or line break collapses to
//! a single space.
//!
//! Accents (`\'{e}`, `\"u`, `\c{c}`) and letter commands (`\ss`, `\o`) are
//! resolved to their Unicode characters before parsing. An accent with no
//! precomposed form is a conversion error rather than a silently dropped mark.

use lazy_static::lazy_static;
use mitex_parser::syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use mitex_spec_gen::DEFAULT_SPEC;
use phf::phf_map;
use regex::Regex;
use tracing::debug;

use super::command::is_escaped;
use crate::utils::error::{ExtractionError, ExtractionResult};

/// Accent command plus base letter to the precomposed character.
static ACCENTED: phf::Map<&'static str, &'static str> = phf_map! {
    "'a" => "á", "'e" => "é", "'i" => "í", "'o" => "ó", "'u" => "ú", "'y" => "ý",
    "'A" => "Á", "'E" => "É", "'I" => "Í", "'O" => "Ó", "'U" => "Ú", "'Y" => "Ý",
    "'c" => "ć", "'C" => "Ć", "'n" => "ń", "'N" => "Ń", "'s" => "ś", "'S" => "Ś",
    "'z" => "ź", "'Z" => "Ź", "'l" => "ĺ", "'L" => "Ĺ", "'r" => "ŕ", "'R" => "Ŕ",
    "`a" => "à", "`e" => "è", "`i" => "ì", "`o" => "ò", "`u" => "ù", "`A" => "À",
    "`E" => "È", "`I" => "Ì", "`O" => "Ò", "`U" => "Ù",
    "^a" => "â", "^e" => "ê", "^i" => "î", "^o" => "ô", "^u" => "û", "^A" => "Â",
    "^E" => "Ê", "^I" => "Î", "^O" => "Ô", "^U" => "Û",
    "\"a" => "ä", "\"e" => "ë", "\"i" => "ï", "\"o" => "ö", "\"u" => "ü", "\"y" => "ÿ",
    "\"A" => "Ä", "\"E" => "Ë", "\"I" => "Ï", "\"O" => "Ö", "\"U" => "Ü",
    "~a" => "ã", "~n" => "ñ", "~o" => "õ", "~A" => "Ã", "~N" => "Ñ", "~O" => "Õ",
    "=a" => "ā", "=e" => "ē", "=i" => "ī", "=o" => "ō", "=u" => "ū", "=A" => "Ā",
    "=E" => "Ē", "=I" => "Ī", "=O" => "Ō", "=U" => "Ū",
    ".z" => "ż", ".Z" => "Ż", ".e" => "ė", ".E" => "Ė",
    "cc" => "ç", "cC" => "Ç", "cs" => "ş", "cS" => "Ş",
    "vc" => "č", "vC" => "Č", "vs" => "š", "vS" => "Š", "vz" => "ž", "vZ" => "Ž",
    "vr" => "ř", "vR" => "Ř", "ve" => "ě", "vE" => "Ě", "vn" => "ň", "vN" => "Ň",
    "ua" => "ă", "uA" => "Ă", "ug" => "ğ", "uG" => "Ğ",
    "Ho" => "ő", "HO" => "Ő", "Hu" => "ű", "HU" => "Ű",
    "ka" => "ą", "kA" => "Ą", "ke" => "ę", "kE" => "Ę",
    "ra" => "å", "rA" => "Å", "ru" => "ů", "rU" => "Ů",
};

/// Letters spelled as control words.
static LETTER_COMMANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "ss" => "ß", "aa" => "å", "AA" => "Å", "ae" => "æ", "AE" => "Æ", "oe" => "œ",
    "OE" => "Œ", "o" => "ø", "O" => "Ø", "l" => "ł", "L" => "Ł", "i" => "ı", "j" => "ȷ",
};

lazy_static! {
    /// `\'e`, `\'{e}`, `\'{\i}`, `\c{c}`, `\c c`
    static ref ACCENT: Regex = Regex::new(
        r#"\\(?:(['"`^~=.])\s*|([cvuHkr])(\s*))(?:\{\s*(?:\\([ij])|([A-Za-z]))\s*\}|([A-Za-z]))"#
    )
    .expect("accent pattern is valid");

    static ref LETTER_COMMAND: Regex =
        Regex::new(r"\\(ss|aa|AA|ae|AE|oe|OE|o|O|l|L|i|j)\b(?:\{\}|\s+)?")
            .expect("letter command pattern is valid");
}

/// Convert a LaTeX span to a single line of plain text.
///
/// Unbalanced braces or parser error tokens are reported as
/// [`ExtractionError::TextConversion`] instead of returning the raw markup.
pub fn convert_tex_span(content: &str) -> ExtractionResult<String> {
    if let Some(problem) = brace_imbalance(content) {
        return Err(ExtractionError::conversion(content, problem));
    }

    let resolved = resolve_letter_commands(&resolve_accents(content)?);
    let tree = mitex_parser::parse(&resolved, DEFAULT_SPEC.clone());
    let mut text = String::with_capacity(content.len());
    let mut errors = Vec::new();
    visit_node(&tree, &mut text, &mut errors);

    if !errors.is_empty() {
        debug!("parse errors in span {:?}: {:?}", content, errors);
        return Err(ExtractionError::conversion(
            content,
            format!("parse error near {}", errors.join(", ")),
        ));
    }

    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Replace accent commands with precomposed characters.
fn resolve_accents(content: &str) -> ExtractionResult<String> {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in ACCENT.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(accent) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        let bare = caps.get(6);
        // \cite is not \c applied to "ite"
        let word_run_on = caps.get(2).is_some()
            && bare.is_some()
            && caps.get(3).map_or(true, |ws| ws.as_str().is_empty());
        if word_run_on || is_escaped(bytes, whole.start()) {
            continue;
        }
        let Some(base) = caps.get(4).or_else(|| caps.get(5)).or(bare) else {
            continue;
        };

        let key = format!("{}{}", accent.as_str(), base.as_str());
        let Some(ch) = ACCENTED.get(key.as_str()) else {
            return Err(ExtractionError::conversion(
                content,
                format!("no accented form of '{}' for \\{}", base.as_str(), accent.as_str()),
            ));
        };
        out.push_str(&content[last..whole.start()]);
        out.push_str(ch);
        last = whole.end();
    }
    out.push_str(&content[last..]);
    Ok(out)
}

fn resolve_letter_commands(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in LETTER_COMMAND.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(letter) = LETTER_COMMANDS.get(name.as_str()) else {
            continue;
        };
        if is_escaped(bytes, whole.start()) {
            continue;
        }
        out.push_str(&content[last..whole.start()]);
        out.push_str(letter);
        last = whole.end();
    }
    out.push_str(&content[last..]);
    out
}

fn visit_node(node: &SyntaxNode, out: &mut String, errors: &mut Vec<String>) {
    for child in node.children_with_tokens() {
        visit_element(child, out, errors);
    }
}

fn visit_element(elem: SyntaxElement, out: &mut String, errors: &mut Vec<String>) {
    use SyntaxKind::*;

    match elem.kind() {
        TokenError => {
            let text = match &elem {
                SyntaxElement::Node(n) => n.text().to_string(),
                SyntaxElement::Token(t) => t.text().to_string(),
            };
            errors.push(format!("'{}'", text));
        }

        // Optional arguments of known commands carry no display text
        ClauseArgument => {
            if let SyntaxElement::Node(n) = elem {
                if !n.children().any(|c| c.kind() == ItemBracket) {
                    visit_node(&n, out, errors);
                }
            }
        }

        TokenWhiteSpace | TokenLineBreak | TokenTilde | ItemNewLine => out.push(' '),

        TokenDitto => out.push('"'),

        TokenCommandSym => {
            if let SyntaxElement::Token(t) = elem {
                push_command_symbol(t.text(), out);
            }
        }

        TokenLBrace | TokenRBrace | TokenDollar | TokenBeginMath | TokenEndMath
        | TokenComment | ItemBlockComment | ClauseCommandName | ItemBegin | ItemEnd => {}

        _ => match elem {
            SyntaxElement::Node(n) => visit_node(&n, out, errors),
            SyntaxElement::Token(t) => out.push_str(t.text()),
        },
    }
}

fn push_command_symbol(text: &str, out: &mut String) {
    let Some(sym) = text.strip_prefix('\\') else {
        return;
    };
    match sym {
        "%" | "&" | "$" | "#" | "_" | "{" | "}" | "@" | "*" | "~" | "^" => out.push_str(sym),
        // \, \; \: \! \  and \\ are all spacing in running text
        "," | ";" | ":" | "!" | " " | "\\" => out.push(' '),
        _ => {}
    }
}

/// Describe the first brace imbalance in `content`, ignoring escaped braces.
fn brace_imbalance(content: &str) -> Option<String> {
    let bytes = content.as_bytes();
    let mut depth = 0i32;
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => {
                idx += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return Some(format!("unmatched '}}' at byte {}", idx));
                }
            }
            _ => {}
        }
        idx += 1;
    }
    if depth > 0 {
        Some(format!("{} unclosed '{{'", depth))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_unchanged() {
        assert_eq!(convert_tex_span("Ursula Gomez").unwrap(), "Ursula Gomez");
    }

    #[test]
    fn test_formatting_commands_are_stripped() {
        assert_eq!(
            convert_tex_span(r"\textbf{Francis} \emph{Carrillo}").unwrap(),
            "Francis Carrillo"
        );
    }

    #[test]
    fn test_paragraphs_collapse_to_one_line() {
        let text = convert_tex_span("First line\n\nsecond   paragraph\\\\ third").unwrap();
        assert_eq!(text, "First line second paragraph third");
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_escaped_symbols() {
        assert_eq!(convert_tex_span(r"R\&D 100\%").unwrap(), "R&D 100%");
    }

    #[test]
    fn test_grouping_braces_are_removed() {
        assert_eq!(convert_tex_span("{Galileo} {Galilei}").unwrap(), "Galileo Galilei");
    }

    #[test]
    fn test_accented_names() {
        assert_eq!(convert_tex_span(r"Efr\'{e}n Archer").unwrap(), "Efrén Archer");
        assert_eq!(convert_tex_span(r#"M\"uller"#).unwrap(), "Müller");
        assert_eq!(convert_tex_span(r"Fran\c{c}ois").unwrap(), "François");
        assert_eq!(convert_tex_span(r"\'{E}mile").unwrap(), "Émile");
        assert_eq!(convert_tex_span(r"Ju\'{\i}sa \v Sebek").unwrap(), "Juísa Šebek");
        assert_eq!(convert_tex_span(r#"{\"O}zt\"{u}rk"#).unwrap(), "Öztürk");
    }

    #[test]
    fn test_letter_commands() {
        assert_eq!(convert_tex_span(r"Stra\ss e").unwrap(), "Straße");
        assert_eq!(convert_tex_span(r"S\o{}ren \AA{}berg").unwrap(), "Søren Åberg");
        assert_eq!(convert_tex_span(r"\L{}ukasz").unwrap(), "Łukasz");
    }

    #[test]
    fn test_accent_lookalike_commands_are_untouched() {
        assert_eq!(convert_tex_span(r"\textit{Carol}").unwrap(), "Carol");
        assert_eq!(resolve_accents(r"\cite{x} \url{y}").unwrap(), r"\cite{x} \url{y}");
        assert_eq!(resolve_accents(r"a\\'e").unwrap(), r"a\\'e");
    }

    #[test]
    fn test_unknown_accent_is_an_error() {
        let err = convert_tex_span(r"\'{x}").unwrap_err();
        assert!(matches!(err, ExtractionError::TextConversion { .. }));
    }

    #[test]
    fn test_unbalanced_braces_are_an_error() {
        let err = convert_tex_span("Name }").unwrap_err();
        assert!(matches!(err, ExtractionError::TextConversion { .. }));
        assert!(convert_tex_span(r"\textbf{Name").is_err());
    }

    #[test]
    fn test_brace_imbalance_ignores_escapes() {
        assert_eq!(brace_imbalance(r"a \{ b"), None);
        assert!(brace_imbalance("a { b").is_some());
    }
}
