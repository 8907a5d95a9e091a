//! Doc-comment extraction — finds `/** ... */` blocks and the code line
//! that follows each one.

use crate::split::split_delimited_char;
use regex::Regex;
use std::sync::LazyLock;

static RE_DOC_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*.*?\*/").unwrap());

static RE_STAR_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\*").unwrap());

/// Return every doc comment in `text`, in order, paired with the code
/// line following it.
///
/// The comment text is the full delimited block including `/**` and
/// `*/`. The next line is normally the first *logical* line after the
/// comment: physical lines are re-joined across unclosed parentheses,
/// so a signature whose parameter list spans several lines comes back
/// as one string. Comments containing `@class` instead take the raw
/// physical next line, since class declarations need not carry a
/// parenthesized signature. At end of input the next line is empty.
///
/// Unterminated comments simply produce no match; this never fails.
pub fn get_doc_comments(text: &str) -> Vec<(String, String)> {
    RE_DOC_COMMENT
        .find_iter(text)
        .map(|m| {
            let comment = m.as_str().to_string();
            let next_line = next_code_line(text, m.end(), comment.contains("@class"));
            (comment, next_line)
        })
        .collect()
}

/// First line of code after byte offset `from` (the end of a comment).
fn next_code_line(text: &str, from: usize, raw_physical: bool) -> String {
    // Skip to the line after the one holding the comment close.
    let rest = match text[from..].find('\n') {
        Some(nl) => &text[from + nl + 1..],
        None => return String::new(),
    };
    if raw_physical {
        match rest.find('\n') {
            Some(nl) => rest[..nl].to_string(),
            None => rest.to_string(),
        }
    } else {
        split_delimited_char("()", '\n', rest)
            .next()
            .unwrap_or("")
            .to_string()
    }
}

/// Strip the comment delimiters and the leading `*` decoration from
/// every interior line, then trim. Idempotent on its own output.
pub fn strip_stars(doc_comment: &str) -> String {
    let interior = doc_comment
        .strip_prefix("/**")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(doc_comment);
    RE_STAR_PREFIX.replace_all(interior, "\n").trim().to_string()
}
