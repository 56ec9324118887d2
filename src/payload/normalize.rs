//! Description markup to plain text

use regex_lite::Regex;
use std::sync::OnceLock;

static RE_LINE_BREAK: OnceLock<Regex> = OnceLock::new();
static RE_TAG: OnceLock<Regex> = OnceLock::new();
static RE_BLANK_RUN: OnceLock<Regex> = OnceLock::new();

fn re_line_break() -> &'static Regex {
    RE_LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
}

fn re_tag() -> &'static Regex {
    RE_TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn re_blank_run() -> &'static Regex {
    RE_BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Normalizes a raw description into plain text
///
/// 1. `<br>`, `<br/>` and `<br />` (any case) become `\n`
/// 2. Every other tag is removed
/// 3. Runs of three or more newlines collapse to exactly two
/// 4. Leading and trailing whitespace is trimmed
pub fn normalize_description(raw: &str) -> String {
    let text = re_line_break().replace_all(raw, "\n");
    let text = re_tag().replace_all(&text, "");
    let text = re_blank_run().replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Normalized text with fewer than two line breaks is a stub (e.g. just a name)
pub fn is_substantive(text: &str) -> bool {
    text.matches('\n').count() >= 2
}
