//! Small text helpers shared by the resolver, the feeds and artifact naming.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decompose and drop combining marks: `"PÚRPURA"` -> `"PURPURA"`.
pub fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapse whitespace runs (including NBSP) to a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&").replace("&quot;", "\"").replace("&#39;", "'")
}

/// Lowercase ASCII slug, runs of anything else collapsed into `sep`.
pub fn slugify(s: &str, sep: char) -> String {
    let folded = fold_diacritics(s);
    let mut out = String::with_capacity(folded.len());
    let mut pending_sep = false;
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() { out.push(sep); }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Upstream pages fill empty cells with dashes or "por confirmar".
pub fn meaningful(s: Option<&str>) -> Option<String> {
    let s = normalize_ws(s?);
    let placeholder = s.is_empty()
        || s.chars().all(|c| matches!(c, '-' | '\u{2013}' | '\u{2014}' | '?' | '.' | '_'))
        || fold_diacritics(&s).eq_ignore_ascii_case("por confirmar");
    if placeholder { None } else { Some(s) }
}
