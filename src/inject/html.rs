//! Text-level HTML transforms.
//!
//! The rewriter only needs to splice one snippet after the opening `<head>`
//! tag, so this works on the raw body bytes instead of a parsed document.
//! Bytes outside the splice point are copied untouched, whatever the charset.
//! Callers go through [`inject_after_head_tag`] only.

use crate::config::SiteEnv;

/// Global bindings assigned by the injected script.
pub const OWNER_GLOBAL: &str = "REPO_OWNER";
pub const REPO_GLOBAL: &str = "REPO_NAME";
pub const TOKEN_GLOBAL: &str = "API_TOKEN";

/// Byte offset just past the first opening `<head>` tag.
///
/// Matches `<head` case-insensitively when followed by `>`, `/` or
/// whitespace, so attributes are tolerated and `<header>` is not a match.
pub fn find_head_open(bytes: &[u8]) -> Option<usize> {
    let mut from = 0;

    while let Some(rel) = bytes[from..].iter().position(|&b| b == b'<') {
        let start = from + rel;
        let name_end = start + 5;
        if name_end < bytes.len() && bytes[start + 1..name_end].eq_ignore_ascii_case(b"head") {
            match bytes[name_end] {
                b'>' => return Some(name_end + 1),
                b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => {
                    return bytes[name_end..]
                        .iter()
                        .position(|&b| b == b'>')
                        .map(|gt| name_end + gt + 1);
                }
                _ => {}
            }
        }
        from = start + 1;
    }

    None
}

/// Insert `snippet` right after the first opening head tag.
///
/// Returns `None` when the document has no head tag.
pub fn inject_after_head_tag(html: &[u8], snippet: &[u8]) -> Option<Vec<u8>> {
    let at = find_head_open(html)?;
    let mut out = Vec::with_capacity(html.len() + snippet.len());
    out.extend_from_slice(&html[..at]);
    out.extend_from_slice(snippet);
    out.extend_from_slice(&html[at..]);
    Some(out)
}

/// Inline script assigning the site values to their globals.
pub fn env_script(env: &SiteEnv) -> String {
    let token = env.token.as_deref().unwrap_or_default();
    format!(
        "<script>window.{}='{}';window.{}='{}';window.{}='{}';</script>",
        OWNER_GLOBAL,
        escape_js_string(&env.owner),
        REPO_GLOBAL,
        escape_js_string(&env.repo),
        TOKEN_GLOBAL,
        escape_js_string(token),
    )
}

/// Escape a value for a single-quoted JS string inside a `<script>` element.
pub fn escape_js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3c"),
            '>' => out.push_str("\\x3e"),
            '&' => out.push_str("\\x26"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}

/// Escape text for HTML element content.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
