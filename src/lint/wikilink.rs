//! Wikilink extraction. Code is stripped first so links inside fenced blocks
//! or inline code spans are not reported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Opening and closing fences must each start a line; the info string is allowed
static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```[^\n]*\n.*?^```[^\n]*$").expect("valid fenced code regex")
});

static INLINE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("valid inline code regex"));

// `[[target]]` or `[[target|alias]]`. Nested brackets are not understood.
static WIKILINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]+)?\]\]").expect("valid wikilink regex")
});

/// One `[[...]]` reference found in a note body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    pub source_file: String,
    /// Target text as written, trimmed
    pub raw_target: String,
    /// Lowercased last path segment of the target
    pub normalized_target: String,
}

/// Remove fenced code blocks, then inline code spans
pub fn strip_code(body: &str) -> String {
    let without_fences = FENCED_CODE_RE.replace_all(body, "\n");
    INLINE_CODE_RE.replace_all(&without_fences, " ").into_owned()
}

/// Trimmed, non-empty link targets in order of appearance. The input is scanned
/// as-is; call [`strip_code`] first to ignore code.
pub fn scan_wikilinks(text: &str) -> Vec<String> {
    WIKILINK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

/// Last `/`-separated segment, ignoring trailing separators
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return path;
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Key used to look a target up among existing notes and attachments
pub fn normalize_target(raw: &str) -> String {
    base_name(raw.trim()).to_lowercase()
}

/// Every wikilink in `body` outside of code, attributed to `source_file`
pub fn extract_link_refs(source_file: &str, body: &str) -> Vec<LinkRef> {
    scan_wikilinks(&strip_code(body))
        .into_iter()
        .map(|raw_target| LinkRef {
            source_file: source_file.to_string(),
            normalized_target: normalize_target(&raw_target),
            raw_target,
        })
        .collect()
}
