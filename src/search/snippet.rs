/// Longest line shown in a snippet before it is cut with an ellipsis
pub const SNIPPET_MAX_CHARS: usize = 120;
/// Non-blank lines shown when no line matches the query
pub const PREVIEW_LINES: usize = 5;

fn truncate_line(line: &str) -> String {
    if line.chars().count() > SNIPPET_MAX_CHARS {
        let cut: String = line.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

/// First non-blank line containing `query_lower`, case-insensitively
pub fn find_matching_line(body: &str, query_lower: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| line.to_lowercase().contains(query_lower))
        .map(truncate_line)
}

/// The first `max_lines` non-blank lines. Leading blank lines are dropped and
/// runs of blank lines collapse to one.
pub fn content_preview(body: &str, max_lines: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut content_count = 0;
    let mut last_was_empty = false;

    for line in body.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if last_was_empty || lines.is_empty() {
                continue;
            }
            lines.push(String::new());
            last_was_empty = true;
            continue;
        }

        last_was_empty = false;
        lines.push(truncate_line(trimmed));

        content_count += 1;
        if content_count >= max_lines {
            break;
        }
    }

    if lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

/// Snippet shown under a hit: the matching line for text searches, otherwise a preview
pub fn matched_snippet(body: &str, query: Option<&str>) -> String {
    let query_lower = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();

    if !query_lower.is_empty() {
        if let Some(line) = find_matching_line(body, &query_lower) {
            return line;
        }
    }

    content_preview(body, PREVIEW_LINES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_line_is_case_insensitive() {
        let body = "# Heading\n\nSome intro\n  The PROJECT starts Monday  \nlater";
        assert_eq!(
            matched_snippet(body, Some("project")),
            "The PROJECT starts Monday"
        );
    }

    #[test]
    fn test_long_line_is_truncated() {
        let body = format!("needle {}", "x".repeat(200));
        let snippet = matched_snippet(&body, Some("needle"));
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(snippet.ends_with('…'));
    }

    #[test]
    fn test_preview_when_nothing_matches() {
        let body = "\n\nfirst\n\n\nsecond\nthird\nfourth\nfifth\nsixth\n";
        assert_eq!(
            matched_snippet(body, Some("absent")),
            "first\n\nsecond\nthird\nfourth\nfifth"
        );
        assert_eq!(matched_snippet(body, None), matched_snippet(body, Some("absent")));
    }

    #[test]
    fn test_preview_drops_trailing_blank() {
        assert_eq!(content_preview("one\n\n", 5), "one");
        assert_eq!(content_preview("", 5), "");
    }
}
