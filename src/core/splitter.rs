use crate::core::text::{collapse_whitespace, strip_leading_bullets};
use crate::core::vocab::{lookup_header, HEADER_ALIASES};
use regex::Regex;
use std::sync::LazyLock;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut tokens: Vec<&str> = HEADER_ALIASES.iter().map(|a| a.token).collect();
    tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\b(\s*:)?", alternation)).unwrap()
});

/// Breaks a chat line into one fragment per section marker.
///
/// A marker counts when it carries a colon ("Material:") or is a bare alias
/// ("AK"); bare aliases get the colon appended. A bare alias inside a
/// hyphenated compound ("AK-Rohr") is part of a word. Markers at the start of the
/// line stay where they are, every other marker starts a new fragment.
pub fn split_report_line(line: &str) -> Vec<String> {
    let lead = line.len() - strip_leading_bullets(line).len();
    let mut rebuilt = String::with_capacity(line.len() + 8);
    let mut last = 0;

    for caps in MARKER_RE.captures_iter(line) {
        let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let has_colon = caps.get(2).is_some();
        let bare = lookup_header(&collapse_whitespace(&token.as_str().to_lowercase()))
            .is_some_and(|alias| alias.bare);
        if !has_colon && (!bare || line[whole.end()..].starts_with('-')) {
            continue;
        }

        rebuilt.push_str(&line[last..whole.start()]);
        if whole.start() > lead {
            rebuilt.push('\n');
        }
        rebuilt.push_str(token.as_str());
        rebuilt.push(':');
        last = whole.end();
    }
    rebuilt.push_str(&line[last..]);

    rebuilt
        .split('\n')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}
