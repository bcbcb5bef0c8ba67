//! Small string helpers shared by the extractor, formatter and logging.

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last char boundary at or before `max` bytes and
/// get `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Split `text` once on its first key separator.
///
/// Colons inside a URL are not separators: once `://` is seen, the rest of
/// that whitespace-delimited token (host, port, path) is skipped. So
/// `"Dashboard: https://x"` splits into `("Dashboard", "https://x")`, while a
/// bare URL or `"see https://x:8080"` does not split at all. Both halves are
/// returned untrimmed.
pub fn split_key_value(text: &str) -> Option<(&str, &str)> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(':') {
        let at = from + rel;
        if text[at..].starts_with("://") {
            from = text[at..]
                .find(char::is_whitespace)
                .map_or(text.len(), |end| at + end);
            continue;
        }
        return Some((&text[..at], &text[at + 1..]));
    }
    None
}

/// Collapse runs of whitespace (including non-breaking spaces) into single
/// spaces and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
