//! Small pure text helpers.

/// The first `max` characters of `s`, counted in `char`s so Unicode scalar
/// values are never split.
#[must_use]
pub fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// The last `max` characters of `s`.
#[must_use]
pub fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Keep `head` leading and `tail` trailing characters joined by `...`.
///
/// Strings that already fit in `head + tail` characters are returned as-is.
#[must_use]
pub fn elide_middle(s: &str, head: usize, tail: usize) -> String {
    if s.chars().count() <= head + tail {
        return s.to_string();
    }
    format!("{}...{}", head_chars(s, head), tail_chars(s, tail))
}

/// Leading `max` characters followed by `...`, whether or not anything was cut.
///
/// Used for one-line previews where the trailing ellipsis marks "this is a
/// preview", not "this was truncated".
#[must_use]
pub fn preview(s: &str, max: usize) -> String {
    format!("{}...", head_chars(s, max))
}
