//! String utilities for the domain layer.

/// Shorten text for a speech or thought bubble.
///
/// Keeps the first `max_chars` characters and appends `...` when anything was
/// cut. Counts characters, not bytes, so multibyte text is never split.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut chars = s.char_indices();
    match chars.nth(max_chars) {
        None => s.to_string(),
        Some((end, _)) => format!("{}...", &s[..end]),
    }
}
