//! String helpers for log previews and console output.

/// Shorten `s` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Counts `char`s, so multi-byte text is never split.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat = s.trim().replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let kept: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
