//! Outbound reply limits
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Limits counted in characters; autocomplete choice clamping
//! - 1.0.0: Message truncation helpers

/// Discord message content limit, in characters
pub const MESSAGE_LIMIT: usize = 2000;
/// Maximum number of autocomplete choices per response
pub const AUTOCOMPLETE_LIMIT: usize = 25;
/// Maximum length of an autocomplete choice name or value
pub const CHOICE_LIMIT: usize = 100;

const ELLIPSIS: &str = "...";

/// Truncate text to at most `limit` characters, marking the cut with "..."
pub fn truncate_to(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    if limit >= ELLIPSIS.len() {
        truncated.push_str(ELLIPSIS);
    }
    truncated
}

/// Truncate text to fit in one message
pub fn truncate_for_message(text: &str) -> String {
    truncate_to(text, MESSAGE_LIMIT)
}

/// Fit autocomplete choices into what Discord accepts
pub fn clamp_choices(choices: Vec<(String, String)>) -> Vec<(String, String)> {
    choices
        .into_iter()
        .take(AUTOCOMPLETE_LIMIT)
        .map(|(name, value)| (truncate_to(&name, CHOICE_LIMIT), truncate_to(&value, CHOICE_LIMIT)))
        .collect()
}
