//! Wildcard query - matches terms using wildcards
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//!
//! A backslash escapes the following character, so `pi\*kl?` matches a
//! literal asterisk.
//!
//! # Example
//!
//! ```rust
//! use fieldquery::query::nodes::WildcardQuery;
//!
//! let query = WildcardQuery::new("title.precise", "pr?g*");
//! ```

use serde::{Deserialize, Serialize};

/// Query that matches terms using wildcard patterns
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WildcardQuery {
    /// Field to search in
    pub field: String,
    /// Wildcard pattern, escapes preserved
    pub pattern: String,
}

impl WildcardQuery {
    /// Create a new wildcard query
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
        }
    }
}

/// Split a pattern into units where an escape and its target stay together
fn pattern_units(pattern: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut iter = pattern.char_indices().peekable();
    while let Some((start, ch)) = iter.next() {
        let mut end = start + ch.len_utf8();
        if ch == '\\' {
            if let Some((next, escaped)) = iter.next() {
                end = next + escaped.len_utf8();
            }
        }
        units.push(&pattern[start..end]);
    }
    units
}

/// Whether the pattern starts with an unescaped `*` or `?`
pub fn has_leading_wildcard(pattern: &str) -> bool {
    pattern.starts_with('*') || pattern.starts_with('?')
}

/// Whether the text contains an unescaped `*` or `?` anywhere
pub fn has_wildcard(text: &str) -> bool {
    pattern_units(text).iter().any(|unit| *unit == "*" || *unit == "?")
}

/// Reverse a pattern for use against a reversed-text field
///
/// Escape pairs are kept in order so `\*` still escapes the asterisk.
pub fn reverse_pattern(pattern: &str) -> String {
    pattern_units(pattern).into_iter().rev().collect()
}
