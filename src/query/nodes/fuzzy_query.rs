//! Fuzzy query - matches terms within an edit distance
//!
//! # Example
//!
//! ```rust
//! use fieldquery::query::nodes::FuzzyQuery;
//!
//! // Find terms within edit distance 2 of "roust" (matches "rust")
//! let query = FuzzyQuery::new("content", "roust").with_edits(2);
//! ```

use serde::{Deserialize, Serialize};

/// Largest edit distance a fuzzy query may use
pub const MAX_EDITS: u32 = 2;

/// Query that matches terms within an edit distance of the query term
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuzzyQuery {
    /// Field to search in
    pub field: String,
    /// Term to match approximately
    pub text: String,
    /// Maximum edit distance, never above [`MAX_EDITS`]
    pub edits: u32,
    /// Number of initial characters that must match exactly (default: 0)
    #[serde(default)]
    pub prefix_length: usize,
    /// Maximum number of terms to consider (default: 50)
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

fn default_max_expansions() -> usize {
    50
}

impl FuzzyQuery {
    /// Create a new fuzzy query with the maximum edit distance
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            edits: MAX_EDITS,
            prefix_length: 0,
            max_expansions: default_max_expansions(),
        }
    }

    /// Set the maximum edit distance
    pub fn with_edits(mut self, edits: u32) -> Self {
        self.edits = edits.min(MAX_EDITS);
        self
    }

    /// Set the number of initial characters that must match exactly
    pub fn with_prefix_length(mut self, prefix_length: usize) -> Self {
        self.prefix_length = prefix_length;
        self
    }

    /// Set the maximum number of terms to consider
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

/// Convert a similarity written after `~` into an edit distance
///
/// `None` selects the automatic distance based on term length: up to two
/// characters allow no edits, up to five allow one, longer terms allow two.
/// Values of one or more are read as an edit count. Values between zero and
/// one are a similarity ratio scaled by the term length.
pub fn similarity_to_edits(similarity: Option<f32>, term_length: usize) -> u32 {
    let similarity = match similarity {
        None => {
            return match term_length {
                0..=2 => 0,
                3..=5 => 1,
                _ => MAX_EDITS,
            }
        }
        Some(similarity) => similarity,
    };

    if similarity >= 1.0 {
        (similarity as u32).min(MAX_EDITS)
    } else if similarity == 0.0 {
        0
    } else {
        let edits = ((1.0 - f64::from(similarity)) * term_length as f64) as u32;
        edits.min(MAX_EDITS)
    }
}
