//! Term query - exact match of one analyzed term on a field

use serde::{Deserialize, Serialize};

/// Query that matches documents containing an exact term in a field
///
/// The text is already normalized by the field's analyzer; nothing downstream
/// analyzes it again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact term to match
    pub text: String,
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
        }
    }
}
