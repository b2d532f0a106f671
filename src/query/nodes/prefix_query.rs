//! Prefix query - matches terms starting with a prefix
//!
//! # Example
//!
//! ```rust
//! use fieldquery::query::nodes::PrefixQuery;
//!
//! // Matches "program", "programming", "programmer", ...
//! let query = PrefixQuery::new("title.precise", "prog");
//! ```

use serde::{Deserialize, Serialize};

/// Query that matches terms starting with the given prefix
///
/// An empty prefix matches every document that has any term in the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// Field to search in
    pub field: String,
    /// Prefix to match, without the trailing `*`
    pub prefix: String,
}

impl PrefixQuery {
    /// Create a new prefix query
    pub fn new(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: prefix.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_query_creation() {
        let query = PrefixQuery::new("title", "prog");
        assert_eq!(query.field, "title");
        assert_eq!(query.prefix, "prog");
    }
}
