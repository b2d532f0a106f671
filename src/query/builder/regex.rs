//! Regex acceleration

use std::fmt::Debug;

use crate::fields::FieldUsage;
use crate::query::ast::QueryNode;
use crate::query::nodes::RegexQuery;
use crate::Result;

/// Builds regex queries for a field
///
/// Returning `None` means the pattern cannot be searched on this field; the
/// caller then searches the raw `/pattern/` text as a literal.
pub trait RegexAccelerator: Send + Sync + Debug {
    fn regex_query(&self, usage: &FieldUsage, pattern: &str) -> Result<Option<QueryNode>>;
}

/// Regex over the standard field, prefiltered through the n-gram sub-field
#[derive(Clone, Debug, Default)]
pub struct NgramRegexAccelerator {
    /// Refuse fields without an n-gram sub-field instead of scanning them
    require_ngram: bool,
}

impl NgramRegexAccelerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require_ngram(mut self, require_ngram: bool) -> Self {
        self.require_ngram = require_ngram;
        self
    }
}

impl RegexAccelerator for NgramRegexAccelerator {
    fn regex_query(&self, usage: &FieldUsage, pattern: &str) -> Result<Option<QueryNode>> {
        let query = RegexQuery::new(usage.standard(), pattern);
        match usage.ngram() {
            Some((field, gram_size)) => Ok(Some(QueryNode::Regex(
                query.with_ngram_field(field, gram_size),
            ))),
            None if self.require_ngram => Ok(None),
            None => Ok(Some(QueryNode::Regex(query))),
        }
    }
}
