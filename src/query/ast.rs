//! Query node algebra
//!
//! [`QueryNode`] is the output of compilation: an owned tree handed to a
//! host search engine. Nodes are built bottom-up and never shared.

use serde::{Deserialize, Serialize};

use super::nodes::{
    BooleanQuery, FuzzyQuery, MultiPhraseQuery, PhraseQuery, PrefixQuery, RegexQuery, SpanQuery,
    TermQuery, WildcardQuery,
};

/// A compiled query tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryNode {
    Term(TermQuery),
    Phrase(PhraseQuery),
    MultiPhrase(MultiPhraseQuery),
    Span(SpanQuery),
    Fuzzy(FuzzyQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Regex(RegexQuery),
    /// Documents that have any value in the field
    FieldExists { field: String },
    Boolean(BooleanQuery),
    /// Inner query with its score multiplied by `factor`
    Boost { query: Box<QueryNode>, factor: f32 },
    MatchAll,
    MatchNone,
}

impl QueryNode {
    /// Shorthand for a term query node
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        QueryNode::Term(TermQuery::new(field, text))
    }

    /// Get the query type name for debugging and logging
    pub fn query_type(&self) -> &'static str {
        match self {
            QueryNode::Term(_) => "term",
            QueryNode::Phrase(_) => "phrase",
            QueryNode::MultiPhrase(_) => "multi_phrase",
            QueryNode::Span(_) => "span",
            QueryNode::Fuzzy(_) => "fuzzy",
            QueryNode::Prefix(_) => "prefix",
            QueryNode::Wildcard(_) => "wildcard",
            QueryNode::Regex(_) => "regex",
            QueryNode::FieldExists { .. } => "field_exists",
            QueryNode::Boolean(_) => "boolean",
            QueryNode::Boost { .. } => "boost",
            QueryNode::MatchAll => "match_all",
            QueryNode::MatchNone => "match_none",
        }
    }

    /// Field searched by this node, if it targets exactly one
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryNode::Term(q) => Some(&q.field),
            QueryNode::Phrase(q) => Some(&q.field),
            QueryNode::MultiPhrase(q) => Some(&q.field),
            QueryNode::Span(q) => q.field(),
            QueryNode::Fuzzy(q) => Some(&q.field),
            QueryNode::Prefix(q) => Some(&q.field),
            QueryNode::Wildcard(q) => Some(&q.field),
            QueryNode::Regex(q) => Some(&q.field),
            QueryNode::FieldExists { field } => Some(field),
            QueryNode::Boost { query, .. } => query.field(),
            QueryNode::Boolean(_) | QueryNode::MatchAll | QueryNode::MatchNone => None,
        }
    }

    /// Multiply this node's boost by `factor`
    ///
    /// Nested boosts collapse into one wrapper and a factor of one adds none.
    pub fn boosted(self, factor: f32) -> QueryNode {
        if factor == 1.0 {
            return self;
        }
        match self {
            QueryNode::Boost { query, factor: inner } => {
                let combined = inner * factor;
                if combined == 1.0 {
                    *query
                } else {
                    QueryNode::Boost {
                        query,
                        factor: combined,
                    }
                }
            }
            other => QueryNode::Boost {
                query: Box::new(other),
                factor,
            },
        }
    }
}

impl From<BooleanQuery> for QueryNode {
    fn from(query: BooleanQuery) -> Self {
        QueryNode::Boolean(query)
    }
}

impl From<SpanQuery> for QueryNode {
    fn from(query: SpanQuery) -> Self {
        QueryNode::Span(query)
    }
}
