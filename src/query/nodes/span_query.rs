//! Span queries - positional building blocks for proximity matching
//!
//! Unlike phrase queries, span clauses may themselves be multi-candidate
//! (a wildcard or fuzzy term rewritten to its top matching terms), and a
//! clause may be masked to look like it targets another field so that
//! sub-fields indexed with identical positions can share one proximity match.

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::nodes::TermQuery;
use crate::query::types::Occur;

/// Ordered or unordered proximity match over span clauses
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpanNearQuery {
    pub field: String,
    pub clauses: Vec<SpanQuery>,
    pub slop: u32,
    pub in_order: bool,
}

/// A query usable as a clause of a proximity match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum SpanQuery {
    /// Single term at a position
    Term(TermQuery),
    /// Any of the alternatives at a position
    Or { clauses: Vec<SpanQuery> },
    /// Nested proximity match
    Near(SpanNearQuery),
    /// Multi-term query rewritten to its best `top_terms` expansions
    MultiTerm {
        query: Box<QueryNode>,
        top_terms: usize,
    },
    /// Inner clause reported as if it searched `field`
    FieldMask {
        inner: Box<SpanQuery>,
        field: String,
    },
}

impl SpanQuery {
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        SpanQuery::Term(TermQuery::new(field, text))
    }

    /// Field this clause reports for position matching
    pub fn field(&self) -> Option<&str> {
        match self {
            SpanQuery::Term(term) => Some(&term.field),
            SpanQuery::Or { clauses } => clauses.first().and_then(SpanQuery::field),
            SpanQuery::Near(near) => Some(&near.field),
            SpanQuery::MultiTerm { query, .. } => query.field(),
            SpanQuery::FieldMask { field, .. } => Some(field),
        }
    }

    /// Wrap in a field mask unless the clause already reports `field`
    pub fn masked_as(self, field: &str) -> SpanQuery {
        if self.field() == Some(field) {
            self
        } else {
            SpanQuery::FieldMask {
                inner: Box::new(self),
                field: field.to_string(),
            }
        }
    }

    /// Convert an arbitrary query node into span form
    ///
    /// Returns `None` for nodes with no positional meaning, such as match-all
    /// or a boolean with required clauses. Boosts are dropped because span
    /// clauses carry no scoring of their own.
    pub fn from_node(node: QueryNode, top_terms: usize) -> Option<SpanQuery> {
        match node {
            QueryNode::Span(span) => Some(span),
            QueryNode::Term(term) => Some(SpanQuery::Term(term)),
            QueryNode::Fuzzy(_)
            | QueryNode::Prefix(_)
            | QueryNode::Wildcard(_)
            | QueryNode::Regex(_) => Some(SpanQuery::MultiTerm {
                query: Box::new(node),
                top_terms,
            }),
            QueryNode::Boost { query, .. } => SpanQuery::from_node(*query, top_terms),
            QueryNode::Phrase(phrase) => {
                let clauses = phrase
                    .terms
                    .into_iter()
                    .map(|text| SpanQuery::term(phrase.field.clone(), text))
                    .collect();
                Some(SpanQuery::Near(SpanNearQuery {
                    field: phrase.field,
                    clauses,
                    slop: phrase.slop,
                    in_order: true,
                }))
            }
            QueryNode::MultiPhrase(multi) => {
                let clauses = multi
                    .positions
                    .into_iter()
                    .map(|alternatives| alternatives_to_span(&multi.field, alternatives))
                    .collect();
                Some(SpanQuery::Near(SpanNearQuery {
                    field: multi.field,
                    clauses,
                    slop: multi.slop,
                    in_order: true,
                }))
            }
            QueryNode::Boolean(boolean) => {
                if !boolean.is_pure_disjunction() {
                    return None;
                }
                let clauses: Vec<SpanQuery> = boolean
                    .clauses
                    .into_iter()
                    .filter(|clause| clause.occur == Occur::Should)
                    .filter_map(|clause| SpanQuery::from_node(clause.query, top_terms))
                    .collect();
                match clauses.len() {
                    0 => None,
                    1 => clauses.into_iter().next(),
                    _ => Some(SpanQuery::Or { clauses }),
                }
            }
            QueryNode::FieldExists { .. } | QueryNode::MatchAll | QueryNode::MatchNone => None,
        }
    }
}

/// One position's alternatives as a span slot: a lone term or an OR of terms
pub fn alternatives_to_span(field: &str, alternatives: Vec<String>) -> SpanQuery {
    let mut clauses: Vec<SpanQuery> = alternatives
        .into_iter()
        .map(|text| SpanQuery::term(field, text))
        .collect();
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        SpanQuery::Or { clauses }
    }
}
