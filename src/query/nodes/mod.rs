//! Concrete query node payloads
//!
//! Each variant of [`crate::query::QueryNode`] that carries data stores one
//! of these types.

mod bool_query;
mod fuzzy_query;
mod phrase_query;
mod prefix_query;
mod regex_query;
mod span_query;
mod term_query;
mod wildcard_query;

pub use bool_query::{BooleanClause, BooleanQuery};
pub use fuzzy_query::{similarity_to_edits, FuzzyQuery, MAX_EDITS};
pub use phrase_query::{MultiPhraseQuery, PhraseQuery};
pub use prefix_query::PrefixQuery;
pub use regex_query::{NgramAcceleration, RegexQuery};
pub use span_query::{alternatives_to_span, SpanNearQuery, SpanQuery};
pub use term_query::TermQuery;
pub use wildcard_query::{has_leading_wildcard, has_wildcard, reverse_pattern, WildcardQuery};
