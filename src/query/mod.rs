//! Query string compilation
//!
//! This module turns end-user query strings into field-aware query trees:
//! - [`query_string`] parses Lucene-style syntax into a [`ParseNode`] tree
//! - [`visitor`] walks that tree, resolving fields per clause
//! - [`builder`] builds term, phrase, span and multi-term queries per field
//! - [`nodes`] and [`ast`] hold the resulting [`QueryNode`] algebra
//!
//! # Example
//!
//! Compiling `title:"rust programming" -java` yields, serialized:
//!
//! ```json
//! {
//!   "type": "boolean",
//!   "clauses": [
//!     { "query": { "type": "phrase", "field": "title.precise", "terms": ["rust", "programming"], "slop": 0 }, "occur": "must" },
//!     { "query": { "type": "term", "field": "text", "text": "java" }, "occur": "must_not" }
//!   ],
//!   "minimum_should_match": 0
//! }
//! ```

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod nodes;
pub mod query_string;
pub mod types;
pub mod visitor;

pub use ast::QueryNode;
pub use builder::{
    FieldOperation, FieldQueryBuilder, FieldsQueryBuilder, NgramRegexAccelerator, PhraseItem,
    RegexAccelerator, TermPositionAssembler,
};
pub use compiler::QueryCompiler;
pub use nodes::{BooleanClause, BooleanQuery, SpanQuery, TermQuery};
pub use query_string::{ParseNode, QueryStringParser};
pub use types::*;
pub use visitor::{QueryVisitor, VisitedClause};
