//! Lucene-style query string parser
//!
//! Supports syntax like:
//! - `title:rust AND tags:tutorial`
//! - `title^2, body:(foo bar)`
//! - `"exact phrase"~2` and `"prefix* in phrase"`
//! - `prog*`, `pr?g`, `/pro.ram/`
//! - `author:john~` and `john~1`
//! - `+required -excluded`, `NOT excluded`, `a && b || c`
//!
//! The parser produces a [`ParseNode`] tree that still speaks in terms of
//! field names as the user wrote them. The query visitor turns it into a
//! [`QueryNode`](crate::query::ast::QueryNode) tree.
//!
//! # Example
//!
//! ```rust
//! use fieldquery::query::query_string::{ParseNode, QueryStringParser};
//!
//! let tree = QueryStringParser::new("title:rust AND published").parse();
//! assert!(matches!(tree, ParseNode::Unmarked { .. }));
//! ```

pub mod lexer;
pub mod parser;
pub mod syntax;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::QueryStringParser;
pub use syntax::ParseNode;
