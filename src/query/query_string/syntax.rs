//! Parse tree produced by the query string parser

use serde::{Deserialize, Serialize};

use crate::fields::FieldReference;
use crate::query::builder::PhraseItem;

/// A node of the parsed query string
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ParseNode {
    /// Clauses written next to each other, joined by the default operator
    Unmarked { clauses: Vec<ParseNode> },
    Or { clauses: Vec<ParseNode> },
    And { clauses: Vec<ParseNode> },
    /// `+clause`
    Must { clause: Box<ParseNode> },
    /// `-clause`, `!clause` or `NOT clause`
    MustNot { clause: Box<ParseNode> },
    /// `fields:clause`; `raw` is the whole clause as written
    Fielded {
        fields: Vec<FieldReference>,
        clause: Box<ParseNode>,
        raw: String,
    },
    /// `clause^boost`; `boost` is `None` when the suffix is not a number
    Boosted {
        clause: Box<ParseNode>,
        boost: Option<f32>,
        raw: String,
    },
    Phrase {
        items: Vec<PhraseItem>,
        slop: Option<u32>,
        use_quoted_field: bool,
    },
    Term { text: String },
    Fuzzy { text: String, similarity: Option<f32> },
    /// Text before the trailing `*`
    Prefix { text: String },
    Wildcard { pattern: String },
    Regex { pattern: String },
    /// A lone `*`
    FieldExists,
}

impl ParseNode {
    pub fn term(text: impl Into<String>) -> Self {
        ParseNode::Term { text: text.into() }
    }

    /// Whether the query string contained nothing searchable
    pub fn is_empty(&self) -> bool {
        match self {
            ParseNode::Unmarked { clauses } => clauses.is_empty(),
            _ => false,
        }
    }
}
