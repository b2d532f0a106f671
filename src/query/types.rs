//! Core types for the query system

use serde::{Deserialize, Serialize};

/// Operator joining clauses written next to each other without AND/OR
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultOperator {
    /// All clauses must match
    #[default]
    And,
    /// At least one clause must match
    Or,
}

impl DefaultOperator {
    /// Occurrence given to clauses that carry no explicit `+` or `-`
    pub fn occur(self) -> Occur {
        match self {
            DefaultOperator::And => Occur::Must,
            DefaultOperator::Or => Occur::Should,
        }
    }
}

/// Boolean role of a clause
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

impl Occur {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occur::Must => "must",
            Occur::Should => "should",
            Occur::MustNot => "must_not",
        }
    }
}
