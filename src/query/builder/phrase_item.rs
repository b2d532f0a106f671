//! Terms inside a quoted phrase

use serde::{Deserialize, Serialize};

/// One whitespace separated term of a phrase
///
/// Literals are analyzed with the phrase's field. The other kinds build
/// their own multi-term query and force the phrase into a span query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhraseItem {
    Literal { text: String },
    /// Text before a trailing `*`
    Prefix { text: String },
    Wildcard { pattern: String },
    Fuzzy {
        text: String,
        similarity: Option<f32>,
    },
}

impl PhraseItem {
    pub fn literal(text: impl Into<String>) -> Self {
        PhraseItem::Literal { text: text.into() }
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        PhraseItem::Prefix { text: text.into() }
    }

    pub fn wildcard(pattern: impl Into<String>) -> Self {
        PhraseItem::Wildcard {
            pattern: pattern.into(),
        }
    }

    pub fn fuzzy(text: impl Into<String>, similarity: Option<f32>) -> Self {
        PhraseItem::Fuzzy {
            text: text.into(),
            similarity,
        }
    }
}
