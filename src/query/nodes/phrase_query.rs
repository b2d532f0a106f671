//! Phrase queries - match analyzed terms at consecutive positions
//!
//! A phrase query matches documents containing the sequence of terms,
//! optionally allowing a number of intervening positions (slop). A
//! multi-phrase query allows several alternative terms at each position,
//! which is how synonyms inside quoted text are searched.
//!
//! # Example
//!
//! ```rust
//! use fieldquery::query::nodes::{MultiPhraseQuery, PhraseQuery};
//!
//! // Exact phrase match
//! let query = PhraseQuery::new("content", vec!["rust".to_string(), "programming".to_string()]);
//!
//! // Phrase with slop (allows 2 positions between)
//! let query = query.with_slop(2);
//!
//! // "foo" or its synonym "bar", followed by "baz"
//! let query = MultiPhraseQuery::new(
//!     "content",
//!     vec![
//!         vec!["foo".to_string(), "bar".to_string()],
//!         vec!["baz".to_string()],
//!     ],
//! );
//! ```

use serde::{Deserialize, Serialize};

/// Query that matches an ordered sequence of single terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhraseQuery {
    /// Field to search in
    pub field: String,
    /// Analyzed terms, one per position
    pub terms: Vec<String>,
    /// Maximum number of positions between terms (default: 0 for exact phrase)
    #[serde(default)]
    pub slop: u32,
}

impl PhraseQuery {
    /// Create a new phrase query with exact matching (slop=0)
    pub fn new(field: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            field: field.into(),
            terms,
            slop: 0,
        }
    }

    /// Set the slop (maximum positions between terms)
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }
}

/// Query that matches an ordered sequence of positions, each allowing
/// several alternative terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiPhraseQuery {
    /// Field to search in
    pub field: String,
    /// Alternatives per position, in position order
    pub positions: Vec<Vec<String>>,
    /// Maximum number of positions between terms
    #[serde(default)]
    pub slop: u32,
}

impl MultiPhraseQuery {
    pub fn new(field: impl Into<String>, positions: Vec<Vec<String>>) -> Self {
        Self {
            field: field.into(),
            positions,
            slop: 0,
        }
    }

    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }
}

impl From<PhraseQuery> for MultiPhraseQuery {
    /// Every phrase term becomes a single-alternative position
    fn from(phrase: PhraseQuery) -> Self {
        Self {
            field: phrase.field,
            positions: phrase.terms.into_iter().map(|term| vec![term]).collect(),
            slop: phrase.slop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_phrase_query_creation() {
        let query = PhraseQuery::new("content", terms(&["rust", "programming"]));
        assert_eq!(query.field, "content");
        assert_eq!(query.slop, 0);
    }

    #[test]
    fn test_phrase_query_with_slop() {
        let query = PhraseQuery::new("content", terms(&["a", "b"])).with_slop(2);
        assert_eq!(query.slop, 2);
    }

    #[test]
    fn test_phrase_into_multi_phrase() {
        let phrase = PhraseQuery::new("content", terms(&["foo", "baz"])).with_slop(3);
        let multi = MultiPhraseQuery::from(phrase);
        assert_eq!(multi.positions, vec![terms(&["foo"]), terms(&["baz"])]);
        assert_eq!(multi.slop, 3);
    }

    #[test]
    fn test_phrase_serialization() {
        let query = PhraseQuery::new("content", terms(&["a", "b"]));
        let json = serde_json::to_string(&query).unwrap();
        let parsed: PhraseQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
    }
}
