//! Regex query - matches field text against a regular expression

use serde::{Deserialize, Serialize};

/// N-gram sub-field used to prefilter candidates before running the regex
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramAcceleration {
    pub field: String,
    pub gram_size: usize,
}

/// Query that matches documents whose field text matches a pattern
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegexQuery {
    /// Field whose stored text is matched
    pub field: String,
    /// Pattern without the surrounding slashes
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<NgramAcceleration>,
}

impl RegexQuery {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            acceleration: None,
        }
    }

    /// Prefilter through an n-gram field with the given gram size
    pub fn with_ngram_field(mut self, field: impl Into<String>, gram_size: usize) -> Self {
        self.acceleration = Some(NgramAcceleration {
            field: field.into(),
            gram_size,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_query() {
        let query = RegexQuery::new("title", "fo+");
        assert_eq!(query.acceleration, None);

        let query = query.with_ngram_field("title.trigram", 3);
        assert_eq!(
            query.acceleration,
            Some(NgramAcceleration {
                field: "title.trigram".to_string(),
                gram_size: 3
            })
        );
    }

    #[test]
    fn test_unaccelerated_serialization_omits_ngram() {
        let json = serde_json::to_value(RegexQuery::new("title", "fo+")).unwrap();
        assert!(json.get("acceleration").is_none());
    }
}
