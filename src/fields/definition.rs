//! Field descriptions at each stage of resolution
//!
//! A [`FieldReference`] is what the user wrote, a [`FieldDefinition`] names
//! the physical sub-fields behind a field, and a [`FieldUsage`] is a fully
//! resolved, query-ready field with analyzers and a final boost.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::QueryError;
use crate::tokenizer::TextAnalyzer;

fn default_boost() -> f32 {
    1.0
}

fn default_ngram_size() -> usize {
    3
}

/// Physical sub-fields backing one field name
///
/// Only `standard` is required. Missing sub-fields fall back to `precise`
/// or `standard` when queries are built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Analyzed, stemmed field
    pub standard: String,
    /// Lightly analyzed field used for phrases and multi-term queries
    #[serde(default)]
    pub precise: Option<String>,
    /// Reversed text, accelerates leading wildcards
    #[serde(default)]
    pub reverse_precise: Option<String>,
    /// Edge n-grams, accelerates prefix queries
    #[serde(default)]
    pub prefix_precise: Option<String>,
    /// N-grams, accelerates regex queries
    #[serde(default)]
    pub ngram_field: Option<String>,
    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,
}

impl FieldDefinition {
    pub fn new(standard: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            precise: None,
            reverse_precise: None,
            prefix_precise: None,
            ngram_field: None,
            ngram_size: default_ngram_size(),
        }
    }

    pub fn with_precise(mut self, field: impl Into<String>) -> Self {
        self.precise = Some(field.into());
        self
    }

    pub fn with_reverse_precise(mut self, field: impl Into<String>) -> Self {
        self.reverse_precise = Some(field.into());
        self
    }

    pub fn with_prefix_precise(mut self, field: impl Into<String>) -> Self {
        self.prefix_precise = Some(field.into());
        self
    }

    pub fn with_ngram(mut self, field: impl Into<String>, size: usize) -> Self {
        self.ngram_field = Some(field.into());
        self.ngram_size = size;
        self
    }
}

/// Check that a name can be written as a field in query text
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@'))
}

/// A field name and boost as written by the user, before resolution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldReference {
    pub name: String,
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl FieldReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            boost: 1.0,
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boost == 1.0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}^{}", self.name, self.boost)
        }
    }
}

impl FromStr for FieldReference {
    type Err = QueryError;

    /// Parse `name` or `name^boost`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, boost) = match s.split_once('^') {
            Some((name, boost)) => {
                let boost: f32 = boost.trim().parse().map_err(|_| {
                    QueryError::InvalidConfig(format!("bad boost in field reference '{}'", s))
                })?;
                (name.trim(), boost)
            }
            None => (s, 1.0),
        };
        if !is_valid_field_name(name) {
            return Err(QueryError::InvalidConfig(format!("bad field name '{}'", name)));
        }
        Ok(FieldReference::new(name).with_boost(boost))
    }
}

/// Parse a comma separated field list such as `"title^2, text"`
pub fn parse_fields(list: &str) -> crate::Result<Vec<FieldReference>> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(FieldReference::from_str)
        .collect()
}

/// Resolved sub-fields and analyzers of one field, shared by all usages
#[derive(Debug)]
pub struct CanonicalField {
    /// Name the field was resolved under
    pub name: String,
    pub standard: String,
    pub precise: String,
    pub reverse_precise: Option<String>,
    pub prefix_precise: Option<String>,
    pub ngram: Option<(String, usize)>,
    pub standard_analyzer: Arc<dyn TextAnalyzer>,
    pub precise_analyzer: Arc<dyn TextAnalyzer>,
    /// Whether field presence can be looked up directly
    pub field_names_indexed: bool,
}

/// A query-ready field: canonical sub-fields plus a composed boost
#[derive(Clone, Debug)]
pub struct FieldUsage {
    field: Arc<CanonicalField>,
    boost: f32,
}

impl FieldUsage {
    pub fn new(field: Arc<CanonicalField>) -> Self {
        Self { field, boost: 1.0 }
    }

    /// Same field with its boost multiplied by `factor`
    pub fn boosted(&self, factor: f32) -> Self {
        Self {
            field: self.field.clone(),
            boost: self.boost * factor,
        }
    }

    pub fn canonical(&self) -> &Arc<CanonicalField> {
        &self.field
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn standard(&self) -> &str {
        &self.field.standard
    }

    pub fn precise(&self) -> &str {
        &self.field.precise
    }

    pub fn reverse_precise(&self) -> Option<&str> {
        self.field.reverse_precise.as_deref()
    }

    pub fn prefix_precise(&self) -> Option<&str> {
        self.field.prefix_precise.as_deref()
    }

    pub fn ngram(&self) -> Option<(&str, usize)> {
        self.field
            .ngram
            .as_ref()
            .map(|(field, size)| (field.as_str(), *size))
    }

    pub fn standard_analyzer(&self) -> &dyn TextAnalyzer {
        self.field.standard_analyzer.as_ref()
    }

    pub fn precise_analyzer(&self) -> &dyn TextAnalyzer {
        self.field.precise_analyzer.as_ref()
    }

    pub fn field_names_indexed(&self) -> bool {
        self.field.field_names_indexed
    }
}
