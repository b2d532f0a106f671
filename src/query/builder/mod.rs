//! Query builders
//!
//! - [`TermPositionAssembler`] - analyzed text to term/phrase/span shapes
//! - [`FieldQueryBuilder`] - every query operation against one field
//! - [`FieldsQueryBuilder`] - fans an operation out over resolved fields,
//!   applying field boosts and OR-ing the results

pub mod assembler;
pub mod field;
pub mod phrase_item;
pub mod regex;

pub use assembler::{AssemblyItem, Shape, TermPositionAssembler};
pub use field::{BuilderContext, FieldQueryBuilder};
pub use phrase_item::PhraseItem;
pub use regex::{NgramRegexAccelerator, RegexAccelerator};

use crate::fields::FieldUsage;
use crate::query::ast::QueryNode;
use crate::query::nodes::BooleanQuery;
use crate::Result;

/// A query operation, independent of the fields it runs against
#[derive(Clone, Copy, Debug)]
pub enum FieldOperation<'a> {
    Term(&'a str),
    Phrase {
        items: &'a [PhraseItem],
        slop: Option<u32>,
        use_quoted_field: bool,
    },
    Fuzzy {
        text: &'a str,
        similarity: Option<f32>,
    },
    Prefix(&'a str),
    Wildcard(&'a str),
    Regex(&'a str),
    FieldExists,
}

impl FieldQueryBuilder<'_> {
    /// Run `operation` against this field
    pub fn build(&self, operation: FieldOperation<'_>) -> Result<Option<QueryNode>> {
        match operation {
            FieldOperation::Term(text) => self.term(text),
            FieldOperation::Phrase {
                items,
                slop,
                use_quoted_field,
            } => self.phrase(items, slop, use_quoted_field),
            FieldOperation::Fuzzy { text, similarity } => self.fuzzy(text, similarity),
            FieldOperation::Prefix(text) => self.prefix(text),
            FieldOperation::Wildcard(pattern) => self.wildcard(pattern),
            FieldOperation::Regex(pattern) => self.regex(pattern),
            FieldOperation::FieldExists => self.field_exists(),
        }
    }
}

/// Builder for a set of resolved fields
#[derive(Clone, Debug)]
pub enum FieldsQueryBuilder<'s> {
    /// One field searched as is
    Single(FieldQueryBuilder<'s>),
    /// One field whose queries are boosted
    Boosting {
        inner: FieldQueryBuilder<'s>,
        boost: f32,
    },
    /// Any of several fields
    Multi(Vec<FieldsQueryBuilder<'s>>),
}

impl<'s> FieldsQueryBuilder<'s> {
    /// Pick the simplest builder covering `usages`
    ///
    /// Returns `None` when there is nothing to search.
    pub fn for_usages(usages: Vec<FieldUsage>, context: BuilderContext<'s>) -> Option<Self> {
        let mut builders: Vec<Self> = usages
            .into_iter()
            .map(|usage| Self::for_usage(usage, context))
            .collect();
        match builders.len() {
            0 => None,
            1 => builders.pop(),
            _ => Some(FieldsQueryBuilder::Multi(builders)),
        }
    }

    fn for_usage(usage: FieldUsage, context: BuilderContext<'s>) -> Self {
        let boost = usage.boost();
        let inner = FieldQueryBuilder::new(usage, context);
        if boost == 1.0 {
            FieldsQueryBuilder::Single(inner)
        } else {
            FieldsQueryBuilder::Boosting { inner, boost }
        }
    }

    /// Run `operation` against every field
    pub fn build(&self, operation: FieldOperation<'_>) -> Result<Option<QueryNode>> {
        match self {
            FieldsQueryBuilder::Single(builder) => builder.build(operation),
            FieldsQueryBuilder::Boosting { inner, boost } => {
                Ok(inner.build(operation)?.map(|node| node.boosted(*boost)))
            }
            FieldsQueryBuilder::Multi(builders) => {
                let mut nodes = Vec::with_capacity(builders.len());
                for builder in builders {
                    nodes.extend(builder.build(operation)?);
                }
                Ok(match nodes.len() {
                    0 => None,
                    1 => nodes.pop(),
                    _ => Some(BooleanQuery::any_of(nodes).into()),
                })
            }
        }
    }

    pub fn term(&self, text: &str) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Term(text))
    }

    pub fn phrase(
        &self,
        items: &[PhraseItem],
        slop: Option<u32>,
        use_quoted_field: bool,
    ) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Phrase {
            items,
            slop,
            use_quoted_field,
        })
    }

    pub fn fuzzy(&self, text: &str, similarity: Option<f32>) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Fuzzy { text, similarity })
    }

    pub fn prefix(&self, text: &str) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Prefix(text))
    }

    pub fn wildcard(&self, pattern: &str) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Wildcard(pattern))
    }

    pub fn regex(&self, pattern: &str) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::Regex(pattern))
    }

    pub fn field_exists(&self) -> Result<Option<QueryNode>> {
        self.build(FieldOperation::FieldExists)
    }
}
