//! Query construction for one resolved field

use tracing::debug;

use super::assembler::{AssemblyItem, TermPositionAssembler};
use super::phrase_item::PhraseItem;
use super::regex::RegexAccelerator;
use crate::config::FieldQuerySettings;
use crate::fields::FieldUsage;
use crate::query::ast::QueryNode;
use crate::query::nodes::{
    has_leading_wildcard, reverse_pattern, similarity_to_edits, FuzzyQuery, PrefixQuery,
    WildcardQuery,
};
use crate::Result;

/// Settings and collaborators shared by every builder of one compilation
#[derive(Clone, Copy, Debug)]
pub struct BuilderContext<'s> {
    pub settings: &'s FieldQuerySettings,
    pub regex: Option<&'s dyn RegexAccelerator>,
}

/// Builds queries against a single [`FieldUsage`]
///
/// Analyzed operations (`term`, `phrase`) go through the
/// [`TermPositionAssembler`]. Multi-term operations use the raw text
/// against the precise sub-field. The usage's boost is not applied here.
#[derive(Clone, Debug)]
pub struct FieldQueryBuilder<'s> {
    usage: FieldUsage,
    context: BuilderContext<'s>,
}

impl<'s> FieldQueryBuilder<'s> {
    pub fn new(usage: FieldUsage, context: BuilderContext<'s>) -> Self {
        Self { usage, context }
    }

    pub fn usage(&self) -> &FieldUsage {
        &self.usage
    }

    fn settings(&self) -> &FieldQuerySettings {
        self.context.settings
    }

    /// Analyze `text` against the standard field
    pub fn term(&self, text: &str) -> Result<Option<QueryNode>> {
        self.standard_assembler(0).assemble_text(text)
    }

    fn standard_assembler(&self, slop: u32) -> TermPositionAssembler<'_> {
        TermPositionAssembler::new(
            self.usage.standard(),
            self.usage.standard_analyzer(),
            slop,
            self.settings().max_phrase_slop,
            self.settings().fuzzy_max_expansions,
        )
    }

    fn precise_assembler(&self, slop: u32) -> TermPositionAssembler<'_> {
        TermPositionAssembler::new(
            self.usage.precise(),
            self.usage.precise_analyzer(),
            slop,
            self.settings().max_phrase_slop,
            self.settings().fuzzy_max_expansions,
        )
    }

    /// Assemble a phrase
    ///
    /// Quoted phrases use the precise sub-field. `slop` of `None` uses the
    /// configured default.
    pub fn phrase(
        &self,
        items: &[PhraseItem],
        slop: Option<u32>,
        use_quoted_field: bool,
    ) -> Result<Option<QueryNode>> {
        let slop = slop.unwrap_or(self.settings().default_phrase_slop);
        let mut assembly = Vec::with_capacity(items.len());
        for item in items {
            let next = match item {
                PhraseItem::Literal { text } => Some(AssemblyItem::Literal(text.clone())),
                PhraseItem::Prefix { text } => self.prefix(text)?.map(AssemblyItem::Special),
                PhraseItem::Wildcard { pattern } => self.wildcard(pattern)?.map(AssemblyItem::Special),
                PhraseItem::Fuzzy { text, similarity } => {
                    self.fuzzy(text, *similarity)?.map(AssemblyItem::Special)
                }
            };
            assembly.extend(next);
        }

        let assembler = if use_quoted_field {
            self.precise_assembler(slop)
        } else {
            self.standard_assembler(slop)
        };
        assembler.assemble(assembly)
    }

    /// Fuzzy match; zero allowed edits degrades to a term
    pub fn fuzzy(&self, text: &str, similarity: Option<f32>) -> Result<Option<QueryNode>> {
        let edits = similarity_to_edits(similarity, text.chars().count());
        if edits == 0 {
            return self.term(text);
        }
        Ok(Some(QueryNode::Fuzzy(
            FuzzyQuery::new(self.usage.precise(), text)
                .with_edits(edits)
                .with_prefix_length(self.settings().fuzzy_prefix_length)
                .with_max_expansions(self.settings().fuzzy_max_expansions),
        )))
    }

    /// Prefix match on the text before a trailing `*`
    pub fn prefix(&self, text: &str) -> Result<Option<QueryNode>> {
        if let Some(field) = self.usage.prefix_precise() {
            return Ok(Some(QueryNode::term(field, text)));
        }
        if !self.settings().allow_prefix {
            debug!(field = self.usage.name(), text, "prefix queries disabled, searching literally");
            return Ok(Some(QueryNode::term(self.usage.precise(), format!("{}*", text))));
        }
        Ok(Some(QueryNode::Prefix(PrefixQuery::new(self.usage.precise(), text))))
    }

    /// Wildcard match, reversed onto the reverse sub-field when that removes
    /// a leading wildcard
    pub fn wildcard(&self, pattern: &str) -> Result<Option<QueryNode>> {
        let (field, effective) = match self.usage.reverse_precise() {
            Some(reverse) if has_leading_wildcard(pattern) => (reverse, reverse_pattern(pattern)),
            _ => (self.usage.precise(), pattern.to_string()),
        };

        if has_leading_wildcard(&effective) && !self.settings().allow_leading_wildcard {
            debug!(field = self.usage.name(), pattern, "leading wildcard disabled, searching literally");
            return self.term(pattern);
        }
        Ok(Some(QueryNode::Wildcard(WildcardQuery::new(field, effective))))
    }

    /// Regex match through the configured accelerator
    pub fn regex(&self, pattern: &str) -> Result<Option<QueryNode>> {
        if let Some(accelerator) = self.context.regex {
            if let Some(node) = accelerator.regex_query(&self.usage, pattern)? {
                return Ok(Some(node));
            }
        }
        debug!(field = self.usage.name(), pattern, "no regex support, searching literally");
        Ok(Some(QueryNode::term(self.usage.precise(), format!("/{}/", pattern))))
    }

    /// Documents with any value in the field
    pub fn field_exists(&self) -> Result<Option<QueryNode>> {
        if self.usage.field_names_indexed() {
            return Ok(Some(QueryNode::FieldExists {
                field: self.usage.standard().to_string(),
            }));
        }
        Ok(Some(QueryNode::Prefix(PrefixQuery::new(self.usage.standard(), ""))))
    }
}
