//! Term-position assembler
//!
//! Converts an ordered list of items (literal text to analyze, or special
//! pre-built queries from wildcard, prefix or fuzzy syntax) into the smallest
//! query that can express them:
//!
//! ```text
//! None -> Phrase -> MultiPhrase -> Span
//! ```
//!
//! The shape only ever escalates. Escalation converts what was accumulated
//! so far, so no term is lost:
//! - several tokens at one position (synonyms) turn a phrase into a
//!   multi-phrase
//! - a special item turns anything into a span proximity query, because only
//!   spans accept multi-term clauses
//!
//! At the end, a lone term is returned as a term query and a lone position
//! with several alternatives as a flat OR, rather than a one-position phrase.

use tracing::{debug, trace};

use crate::query::ast::QueryNode;
use crate::query::nodes::{
    alternatives_to_span, BooleanQuery, MultiPhraseQuery, PhraseQuery, SpanNearQuery, SpanQuery,
};
use crate::tokenizer::{StreamGuard, TextAnalyzer};
use crate::Result;

/// One input to the assembler
#[derive(Clone, Debug, PartialEq)]
pub enum AssemblyItem {
    /// Text run through the field's analyzer
    Literal(String),
    /// Query built elsewhere that takes one position
    Special(QueryNode),
}

/// Accumulated query shape
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    None,
    Phrase(Vec<String>),
    MultiPhrase(Vec<Vec<String>>),
    Span(Vec<SpanQuery>),
}

impl Shape {
    /// Escalation order
    pub fn rank(&self) -> u8 {
        match self {
            Shape::None => 0,
            Shape::Phrase(_) => 1,
            Shape::MultiPhrase(_) => 2,
            Shape::Span(_) => 3,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Shape::None => "none",
            Shape::Phrase(_) => "phrase",
            Shape::MultiPhrase(_) => "multi_phrase",
            Shape::Span(_) => "span",
        }
    }
}

/// Every phrase term becomes a single-alternative position
pub fn phrase_to_multiphrase(terms: Vec<String>) -> Vec<Vec<String>> {
    terms.into_iter().map(|term| vec![term]).collect()
}

/// Span slots equivalent to the accumulated shape
///
/// Single-term positions become span terms and multi-term positions become
/// an OR of span terms. Span slots pass through unchanged.
pub fn phrase_or_multiphrase_to_span(shape: Shape, field: &str) -> Vec<SpanQuery> {
    match shape {
        Shape::None => Vec::new(),
        Shape::Phrase(terms) => terms
            .into_iter()
            .map(|term| SpanQuery::term(field, term))
            .collect(),
        Shape::MultiPhrase(positions) => positions
            .into_iter()
            .map(|alternatives| alternatives_to_span(field, alternatives))
            .collect(),
        Shape::Span(slots) => slots,
    }
}

/// Running state of one assembly
struct AssemblyState<'f> {
    field: &'f str,
    shape: Shape,
    /// Terms at the current, not yet flushed position
    pending: Vec<String>,
}

impl<'f> AssemblyState<'f> {
    fn new(field: &'f str) -> Self {
        Self {
            field,
            shape: Shape::None,
            pending: Vec::new(),
        }
    }

    fn set_shape(&mut self, shape: Shape) {
        debug_assert!(shape.rank() >= self.shape.rank());
        if shape.rank() != self.shape.rank() {
            trace!(field = self.field, from = self.shape.name(), to = shape.name(), "escalating");
        }
        self.shape = shape;
    }

    /// Move the pending position into the shape
    fn flush(&mut self) {
        let mut pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return;
        }

        let shape = std::mem::replace(&mut self.shape, Shape::None);
        let next = match shape {
            Shape::None if pending.len() == 1 => Shape::Phrase(pending),
            Shape::Phrase(mut terms) if pending.len() == 1 => {
                terms.append(&mut pending);
                Shape::Phrase(terms)
            }
            Shape::None => Shape::MultiPhrase(vec![pending]),
            Shape::Phrase(terms) => {
                let mut positions = phrase_to_multiphrase(terms);
                positions.push(pending);
                Shape::MultiPhrase(positions)
            }
            Shape::MultiPhrase(mut positions) => {
                positions.push(pending);
                Shape::MultiPhrase(positions)
            }
            Shape::Span(mut slots) => {
                slots.push(alternatives_to_span(self.field, pending));
                Shape::Span(slots)
            }
        };
        self.set_shape(next);
    }

    /// Append a special clause, escalating to span first
    fn push_span(&mut self, clause: SpanQuery) {
        self.flush();
        let shape = std::mem::replace(&mut self.shape, Shape::None);
        let mut slots = phrase_or_multiphrase_to_span(shape, self.field);
        slots.push(clause.masked_as(self.field));
        self.set_shape(Shape::Span(slots));
    }

    fn finish(mut self, slop: u32) -> Option<QueryNode> {
        // Several candidates and no positional context: plain OR
        if matches!(self.shape, Shape::None) && self.pending.len() > 1 {
            let terms = std::mem::take(&mut self.pending);
            return Some(any_term(self.field, terms));
        }

        self.flush();
        let field = self.field.to_string();
        match self.shape {
            Shape::None => None,
            Shape::Phrase(mut terms) if terms.len() == 1 => Some(QueryNode::term(field, terms.remove(0))),
            Shape::Phrase(terms) => Some(QueryNode::Phrase(PhraseQuery::new(field, terms).with_slop(slop))),
            Shape::MultiPhrase(mut positions) if positions.len() == 1 => {
                Some(any_term(&field, positions.remove(0)))
            }
            Shape::MultiPhrase(positions) => Some(QueryNode::MultiPhrase(
                MultiPhraseQuery::new(field, positions).with_slop(slop),
            )),
            Shape::Span(clauses) => Some(QueryNode::Span(SpanQuery::Near(SpanNearQuery {
                field,
                clauses,
                slop,
                in_order: true,
            }))),
        }
    }
}

/// Term query for one candidate, flat OR for several
fn any_term(field: &str, mut terms: Vec<String>) -> QueryNode {
    if terms.len() == 1 {
        return QueryNode::term(field, terms.remove(0));
    }
    BooleanQuery::any_of(terms.into_iter().map(|term| QueryNode::term(field, term))).into()
}

/// Builds term, phrase, multi-phrase and span queries for one physical field
pub struct TermPositionAssembler<'a> {
    field: &'a str,
    analyzer: &'a dyn TextAnalyzer,
    slop: u32,
    top_terms: usize,
}

impl<'a> TermPositionAssembler<'a> {
    /// `slop` is clamped to `max_slop`; `top_terms` bounds span rewrites
    /// of multi-term clauses
    pub fn new(
        field: &'a str,
        analyzer: &'a dyn TextAnalyzer,
        slop: u32,
        max_slop: u32,
        top_terms: usize,
    ) -> Self {
        Self {
            field,
            analyzer,
            slop: slop.min(max_slop),
            top_terms,
        }
    }

    /// Assemble the items, or `None` when nothing searchable remains
    pub fn assemble<I>(&self, items: I) -> Result<Option<QueryNode>>
    where
        I: IntoIterator<Item = AssemblyItem>,
    {
        let mut state = AssemblyState::new(self.field);

        for item in items {
            match item {
                AssemblyItem::Literal(text) => {
                    // Each literal starts a new position
                    state.flush();
                    let mut stream = StreamGuard::open(self.analyzer, self.field, &text)?;
                    while let Some(token) = stream.next_token()? {
                        if token.text.is_empty() {
                            continue;
                        }
                        if token.position_increment != 0 {
                            state.flush();
                        }
                        state.pending.push(token.text);
                    }
                    stream.finish()?;
                }
                AssemblyItem::Special(node) => {
                    let kind = node.query_type();
                    match SpanQuery::from_node(node, self.top_terms) {
                        Some(clause) => state.push_span(clause),
                        None => debug!(field = self.field, kind, "skipping clause with no span form"),
                    }
                }
            }
        }

        Ok(state.finish(self.slop))
    }

    /// Assemble a single literal
    pub fn assemble_text(&self, text: &str) -> Result<Option<QueryNode>> {
        self.assemble(std::iter::once(AssemblyItem::Literal(text.to_string())))
    }
}
