//! Parse tree to query tree
//!
//! [`QueryVisitor`] walks a [`ParseNode`] tree and drives field resolution
//! and the field query builders for every clause. Each visit yields a
//! [`VisitedClause`] whose occurrence is `None` when the clause carried no
//! `+`, `-` or `NOT` and should take the default of the enclosing boolean.

use tracing::{debug, trace};

use crate::fields::{FieldReference, FieldResolver, UnauthorizedAction};
use crate::query::ast::QueryNode;
use crate::query::builder::{BuilderContext, FieldsQueryBuilder};
use crate::query::nodes::BooleanQuery;
use crate::query::query_string::ParseNode;
use crate::query::types::{DefaultOperator, Occur};
use crate::Result;

/// A compiled clause and its explicit occurrence, if any
#[derive(Clone, Debug, PartialEq)]
pub struct VisitedClause {
    pub query: QueryNode,
    pub occur: Option<Occur>,
}

impl VisitedClause {
    fn inherit(query: QueryNode) -> Self {
        Self { query, occur: None }
    }

    fn with_occur(self, occur: Occur) -> Self {
        Self {
            query: self.query,
            occur: Some(occur),
        }
    }

    fn boosted(self, factor: f32) -> Self {
        Self {
            query: self.query.boosted(factor),
            occur: self.occur,
        }
    }
}

/// Walks a parse tree, keeping a stack of field scopes
///
/// The bottom scope searches the default fields. A fielded clause pushes
/// its resolved fields for the duration of its inner clause.
pub struct QueryVisitor<'r, 's> {
    resolver: &'r mut FieldResolver,
    context: BuilderContext<'s>,
    default_operator: DefaultOperator,
    scopes: Vec<FieldsQueryBuilder<'s>>,
}

impl<'r, 's> QueryVisitor<'r, 's> {
    /// Create a visitor searching `default_scope` for unfielded clauses
    ///
    /// Without a default scope unfielded clauses contribute nothing.
    pub fn new(
        resolver: &'r mut FieldResolver,
        context: BuilderContext<'s>,
        default_operator: DefaultOperator,
        default_scope: Option<FieldsQueryBuilder<'s>>,
    ) -> Self {
        Self {
            resolver,
            context,
            default_operator,
            scopes: default_scope.into_iter().collect(),
        }
    }

    /// Compile one parse node; `None` means it contributes nothing
    pub fn visit(&mut self, node: &ParseNode) -> Result<Option<VisitedClause>> {
        match node {
            ParseNode::Unmarked { clauses } => {
                let occur = self.default_operator.occur();
                self.combine(clauses, occur)
            }
            ParseNode::Or { clauses } => self.combine(clauses, Occur::Should),
            ParseNode::And { clauses } => self.combine(clauses, Occur::Must),
            ParseNode::Must { clause } => {
                Ok(self.visit(clause)?.map(|visited| visited.with_occur(Occur::Must)))
            }
            ParseNode::MustNot { clause } => {
                Ok(self.visit(clause)?.map(|visited| visited.with_occur(Occur::MustNot)))
            }
            ParseNode::Fielded {
                fields,
                clause,
                raw,
            } => self.visit_fielded(fields, clause, raw),
            ParseNode::Boosted { clause, boost, raw } => match boost {
                Some(boost) if *boost > 0.0 => {
                    Ok(self.visit(clause)?.map(|visited| visited.boosted(*boost)))
                }
                _ => {
                    debug!(raw = %raw, "boost is not a positive number, searching literally");
                    self.leaf(|scope| scope.term(raw))
                }
            },
            ParseNode::Phrase {
                items,
                slop,
                use_quoted_field,
            } => self.leaf(|scope| scope.phrase(items, *slop, *use_quoted_field)),
            ParseNode::Term { text } => self.leaf(|scope| scope.term(text)),
            ParseNode::Fuzzy { text, similarity } => self.leaf(|scope| scope.fuzzy(text, *similarity)),
            ParseNode::Prefix { text } => self.leaf(|scope| scope.prefix(text)),
            ParseNode::Wildcard { pattern } => self.leaf(|scope| scope.wildcard(pattern)),
            ParseNode::Regex { pattern } => self.leaf(|scope| scope.regex(pattern)),
            ParseNode::FieldExists => self.leaf(|scope| scope.field_exists()),
        }
    }

    /// Join clauses into a boolean, giving unmarked clauses `default`
    fn combine(&mut self, clauses: &[ParseNode], default: Occur) -> Result<Option<VisitedClause>> {
        if let [only] = clauses {
            return self.visit(only);
        }

        let mut visited = Vec::with_capacity(clauses.len());
        for clause in clauses {
            visited.extend(self.visit(clause)?);
        }
        if visited.len() <= 1 {
            return Ok(visited.pop());
        }

        let mut query = BooleanQuery::new();
        for clause in visited {
            query.add(clause.query, clause.occur.unwrap_or(default));
        }
        if default == Occur::Should {
            query = query.with_minimum_should_match(1);
        }
        Ok(Some(VisitedClause::inherit(query.into())))
    }

    fn visit_fielded(
        &mut self,
        fields: &[FieldReference],
        clause: &ParseNode,
        raw: &str,
    ) -> Result<Option<VisitedClause>> {
        let mut usages = Vec::new();
        for field in fields {
            if !(field.boost.is_finite() && field.boost > 0.0) {
                debug!(field = %field, "field boost is not a positive number, searching literally");
                return self.literal_in_default_scope(raw);
            }
            usages.extend(self.resolver.resolve(field, UnauthorizedAction::Remove)?);
        }

        let scope = match FieldsQueryBuilder::for_usages(usages, self.context) {
            Some(scope) => scope,
            None => {
                debug!(raw = %raw, "no searchable fields, searching literally");
                return self.literal_in_default_scope(raw);
            }
        };

        trace!(raw = %raw, "entering field scope");
        self.scopes.push(scope);
        let result = self.visit(clause);
        self.scopes.pop();
        result
    }

    fn literal_in_default_scope(&self, raw: &str) -> Result<Option<VisitedClause>> {
        match self.scopes.first() {
            Some(scope) => Ok(scope.term(raw)?.map(VisitedClause::inherit)),
            None => Ok(None),
        }
    }

    fn leaf(
        &self,
        build: impl FnOnce(&FieldsQueryBuilder<'s>) -> Result<Option<QueryNode>>,
    ) -> Result<Option<VisitedClause>> {
        match self.scopes.last() {
            Some(scope) => Ok(build(scope)?.map(VisitedClause::inherit)),
            None => Ok(None),
        }
    }
}
