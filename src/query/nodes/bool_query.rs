//! Boolean query - combines clauses with MUST, SHOULD and MUST_NOT roles

use serde::{Deserialize, Serialize};

use crate::query::ast::QueryNode;
use crate::query::types::Occur;

/// One clause of a boolean query
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BooleanClause {
    pub query: QueryNode,
    pub occur: Occur,
}

/// Boolean query combining multiple clauses
///
/// Clause order is preserved exactly as built, which keeps compiled output
/// stable for a given query string.
///
/// # Example
///
/// ```rust
/// use fieldquery::query::nodes::{BooleanQuery, TermQuery};
/// use fieldquery::query::QueryNode;
///
/// let query = BooleanQuery::new()
///     .must(QueryNode::Term(TermQuery::new("text", "rust")))
///     .must_not(QueryNode::Term(TermQuery::new("text", "java")));
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanQuery {
    pub clauses: Vec<BooleanClause>,
    /// Minimum number of should clauses that must match (0 = unset)
    #[serde(default)]
    pub minimum_should_match: u32,
}

impl BooleanQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat OR over the given queries requiring one of them to match
    pub fn any_of(queries: impl IntoIterator<Item = QueryNode>) -> Self {
        queries
            .into_iter()
            .fold(Self::new(), BooleanQuery::should)
            .with_minimum_should_match(1)
    }

    /// Add a clause with the given role
    pub fn add(&mut self, query: QueryNode, occur: Occur) {
        self.clauses.push(BooleanClause { query, occur });
    }

    /// Add a must clause
    pub fn must(mut self, query: QueryNode) -> Self {
        self.add(query, Occur::Must);
        self
    }

    /// Add a should clause
    pub fn should(mut self, query: QueryNode) -> Self {
        self.add(query, Occur::Should);
        self
    }

    /// Add a must_not clause
    pub fn must_not(mut self, query: QueryNode) -> Self {
        self.add(query, Occur::MustNot);
        self
    }

    /// Set minimum should match
    pub fn with_minimum_should_match(mut self, minimum: u32) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether every clause is optional
    pub fn is_pure_disjunction(&self) -> bool {
        self.clauses.iter().all(|clause| clause.occur == Occur::Should)
    }
}
