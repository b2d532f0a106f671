//! Query string compiler
//!
//! Ties the parser, field resolution and the query builders together.
//! A compiler is immutable and can be shared between threads; every call to
//! [`QueryCompiler::compile`] builds its own request scoped
//! [`FieldResolver`], so whitelisting done while compiling one query never
//! leaks into the next.

use std::sync::Arc;

use tracing::{debug, trace};

use super::ast::QueryNode;
use super::builder::{BuilderContext, FieldsQueryBuilder, RegexAccelerator};
use super::nodes::BooleanQuery;
use super::query_string::{ParseNode, QueryStringParser};
use super::types::Occur;
use super::visitor::QueryVisitor;
use crate::config::CompilerSettings;
use crate::fields::{parse_fields, FieldCatalog, FieldReference, FieldResolver, UnauthorizedAction};
use crate::Result;

/// Compiles query strings into [`QueryNode`] trees
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fieldquery::{CompilerSettings, QueryCompiler, QueryNode, StaticCatalog};
///
/// let compiler = QueryCompiler::new(CompilerSettings::new("title"), Arc::new(StaticCatalog::default())).unwrap();
/// assert_eq!(compiler.compile("cats").unwrap(), QueryNode::term("title", "cat"));
/// ```
#[derive(Debug)]
pub struct QueryCompiler {
    settings: CompilerSettings,
    default_fields: Vec<FieldReference>,
    catalog: Arc<dyn FieldCatalog>,
    regex: Option<Arc<dyn RegexAccelerator>>,
}

impl QueryCompiler {
    /// Create a compiler, rejecting settings that could never compile
    pub fn new(settings: CompilerSettings, catalog: Arc<dyn FieldCatalog>) -> Result<Self> {
        settings.validate()?;
        let default_fields = parse_fields(&settings.fields)?;
        // Surface alias and definition problems now rather than per query
        FieldResolver::from_config(catalog.clone(), &settings.authorization)?;

        Ok(Self {
            settings,
            default_fields,
            catalog,
            regex: None,
        })
    }

    /// Enable regex queries through `accelerator`
    ///
    /// Without one, `/pattern/` is searched as literal text.
    pub fn with_regex_accelerator(mut self, accelerator: Arc<dyn RegexAccelerator>) -> Self {
        self.regex = Some(accelerator);
        self
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Parse without compiling
    pub fn parse(&self, text: &str) -> ParseNode {
        QueryStringParser::new(text).parse()
    }

    /// Compile a query string
    ///
    /// Malformed query text never fails; only analyzer and catalog faults
    /// surface as errors.
    pub fn compile(&self, text: &str) -> Result<QueryNode> {
        let tree = self.parse(text);
        trace!(query = text, tree = ?tree, "parsed query string");

        let mut resolver = FieldResolver::from_config(self.catalog.clone(), &self.settings.authorization)?;
        let action = if self.settings.whitelist_defaults {
            UnauthorizedAction::Whitelist
        } else {
            UnauthorizedAction::Keep
        };
        let mut usages = Vec::with_capacity(self.default_fields.len());
        for field in &self.default_fields {
            usages.extend(resolver.resolve(field, action)?);
        }

        let context = BuilderContext {
            settings: &self.settings.field_query,
            regex: self.regex.as_deref(),
        };
        let default_scope = FieldsQueryBuilder::for_usages(usages, context);
        let visited = QueryVisitor::new(
            &mut resolver,
            context,
            self.settings.default_operator,
            default_scope,
        )
        .visit(&tree)?;

        let query = match visited {
            None if self.settings.empty_is_match_all => QueryNode::MatchAll,
            None => QueryNode::MatchNone,
            Some(clause) if clause.occur == Some(Occur::MustNot) => {
                BooleanQuery::new().must_not(clause.query).into()
            }
            Some(clause) => clause.query,
        };
        debug!(query = text, compiled = query.query_type(), "compiled query string");
        Ok(query)
    }
}
