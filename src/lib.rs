pub mod config;
pub mod error;
pub mod fields;
pub mod query;
pub mod tokenizer;

pub use config::{AuthorizationConfig, CompilerSettings, FieldQuerySettings, Language, TokenizerConfig};
pub use error::{QueryError, Result};
pub use fields::{
    FieldCatalog, FieldDefinition, FieldReference, FieldResolver, FieldUsage, NeverFinds, StaticCatalog,
    UnauthorizedAction,
};
pub use query::{DefaultOperator, Occur, QueryCompiler, QueryNode};
pub use tokenizer::{KeywordAnalyzer, StandardAnalyzer, TextAnalyzer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
