//! Field resolution
//!
//! Maps user-facing field names onto authorized, analyzer-aware physical
//! fields. See [`FieldResolver`] for the resolution rules.

pub mod catalog;
pub mod definition;
pub mod resolver;

pub use catalog::{
    AnalyzerConfig, CatalogConfig, FieldCatalog, MappedField, MappedFieldConfig, NeverFinds,
    StaticCatalog,
};
pub use definition::{
    is_valid_field_name, parse_fields, CanonicalField, FieldDefinition, FieldReference, FieldUsage,
};
pub use resolver::{FieldResolver, UnauthorizedAction};
