//! Lookup of physical fields and their analyzers
//!
//! The resolution engine asks a [`FieldCatalog`] which physical fields exist.
//! [`NeverFinds`] maps nothing, so every field falls back to the default
//! analyzers. [`StaticCatalog`] holds an in-memory mapping, usually built from
//! a JSON [`CatalogConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use crate::config::TokenizerConfig;
use crate::tokenizer::{KeywordAnalyzer, StandardAnalyzer, SynonymAnalyzer, TextAnalyzer};
use crate::Result;

/// A physical field known to the catalog
#[derive(Clone, Debug)]
pub struct MappedField {
    /// Name of the field in the index
    pub index_name: String,
    pub analyzer: Arc<dyn TextAnalyzer>,
}

/// Source of physical field mappings
pub trait FieldCatalog: Send + Sync + Debug {
    /// Look up a physical field by name
    fn lookup(&self, field: &str) -> Result<Option<MappedField>>;

    /// Analyzer for unmapped standard fields
    fn default_standard_analyzer(&self) -> Arc<dyn TextAnalyzer>;

    /// Analyzer for unmapped precise fields
    fn default_precise_analyzer(&self) -> Arc<dyn TextAnalyzer>;

    /// Whether the index keeps a per-document list of present field names
    fn has_field_names_index(&self) -> bool {
        false
    }
}

/// Analyzer settings for a mapped field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalyzerConfig {
    Standard(TokenizerConfig),
    Keyword,
}

impl AnalyzerConfig {
    pub fn build(&self) -> Arc<dyn TextAnalyzer> {
        match self {
            AnalyzerConfig::Standard(config) => Arc::new(StandardAnalyzer::new(config)),
            AnalyzerConfig::Keyword => Arc::new(KeywordAnalyzer),
        }
    }
}

fn default_standard_config() -> AnalyzerConfig {
    AnalyzerConfig::Standard(TokenizerConfig::default())
}

fn default_precise_config() -> AnalyzerConfig {
    AnalyzerConfig::Standard(TokenizerConfig::precise())
}

/// Mapping entry of a [`CatalogConfig`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MappedFieldConfig {
    /// Index name when it differs from the mapping key
    #[serde(default)]
    pub index_name: Option<String>,
    #[serde(default = "default_standard_config")]
    pub analyzer: AnalyzerConfig,
    /// Term to the synonyms emitted alongside it
    #[serde(default)]
    pub synonyms: HashMap<String, Vec<String>>,
}

/// Serializable description of a [`StaticCatalog`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_standard_config")]
    pub default_standard: AnalyzerConfig,
    #[serde(default = "default_precise_config")]
    pub default_precise: AnalyzerConfig,
    #[serde(default)]
    pub field_names_index: bool,
    #[serde(default)]
    pub fields: HashMap<String, MappedFieldConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_standard: default_standard_config(),
            default_precise: default_precise_config(),
            field_names_index: false,
            fields: HashMap::new(),
        }
    }
}

impl CatalogConfig {
    /// Load a catalog description from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Catalog that maps no fields at all
#[derive(Debug)]
pub struct NeverFinds {
    standard: Arc<dyn TextAnalyzer>,
    precise: Arc<dyn TextAnalyzer>,
}

impl NeverFinds {
    pub fn new(standard: Arc<dyn TextAnalyzer>, precise: Arc<dyn TextAnalyzer>) -> Self {
        Self { standard, precise }
    }
}

impl Default for NeverFinds {
    fn default() -> Self {
        Self::new(
            default_standard_config().build(),
            default_precise_config().build(),
        )
    }
}

impl FieldCatalog for NeverFinds {
    fn lookup(&self, _field: &str) -> Result<Option<MappedField>> {
        Ok(None)
    }

    fn default_standard_analyzer(&self) -> Arc<dyn TextAnalyzer> {
        self.standard.clone()
    }

    fn default_precise_analyzer(&self) -> Arc<dyn TextAnalyzer> {
        self.precise.clone()
    }
}

/// In-memory field mapping
#[derive(Debug)]
pub struct StaticCatalog {
    fields: HashMap<String, MappedField>,
    standard: Arc<dyn TextAnalyzer>,
    precise: Arc<dyn TextAnalyzer>,
    field_names_index: bool,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(
            default_standard_config().build(),
            default_precise_config().build(),
        )
    }
}

impl StaticCatalog {
    /// Create an empty catalog with the given fallback analyzers
    pub fn new(standard: Arc<dyn TextAnalyzer>, precise: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            fields: HashMap::new(),
            standard,
            precise,
            field_names_index: false,
        }
    }

    /// Build a catalog from its serializable description
    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut catalog = Self::new(config.default_standard.build(), config.default_precise.build())
            .with_field_names_index(config.field_names_index);

        for (name, field) in &config.fields {
            let mut analyzer = field.analyzer.build();
            if !field.synonyms.is_empty() {
                let mut synonyms = SynonymAnalyzer::new(analyzer);
                for (term, expansions) in &field.synonyms {
                    for expansion in expansions {
                        synonyms = synonyms.with_synonym(term.clone(), expansion.clone());
                    }
                }
                analyzer = Arc::new(synonyms);
            }
            let index_name = field.index_name.clone().unwrap_or_else(|| name.clone());
            catalog = catalog.with_mapped_field(name.clone(), index_name, analyzer);
        }

        catalog
    }

    /// Map a field whose index name equals its name
    pub fn with_field(self, name: impl Into<String>, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        let name = name.into();
        self.with_mapped_field(name.clone(), name, analyzer)
    }

    pub fn with_mapped_field(
        mut self,
        name: impl Into<String>,
        index_name: impl Into<String>,
        analyzer: Arc<dyn TextAnalyzer>,
    ) -> Self {
        self.fields.insert(
            name.into(),
            MappedField {
                index_name: index_name.into(),
                analyzer,
            },
        );
        self
    }

    pub fn with_field_names_index(mut self, enabled: bool) -> Self {
        self.field_names_index = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldCatalog for StaticCatalog {
    fn lookup(&self, field: &str) -> Result<Option<MappedField>> {
        Ok(self.fields.get(field).cloned())
    }

    fn default_standard_analyzer(&self) -> Arc<dyn TextAnalyzer> {
        self.standard.clone()
    }

    fn default_precise_analyzer(&self) -> Arc<dyn TextAnalyzer> {
        self.precise.clone()
    }

    fn has_field_names_index(&self) -> bool {
        self.field_names_index
    }
}
