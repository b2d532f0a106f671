use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{QueryError, Result};
use crate::fields::FieldDefinition;
use crate::query::types::DefaultOperator;

/// Language driving stemming and stopword removal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Arabic,
    Danish,
    Dutch,
    #[default]
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Turkish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::Danish => "danish",
            Language::Dutch => "dutch",
            Language::English => "english",
            Language::Finnish => "finnish",
            Language::French => "french",
            Language::German => "german",
            Language::Greek => "greek",
            Language::Hungarian => "hungarian",
            Language::Italian => "italian",
            Language::Norwegian => "norwegian",
            Language::Portuguese => "portuguese",
            Language::Romanian => "romanian",
            Language::Russian => "russian",
            Language::Spanish => "spanish",
            Language::Swedish => "swedish",
            Language::Turkish => "turkish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = QueryError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "arabic" => Ok(Language::Arabic),
            "danish" => Ok(Language::Danish),
            "dutch" => Ok(Language::Dutch),
            "english" => Ok(Language::English),
            "finnish" => Ok(Language::Finnish),
            "french" => Ok(Language::French),
            "german" => Ok(Language::German),
            "greek" => Ok(Language::Greek),
            "hungarian" => Ok(Language::Hungarian),
            "italian" => Ok(Language::Italian),
            "norwegian" => Ok(Language::Norwegian),
            "portuguese" => Ok(Language::Portuguese),
            "romanian" => Ok(Language::Romanian),
            "russian" => Ok(Language::Russian),
            "spanish" => Ok(Language::Spanish),
            "swedish" => Ok(Language::Swedish),
            "turkish" => Ok(Language::Turkish),
            other => Err(QueryError::InvalidConfig(format!(
                "unsupported analyzer language: {}",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = QueryError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.as_str().to_string()
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: Language,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: true,
            stem: true,
            min_token_length: 1,
            max_token_length: 255,
            language: Language::English,
        }
    }
}

impl TokenizerConfig {
    /// Lowercasing only: no stopwords, no stemming
    pub fn precise() -> Self {
        Self {
            remove_stopwords: false,
            stem: false,
            ..Self::default()
        }
    }
}

/// Knobs shared by every single-field query builder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldQuerySettings {
    /// Upper bound applied to every phrase and span slop
    pub max_phrase_slop: u32,
    /// Slop used for phrases written without `~N`
    pub default_phrase_slop: u32,
    /// Leading characters a fuzzy match must share exactly
    pub fuzzy_prefix_length: usize,
    /// Maximum terms a fuzzy query or span rewrite may expand to
    pub fuzzy_max_expansions: usize,
    pub allow_leading_wildcard: bool,
    pub allow_prefix: bool,
}

impl Default for FieldQuerySettings {
    fn default() -> Self {
        Self {
            max_phrase_slop: 20,
            default_phrase_slop: 0,
            fuzzy_prefix_length: 0,
            fuzzy_max_expansions: 50,
            allow_leading_wildcard: false,
            allow_prefix: true,
        }
    }
}

impl FieldQuerySettings {
    pub fn with_max_phrase_slop(mut self, max_phrase_slop: u32) -> Self {
        self.max_phrase_slop = max_phrase_slop;
        self
    }

    pub fn with_default_phrase_slop(mut self, default_phrase_slop: u32) -> Self {
        self.default_phrase_slop = default_phrase_slop;
        self
    }

    pub fn with_fuzzy_prefix_length(mut self, fuzzy_prefix_length: usize) -> Self {
        self.fuzzy_prefix_length = fuzzy_prefix_length;
        self
    }

    pub fn with_fuzzy_max_expansions(mut self, fuzzy_max_expansions: usize) -> Self {
        self.fuzzy_max_expansions = fuzzy_max_expansions;
        self
    }

    pub fn with_allow_leading_wildcard(mut self, allow: bool) -> Self {
        self.allow_leading_wildcard = allow;
        self
    }

    pub fn with_allow_prefix(mut self, allow: bool) -> Self {
        self.allow_prefix = allow;
        self
    }
}

/// Which fields a query may reference and how user-facing names map onto them
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Allow every field that is not blacklisted
    pub whitelist_all: bool,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    /// Alias name to a field list such as `"title^2, category"`
    pub aliases: HashMap<String, String>,
    /// Explicit physical mappings that override sub-field detection
    pub definitions: HashMap<String, FieldDefinition>,
}

impl AuthorizationConfig {
    pub fn with_whitelist_all(mut self) -> Self {
        self.whitelist_all = true;
        self
    }

    pub fn whitelist(mut self, field: impl Into<String>) -> Self {
        self.whitelist.push(field.into());
        self
    }

    pub fn blacklist(mut self, field: impl Into<String>) -> Self {
        self.blacklist.push(field.into());
        self
    }

    pub fn alias(mut self, name: impl Into<String>, fields: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), fields.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.definitions.insert(name.into(), definition);
        self
    }
}

/// Top level settings for a [`crate::QueryCompiler`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Default search fields, e.g. `"title^2, text"`
    pub fields: String,
    pub default_operator: DefaultOperator,
    /// Whether an empty query matches everything or nothing
    pub empty_is_match_all: bool,
    /// Whether default fields become explicitly searchable
    pub whitelist_defaults: bool,
    pub field_query: FieldQuerySettings,
    pub authorization: AuthorizationConfig,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            fields: "text".to_string(),
            default_operator: DefaultOperator::And,
            empty_is_match_all: true,
            whitelist_defaults: true,
            field_query: FieldQuerySettings::default(),
            authorization: AuthorizationConfig::default(),
        }
    }
}

impl CompilerSettings {
    /// Create settings searching the given default fields
    pub fn new(fields: impl Into<String>) -> Self {
        Self {
            fields: fields.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: CompilerSettings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check settings that would otherwise fail deep inside compilation
    pub fn validate(&self) -> Result<()> {
        if self.fields.trim().is_empty() {
            return Err(QueryError::InvalidConfig(
                "at least one default field is required".to_string(),
            ));
        }
        if self.field_query.default_phrase_slop > self.field_query.max_phrase_slop {
            return Err(QueryError::InvalidConfig(format!(
                "default phrase slop {} exceeds max phrase slop {}",
                self.field_query.default_phrase_slop, self.field_query.max_phrase_slop
            )));
        }
        Ok(())
    }

    pub fn with_default_operator(mut self, operator: DefaultOperator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn with_empty_is_match_all(mut self, match_all: bool) -> Self {
        self.empty_is_match_all = match_all;
        self
    }

    pub fn with_whitelist_defaults(mut self, whitelist_defaults: bool) -> Self {
        self.whitelist_defaults = whitelist_defaults;
        self
    }

    pub fn with_field_query(mut self, field_query: FieldQuerySettings) -> Self {
        self.field_query = field_query;
        self
    }

    pub fn with_authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = authorization;
        self
    }
}
