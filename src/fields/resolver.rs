//! Field resolution engine
//!
//! Turns a [`FieldReference`] into the [`FieldUsage`]s it stands for:
//! 1. aliases expand a name into an ordered list of weighted targets
//! 2. each target is authorized against the blacklist and whitelist
//! 3. authorized targets resolve to a canonical field, built once per engine
//!    and shared by every later usage
//!
//! An engine is request scoped. Whitelisting performed under
//! [`UnauthorizedAction::Whitelist`] mutates it, and later resolutions on
//! the same engine see the change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use super::catalog::FieldCatalog;
use super::definition::{parse_fields, CanonicalField, FieldDefinition, FieldReference, FieldUsage};
use crate::config::AuthorizationConfig;
use crate::error::QueryError;
use crate::Result;

/// Sub-field suffixes probed when a field has no explicit definition
pub const PRECISE_SUFFIX: &str = ".precise";
pub const REVERSE_PRECISE_SUFFIX: &str = ".reverse_precise";
pub const PREFIX_PRECISE_SUFFIX: &str = ".prefix_precise";
pub const TRIGRAM_SUFFIX: &str = ".trigram";

/// What to do with a field the caller is not authorized to search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnauthorizedAction {
    /// Resolve it anyway
    Keep,
    /// Drop it from the result
    Remove,
    /// Authorize it for the rest of the request, then resolve it
    Whitelist,
}

/// Request scoped alias expansion, authorization and canonical field cache
#[derive(Debug)]
pub struct FieldResolver {
    catalog: Arc<dyn FieldCatalog>,
    aliases: HashMap<String, Vec<FieldReference>>,
    definitions: HashMap<String, FieldDefinition>,
    /// `None` allows every field that is not blacklisted
    whitelist: Option<HashSet<String>>,
    blacklist: HashSet<String>,
    canonical: HashMap<String, Arc<CanonicalField>>,
}

fn check_boost(field: &str, boost: f32) -> Result<()> {
    if boost.is_finite() && boost > 0.0 {
        Ok(())
    } else {
        Err(QueryError::InvalidBoost {
            field: field.to_string(),
            boost,
        })
    }
}

impl FieldResolver {
    /// Create an engine with an empty whitelist
    pub fn new(catalog: Arc<dyn FieldCatalog>) -> Self {
        Self {
            catalog,
            aliases: HashMap::new(),
            definitions: HashMap::new(),
            whitelist: Some(HashSet::new()),
            blacklist: HashSet::new(),
            canonical: HashMap::new(),
        }
    }

    /// Create an engine configured from authorization settings
    pub fn from_config(catalog: Arc<dyn FieldCatalog>, config: &AuthorizationConfig) -> Result<Self> {
        let mut resolver = Self::new(catalog);
        if config.whitelist_all {
            resolver.whitelist_all();
        }
        for field in &config.whitelist {
            resolver.whitelist(field.clone());
        }
        for field in &config.blacklist {
            resolver.blacklist(field.clone());
        }
        for (name, fields) in &config.aliases {
            resolver.alias(name.clone(), parse_fields(fields)?)?;
        }
        for (name, definition) in &config.definitions {
            resolver.define(name.clone(), definition.clone())?;
        }
        Ok(resolver)
    }

    /// Declare `name` as an alias for `targets`, appending to earlier targets
    pub fn alias(&mut self, name: impl Into<String>, targets: Vec<FieldReference>) -> Result<()> {
        let name = name.into();
        for target in &targets {
            check_boost(&target.name, target.boost)?;
        }
        self.aliases.entry(name).or_default().extend(targets);
        Ok(())
    }

    /// Pin the physical sub-fields of `name` instead of probing the catalog
    ///
    /// Defining a field does not authorize it.
    pub fn define(&mut self, name: impl Into<String>, definition: FieldDefinition) -> Result<()> {
        let name = name.into();
        if self.canonical.contains_key(&name) && self.definitions.get(&name) != Some(&definition) {
            return Err(QueryError::ConflictingDefinition { field: name });
        }
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Allow `field`, restoring an explicit whitelist if everything was allowed
    pub fn whitelist(&mut self, field: impl Into<String>) {
        self.whitelist
            .get_or_insert_with(HashSet::new)
            .insert(field.into());
    }

    /// Allow every field that is not blacklisted
    pub fn whitelist_all(&mut self) {
        self.whitelist = None;
    }

    pub fn blacklist(&mut self, field: impl Into<String>) {
        self.blacklist.insert(field.into());
    }

    /// Whether `field` may be searched; the blacklist always wins
    pub fn allowed(&self, field: &str) -> bool {
        if self.blacklist.contains(field) {
            return false;
        }
        match &self.whitelist {
            None => true,
            Some(whitelist) => whitelist.contains(field),
        }
    }

    /// Resolve a user written field reference
    ///
    /// Unauthorized targets are handled per `action`. An empty result is not
    /// an error; it means nothing the reference names may be searched.
    pub fn resolve(
        &mut self,
        reference: &FieldReference,
        action: UnauthorizedAction,
    ) -> Result<Vec<FieldUsage>> {
        check_boost(&reference.name, reference.boost)?;

        let targets: Vec<(String, f32)> = match self.aliases.get(&reference.name) {
            Some(targets) => targets
                .iter()
                .map(|target| (target.name.clone(), reference.boost * target.boost))
                .collect(),
            None => vec![(reference.name.clone(), reference.boost)],
        };

        let mut usages = Vec::with_capacity(targets.len());
        for (name, boost) in targets {
            match action {
                UnauthorizedAction::Keep => {}
                UnauthorizedAction::Remove => {
                    if !self.allowed(&name) {
                        debug!(field = %name, requested = %reference.name, "dropping unauthorized field");
                        continue;
                    }
                }
                UnauthorizedAction::Whitelist => self.whitelist(name.clone()),
            }

            let canonical = self.canonical(&name)?;
            let usage = FieldUsage::new(canonical);
            usages.push(if boost == 1.0 { usage } else { usage.boosted(boost) });
        }

        Ok(usages)
    }

    /// Canonical (boost 1) form of `name`, built on first use
    pub fn canonical(&mut self, name: &str) -> Result<Arc<CanonicalField>> {
        if let Some(field) = self.canonical.get(name) {
            return Ok(field.clone());
        }

        let definition = match self.definitions.get(name) {
            Some(definition) => definition.clone(),
            None => self.detect(name)?,
        };
        let field = Arc::new(self.build(name, &definition)?);
        trace!(field = %name, standard = %field.standard, precise = %field.precise, "canonicalized field");
        self.canonical.insert(name.to_string(), field.clone());
        Ok(field)
    }

    /// Probe the catalog for conventionally named sub-fields of `name`
    fn detect(&self, name: &str) -> Result<FieldDefinition> {
        let mut definition = FieldDefinition::new(name);
        let probe = |suffix: &str| -> Result<Option<String>> {
            let candidate = format!("{}{}", name, suffix);
            Ok(self.catalog.lookup(&candidate)?.map(|_| candidate))
        };

        definition.precise = probe(PRECISE_SUFFIX)?;
        definition.reverse_precise = probe(REVERSE_PRECISE_SUFFIX)?;
        definition.prefix_precise = probe(PREFIX_PRECISE_SUFFIX)?;
        if let Some(trigram) = probe(TRIGRAM_SUFFIX)? {
            definition = definition.with_ngram(trigram, 3);
        }
        Ok(definition)
    }

    /// Map a physical name to its index name, if the catalog knows it
    fn index_name(&self, field: &str) -> Result<String> {
        Ok(self
            .catalog
            .lookup(field)?
            .map(|mapped| mapped.index_name)
            .unwrap_or_else(|| field.to_string()))
    }

    fn build(&self, name: &str, definition: &FieldDefinition) -> Result<CanonicalField> {
        let (standard, standard_analyzer, mapped) = match self.catalog.lookup(&definition.standard)? {
            Some(field) => (field.index_name, field.analyzer, true),
            None => (
                definition.standard.clone(),
                self.catalog.default_standard_analyzer(),
                false,
            ),
        };

        let (precise, precise_analyzer) = match &definition.precise {
            Some(precise) => match self.catalog.lookup(precise)? {
                Some(field) => (field.index_name, field.analyzer),
                None => (precise.clone(), self.catalog.default_precise_analyzer()),
            },
            // A mapped field without a precise sub-field is searched as is
            None if mapped => (standard.clone(), standard_analyzer.clone()),
            None => (standard.clone(), self.catalog.default_precise_analyzer()),
        };

        let reverse_precise = match &definition.reverse_precise {
            Some(field) => Some(self.index_name(field)?),
            None => None,
        };
        let prefix_precise = match &definition.prefix_precise {
            Some(field) => Some(self.index_name(field)?),
            None => None,
        };
        let ngram = match &definition.ngram_field {
            Some(field) => Some((self.index_name(field)?, definition.ngram_size)),
            None => None,
        };

        Ok(CanonicalField {
            name: name.to_string(),
            standard,
            precise,
            reverse_precise,
            prefix_precise,
            ngram,
            standard_analyzer,
            precise_analyzer,
            field_names_indexed: self.catalog.has_field_names_index(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::catalog::{NeverFinds, StaticCatalog};
    use crate::tokenizer::KeywordAnalyzer;

    fn resolver() -> FieldResolver {
        FieldResolver::new(Arc::new(NeverFinds::default()))
    }

    fn names(usages: &[FieldUsage]) -> Vec<(&str, f32)> {
        usages.iter().map(|u| (u.standard(), u.boost())).collect()
    }

    #[test]
    fn test_canonical_usage_is_shared() {
        let mut resolver = resolver();
        let first = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap();
        let second = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap();

        assert!(Arc::ptr_eq(first[0].canonical(), second[0].canonical()));
        assert_eq!(second[0].boost(), 1.0);
    }

    #[test]
    fn test_boosted_usage_shares_canonical() {
        let mut resolver = resolver();
        let plain = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap();
        let boosted = resolver
            .resolve(
                &FieldReference::new("title").with_boost(3.0),
                UnauthorizedAction::Keep,
            )
            .unwrap();

        assert_eq!(boosted[0].boost(), 3.0);
        assert!(Arc::ptr_eq(plain[0].canonical(), boosted[0].canonical()));
    }

    #[test]
    fn test_alias_boosts_compose() {
        let mut resolver = resolver();
        resolver
            .alias("a", vec![FieldReference::new("b").with_boost(3.0)])
            .unwrap();

        let usages = resolver
            .resolve(&FieldReference::new("a").with_boost(2.0), UnauthorizedAction::Keep)
            .unwrap();
        assert_eq!(names(&usages), vec![("b", 6.0)]);
    }

    #[test]
    fn test_alias_targets_keep_insertion_order() {
        let mut resolver = resolver();
        resolver
            .alias("a", vec![FieldReference::new("A"), FieldReference::new("C")])
            .unwrap();
        resolver.alias("a", vec![FieldReference::new("B")]).unwrap();

        let usages = resolver
            .resolve(&FieldReference::new("a"), UnauthorizedAction::Keep)
            .unwrap();
        assert_eq!(names(&usages), vec![("A", 1.0), ("C", 1.0), ("B", 1.0)]);
    }

    #[test]
    fn test_blacklist_beats_whitelist() {
        let mut resolver = resolver();
        resolver.whitelist("secret");
        resolver.blacklist("secret");

        assert!(!resolver.allowed("secret"));
        let usages = resolver
            .resolve(&FieldReference::new("secret"), UnauthorizedAction::Remove)
            .unwrap();
        assert!(usages.is_empty());
    }

    #[test]
    fn test_remove_requires_whitelist() {
        let mut resolver = resolver();
        let usages = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Remove)
            .unwrap();
        assert!(usages.is_empty());

        resolver.whitelist_all();
        let usages = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Remove)
            .unwrap();
        assert_eq!(usages.len(), 1);
    }

    #[test]
    fn test_whitelist_side_effect() {
        let mut resolver = resolver();
        resolver
            .resolve(&FieldReference::new("text"), UnauthorizedAction::Whitelist)
            .unwrap();

        let usages = resolver
            .resolve(&FieldReference::new("text"), UnauthorizedAction::Remove)
            .unwrap();
        assert_eq!(names(&usages), vec![("text", 1.0)]);
    }

    #[test]
    fn test_whitelist_policy_ignores_blacklist() {
        let mut resolver = resolver();
        resolver.blacklist("text");
        let usages = resolver
            .resolve(&FieldReference::new("text"), UnauthorizedAction::Whitelist)
            .unwrap();
        assert_eq!(usages.len(), 1);
        assert!(!resolver.allowed("text"));
    }

    #[test]
    fn test_remove_drops_alias_targets_individually() {
        let mut resolver = resolver();
        resolver
            .alias("tc", vec![FieldReference::new("title"), FieldReference::new("category")])
            .unwrap();
        resolver.whitelist("category");

        let usages = resolver
            .resolve(&FieldReference::new("tc"), UnauthorizedAction::Remove)
            .unwrap();
        assert_eq!(names(&usages), vec![("category", 1.0)]);
    }

    #[test]
    fn test_whitelist_all_then_whitelist_recreates_set() {
        let mut resolver = resolver();
        resolver.whitelist_all();
        assert!(resolver.allowed("anything"));

        resolver.whitelist("title");
        assert!(resolver.allowed("title"));
        assert!(!resolver.allowed("anything"));
    }

    #[test]
    fn test_invalid_boosts_fail_fast() {
        let mut resolver = resolver();
        let err = resolver
            .alias("a", vec![FieldReference::new("b").with_boost(0.0)])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidBoost { .. }));

        let err = resolver
            .resolve(
                &FieldReference::new("a").with_boost(-1.0),
                UnauthorizedAction::Keep,
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidBoost { .. }));

        assert!(resolver
            .resolve(
                &FieldReference::new("a").with_boost(f32::NAN),
                UnauthorizedAction::Keep
            )
            .is_err());
    }

    #[test]
    fn test_unmapped_field_falls_back() {
        let mut resolver = resolver();
        let usage = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap()
            .remove(0);

        assert_eq!(usage.standard(), "title");
        assert_eq!(usage.precise(), "title");
        assert_eq!(usage.standard_analyzer().name(), "english_standard");
        assert_eq!(usage.precise_analyzer().name(), "plain");
        assert_eq!(usage.reverse_precise(), None);
        assert_eq!(usage.ngram(), None);
    }

    #[test]
    fn test_sub_fields_are_detected() {
        let keyword = Arc::new(KeywordAnalyzer);
        let catalog = StaticCatalog::default()
            .with_field("title", keyword.clone())
            .with_field("title.precise", keyword.clone())
            .with_field("title.reverse_precise", keyword.clone())
            .with_field("title.prefix_precise", keyword.clone())
            .with_field("title.trigram", keyword);
        let mut resolver = FieldResolver::new(Arc::new(catalog));

        let usage = resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap()
            .remove(0);
        assert_eq!(usage.precise(), "title.precise");
        assert_eq!(usage.reverse_precise(), Some("title.reverse_precise"));
        assert_eq!(usage.prefix_precise(), Some("title.prefix_precise"));
        assert_eq!(usage.ngram(), Some(("title.trigram", 3)));
    }

    #[test]
    fn test_mapped_field_without_precise_uses_own_analyzer() {
        let catalog = StaticCatalog::default().with_field("tag", Arc::new(KeywordAnalyzer));
        let mut resolver = FieldResolver::new(Arc::new(catalog));

        let usage = resolver
            .resolve(&FieldReference::new("tag"), UnauthorizedAction::Keep)
            .unwrap()
            .remove(0);
        assert_eq!(usage.precise(), "tag");
        assert_eq!(usage.precise_analyzer().name(), "keyword");
    }

    #[test]
    fn test_definitions_override_detection() {
        let mut resolver = resolver();
        resolver
            .define("ua", FieldDefinition::new("ua").with_precise("a"))
            .unwrap();

        assert!(!resolver.allowed("ua"));
        let usage = resolver
            .resolve(&FieldReference::new("ua"), UnauthorizedAction::Keep)
            .unwrap()
            .remove(0);
        assert_eq!(usage.standard(), "ua");
        assert_eq!(usage.precise(), "a");
    }

    #[test]
    fn test_redefining_resolved_field_fails() {
        let mut resolver = resolver();
        resolver
            .resolve(&FieldReference::new("title"), UnauthorizedAction::Keep)
            .unwrap();

        let err = resolver
            .define("title", FieldDefinition::new("other"))
            .unwrap_err();
        assert!(matches!(err, QueryError::ConflictingDefinition { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = AuthorizationConfig::default()
            .whitelist("title")
            .blacklist("secret")
            .alias("tc", "title^2, category");
        let mut resolver = FieldResolver::from_config(Arc::new(NeverFinds::default()), &config).unwrap();

        assert!(resolver.allowed("title"));
        assert!(!resolver.allowed("category"));
        let usages = resolver
            .resolve(&FieldReference::new("tc"), UnauthorizedAction::Keep)
            .unwrap();
        assert_eq!(names(&usages), vec![("title", 2.0), ("category", 1.0)]);
    }
}
