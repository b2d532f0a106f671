//! End-to-end query string compilation
//!
//! Each test compiles real query strings through [`QueryCompiler`] and
//! compares the resulting tree.

use std::io::Write;
use std::sync::Arc;

use fieldquery::config::{AuthorizationConfig, FieldQuerySettings, TokenizerConfig};
use fieldquery::fields::CatalogConfig;
use fieldquery::query::nodes::{
    BooleanQuery, FuzzyQuery, MultiPhraseQuery, PhraseQuery, PrefixQuery, RegexQuery, SpanNearQuery,
    SpanQuery, WildcardQuery,
};
use fieldquery::query::NgramRegexAccelerator;
use fieldquery::{
    CompilerSettings, DefaultOperator, FieldCatalog, KeywordAnalyzer, NeverFinds, QueryCompiler, QueryNode,
    StandardAnalyzer, StaticCatalog, TextAnalyzer,
};
use pretty_assertions::assert_eq;

fn keyword_catalog() -> StaticCatalog {
    let keyword: Arc<dyn TextAnalyzer> = Arc::new(KeywordAnalyzer);
    StaticCatalog::new(keyword.clone(), keyword)
}

/// `field` analyzed in English with a lowercase-only `field.precise`
fn english_catalog() -> Arc<dyn FieldCatalog> {
    let standard: Arc<dyn TextAnalyzer> = Arc::new(StandardAnalyzer::new(&TokenizerConfig::default()));
    let precise: Arc<dyn TextAnalyzer> = Arc::new(StandardAnalyzer::new(&TokenizerConfig::precise()));
    Arc::new(
        StaticCatalog::new(standard.clone(), precise.clone())
            .with_field("field", standard)
            .with_field("field.precise", precise),
    )
}

fn compiler(settings: CompilerSettings, catalog: Arc<dyn FieldCatalog>) -> QueryCompiler {
    QueryCompiler::new(settings, catalog).unwrap()
}

fn compile(compiler: &QueryCompiler, query: &str) -> QueryNode {
    compiler.compile(query).unwrap()
}

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn phrase(field: &str, words: &[&str]) -> QueryNode {
    QueryNode::Phrase(PhraseQuery::new(field, terms(words)))
}

fn and(nodes: Vec<QueryNode>) -> QueryNode {
    nodes.into_iter().fold(BooleanQuery::new(), BooleanQuery::must).into()
}

fn or(nodes: Vec<QueryNode>) -> QueryNode {
    BooleanQuery::any_of(nodes).into()
}

fn fuzzy(field: &str, text: &str, edits: u32) -> QueryNode {
    QueryNode::Fuzzy(FuzzyQuery::new(field, text).with_edits(edits))
}

#[test]
fn test_negated_term_with_identity_analysis() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(
        compile(&compiler, "foo -bar"),
        BooleanQuery::new()
            .must(QueryNode::term("f", "foo"))
            .must_not(QueryNode::term("f", "bar"))
            .into()
    );
}

#[test]
fn test_phrase_slop_is_clamped() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(
        compile(&compiler, "\"foo bar\"~2"),
        QueryNode::Phrase(PhraseQuery::new("f", terms(&["foo", "bar"])).with_slop(2))
    );
    assert_eq!(
        compile(&compiler, "\"foo bar\"~300"),
        QueryNode::Phrase(PhraseQuery::new("f", terms(&["foo", "bar"])).with_slop(20))
    );
}

#[test]
fn test_prefix_in_phrase_builds_span() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(
        compile(&compiler, "\"foo* bar\""),
        QueryNode::Span(SpanQuery::Near(SpanNearQuery {
            field: "f".to_string(),
            clauses: vec![
                SpanQuery::MultiTerm {
                    query: Box::new(QueryNode::Prefix(PrefixQuery::new("f", "foo"))),
                    top_terms: 50,
                },
                SpanQuery::term("f", "bar"),
            ],
            slop: 0,
            in_order: true,
        }))
    );
}

#[test]
fn test_empty_query() {
    let match_all = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(compile(&match_all, ""), QueryNode::MatchAll);
    assert_eq!(compile(&match_all, "\"\""), QueryNode::MatchAll);

    let match_none = compiler(
        CompilerSettings::new("f").with_empty_is_match_all(false),
        Arc::new(keyword_catalog()),
    );
    assert_eq!(compile(&match_none, ""), QueryNode::MatchNone);
    assert_eq!(compile(&match_none, "   "), QueryNode::MatchNone);
}

#[test]
fn test_stopword_only_query_is_empty() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());
    assert_eq!(compile(&compiler, "the"), QueryNode::MatchAll);
    assert_eq!(compile(&compiler, "AND"), QueryNode::MatchAll);

    // Excluding an unindexed word excludes nothing
    assert_eq!(compile(&compiler, "-the"), QueryNode::MatchAll);
    assert_eq!(compile(&compiler, "foo -the"), QueryNode::term("field", "foo"));

    let match_none = self::compiler(
        CompilerSettings::new("field").with_empty_is_match_all(false),
        english_catalog(),
    );
    assert_eq!(compile(&match_none, "-the"), QueryNode::MatchNone);
}

#[test]
fn test_operator_words_with_keyword_analysis() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    for literal in ["AND", "OR", "||", ",", "a,", "~", "+", "-"] {
        assert_eq!(compile(&compiler, literal), QueryNode::term("f", literal), "{}", literal);
    }
    assert_eq!(
        compile(&compiler, "foo &&"),
        and(vec![QueryNode::term("f", "foo"), QueryNode::term("f", "&&")])
    );
}

#[test]
fn test_boolean_structure() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    let t = |text: &str| QueryNode::term("f", text);

    assert_eq!(compile(&compiler, "foo bar baz"), and(vec![t("foo"), t("bar"), t("baz")]));
    assert_eq!(compile(&compiler, "foo||bar"), or(vec![t("foo"), t("bar")]));
    assert_eq!(compile(&compiler, "foo&&bar"), and(vec![t("foo"), t("bar")]));
    assert_eq!(
        compile(&compiler, "foo AND bar OR baz"),
        or(vec![and(vec![t("foo"), t("bar")]), t("baz")])
    );
    assert_eq!(
        compile(&compiler, "foo bar OR baz"),
        and(vec![t("foo"), or(vec![t("bar"), t("baz")])])
    );
    assert_eq!(
        compile(&compiler, "foo -(bar OR baz)"),
        BooleanQuery::new()
            .must(t("foo"))
            .must_not(or(vec![t("bar"), t("baz")]))
            .into()
    );
    assert_eq!(
        compile(&compiler, "foo ! bar"),
        BooleanQuery::new().must(t("foo")).must_not(t("bar")).into()
    );
}

#[test]
fn test_default_or() {
    let compiler = compiler(
        CompilerSettings::new("f").with_default_operator(DefaultOperator::Or),
        Arc::new(keyword_catalog()),
    );
    let t = |text: &str| QueryNode::term("f", text);

    assert_eq!(
        compile(&compiler, "foo bar OR baz"),
        or(vec![t("foo"), or(vec![t("bar"), t("baz")])])
    );
    assert_eq!(
        compile(&compiler, "foo bar +(baz AND qux)"),
        BooleanQuery::new()
            .should(t("foo"))
            .should(t("bar"))
            .must(and(vec![t("baz"), t("qux")]))
            .with_minimum_should_match(1)
            .into()
    );
}

#[test]
fn test_english_analysis() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());

    assert_eq!(compile(&compiler, "cats"), QueryNode::term("field", "cat"));
    assert_eq!(compile(&compiler, "\"foo bar\""), phrase("field.precise", &["foo", "bar"]));
    assert_eq!(compile(&compiler, "\"foo bar\"~"), phrase("field", &["foo", "bar"]));
    assert_eq!(
        compile(&compiler, "\"foo bar\"~1~"),
        QueryNode::Phrase(PhraseQuery::new("field", terms(&["foo", "bar"])).with_slop(1))
    );
    assert_eq!(
        compile(&compiler, "\"foo bar\"~garbage qux"),
        and(vec![phrase("field", &["foo", "bar"]), QueryNode::term("field", "qux")])
    );
    assert_eq!(compile(&compiler, "\"foo\" bar"), and(vec![
        QueryNode::term("field.precise", "foo"),
        QueryNode::term("field", "bar"),
    ]));
    assert_eq!(compile(&compiler, "日本語"), phrase("field", &["日", "本", "語"]));
    assert_eq!(compile(&compiler, "\"日本語\""), phrase("field.precise", &["日", "本", "語"]));
}

#[test]
fn test_multi_term_queries_use_precise_field() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());

    assert_eq!(
        compile(&compiler, "pickl*"),
        QueryNode::Prefix(PrefixQuery::new("field.precise", "pickl"))
    );
    assert_eq!(
        compile(&compiler, "pi*kl?"),
        QueryNode::Wildcard(WildcardQuery::new("field.precise", "pi*kl?"))
    );
    assert_eq!(
        compile(&compiler, "pi\\*kl?"),
        QueryNode::Wildcard(WildcardQuery::new("field.precise", "pi\\*kl?"))
    );
    assert_eq!(
        compile(&compiler, "foo *"),
        and(vec![
            QueryNode::term("field", "foo"),
            QueryNode::Prefix(PrefixQuery::new("field", "")),
        ])
    );
}

#[test]
fn test_disabled_multi_term_queries_keep_raw_text() {
    let settings = CompilerSettings::new("field")
        .with_field_query(FieldQuerySettings::default().with_allow_prefix(false));
    let compiler = compiler(settings, english_catalog());

    assert_eq!(compile(&compiler, "pickl*"), QueryNode::term("field.precise", "pickl*"));
    assert_eq!(compile(&compiler, "/foo./"), QueryNode::term("field.precise", "/foo./"));
    assert_eq!(
        compile(&compiler, "cats pickl*"),
        and(vec![
            QueryNode::term("field", "cat"),
            QueryNode::term("field.precise", "pickl*"),
        ])
    );
}

#[test]
fn test_fuzziness() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());

    assert_eq!(compile(&compiler, "foo~"), fuzzy("field.precise", "foo", 1));
    assert_eq!(compile(&compiler, "foo~1"), fuzzy("field.precise", "foo", 1));
    assert_eq!(compile(&compiler, "foo~3"), fuzzy("field.precise", "foo", 2));
    assert_eq!(compile(&compiler, "foo~.4"), fuzzy("field.precise", "foo", 1));
    assert_eq!(compile(&compiler, "fooooo~"), fuzzy("field.precise", "fooooo", 2));
    assert_eq!(compile(&compiler, "foo~.8"), QueryNode::term("field", "foo"));
    assert_eq!(compile(&compiler, "foo~0"), QueryNode::term("field", "foo"));
    assert_eq!(compile(&compiler, "zq~"), QueryNode::term("field", "zq"));
    assert_eq!(
        compile(&compiler, "foo~ bar"),
        and(vec![fuzzy("field.precise", "foo", 1), QueryNode::term("field", "bar")])
    );
}

#[test]
fn test_unquoted_span_masks_precise_clauses() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());
    assert_eq!(
        compile(&compiler, "\"foo* bar\"~"),
        QueryNode::Span(SpanQuery::Near(SpanNearQuery {
            field: "field".to_string(),
            clauses: vec![
                SpanQuery::FieldMask {
                    inner: Box::new(SpanQuery::MultiTerm {
                        query: Box::new(QueryNode::Prefix(PrefixQuery::new("field.precise", "foo"))),
                        top_terms: 50,
                    }),
                    field: "field".to_string(),
                },
                SpanQuery::term("field", "bar"),
            ],
            slop: 0,
            in_order: true,
        }))
    );
}

#[test]
fn test_boosts() {
    let compiler = compiler(CompilerSettings::new("field"), english_catalog());

    assert_eq!(
        compile(&compiler, "\"foo bar\"^2"),
        phrase("field.precise", &["foo", "bar"]).boosted(2.0)
    );
    assert_eq!(
        compile(&compiler, "foo^5.1 bar"),
        and(vec![QueryNode::term("field", "foo").boosted(5.1), QueryNode::term("field", "bar")])
    );
    // A boost that is not a number is searched as text
    assert_eq!(
        compile(&compiler, "foo^qux bar"),
        and(vec![phrase("field", &["foo", "qux"]), QueryNode::term("field", "bar")])
    );
}

#[test]
fn test_multiple_default_fields() {
    let compiler = compiler(CompilerSettings::new("a, b^5"), Arc::new(NeverFinds::default()));

    assert_eq!(
        compile(&compiler, "foo"),
        or(vec![QueryNode::term("a", "foo"), QueryNode::term("b", "foo").boosted(5.0)])
    );
    assert_eq!(
        compile(&compiler, "\"foo bar\""),
        or(vec![
            phrase("a", &["foo", "bar"]),
            phrase("b", &["foo", "bar"]).boosted(5.0),
        ])
    );
}

#[test]
fn test_field_lists_and_blacklist() {
    let authorization = AuthorizationConfig::default()
        .whitelist("another")
        .whitelist("andAnother")
        .whitelist("blacklisted")
        .blacklist("blacklisted");
    let compiler = compiler(
        CompilerSettings::new("field").with_authorization(authorization),
        Arc::new(keyword_catalog()),
    );
    let bar = QueryNode::term("field", "bar");

    assert_eq!(
        compile(&compiler, "another:foo bar"),
        and(vec![QueryNode::term("another", "foo"), bar.clone()])
    );
    assert_eq!(
        compile(&compiler, "another^2:foo bar"),
        and(vec![QueryNode::term("another", "foo").boosted(2.0), bar.clone()])
    );
    let both = or(vec![QueryNode::term("another", "foo"), QueryNode::term("andAnother", "foo")]);
    assert_eq!(compile(&compiler, "another,andAnother:foo bar"), and(vec![both.clone(), bar.clone()]));
    assert_eq!(compile(&compiler, "another, andAnother:foo bar"), and(vec![both, bar.clone()]));
    assert_eq!(
        compile(&compiler, "another,blacklisted:foo bar"),
        and(vec![QueryNode::term("another", "foo"), bar.clone()])
    );
    assert_eq!(
        compile(&compiler, "blacklisted:foo bar"),
        and(vec![QueryNode::term("field", "blacklisted:foo"), bar])
    );
    assert_eq!(
        compile(&compiler, "10.1093/acprof:oso"),
        QueryNode::term("field", "10.1093/acprof:oso")
    );
}

#[test]
fn test_aliases() {
    let authorization = AuthorizationConfig::default()
        .alias("intitle", "title")
        .alias("tc", "title^2, category")
        .whitelist("title")
        .whitelist("category");
    let compiler = compiler(
        CompilerSettings::new("field").with_authorization(authorization),
        Arc::new(keyword_catalog()),
    );

    assert_eq!(compile(&compiler, "intitle:\"foo bar\""), phrase("title", &["foo", "bar"]));
    assert_eq!(
        compile(&compiler, "tc:\"foo bar\""),
        or(vec![
            phrase("title", &["foo", "bar"]).boosted(2.0),
            phrase("category", &["foo", "bar"]),
        ])
    );
    assert_eq!(
        compile(&compiler, "tc^2:\"foo bar\""),
        or(vec![
            phrase("title", &["foo", "bar"]).boosted(4.0),
            phrase("category", &["foo", "bar"]).boosted(2.0),
        ])
    );
}

#[test]
fn test_leading_wildcards() {
    let strict = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(compile(&strict, "*oo"), QueryNode::term("f", "*oo"));
    assert_eq!(compile(&strict, "???"), QueryNode::term("f", "???"));

    let lenient = compiler(
        CompilerSettings::new("f")
            .with_field_query(FieldQuerySettings::default().with_allow_leading_wildcard(true)),
        Arc::new(keyword_catalog()),
    );
    assert_eq!(compile(&lenient, "*oo"), QueryNode::Wildcard(WildcardQuery::new("f", "*oo")));

    let keyword: Arc<dyn TextAnalyzer> = Arc::new(KeywordAnalyzer);
    let reversed = compiler(
        CompilerSettings::new("f"),
        Arc::new(keyword_catalog().with_field("f.reverse_precise", keyword)),
    );
    assert_eq!(
        compile(&reversed, "?oo"),
        QueryNode::Wildcard(WildcardQuery::new("f.reverse_precise", "oo?"))
    );
    assert_eq!(compile(&reversed, "?o?"), QueryNode::term("f", "?o?"));
}

#[test]
fn test_prefix_field() {
    let keyword: Arc<dyn TextAnalyzer> = Arc::new(KeywordAnalyzer);
    let compiler = compiler(
        CompilerSettings::new("f"),
        Arc::new(keyword_catalog().with_field("f.prefix_precise", keyword)),
    );
    assert_eq!(compile(&compiler, "oo*"), QueryNode::term("f.prefix_precise", "oo"));
}

#[test]
fn test_field_exists() {
    let compiler = compiler(
        CompilerSettings::new("f"),
        Arc::new(keyword_catalog().with_field_names_index(true)),
    );
    assert_eq!(
        compile(&compiler, "f:*"),
        QueryNode::FieldExists {
            field: "f".to_string()
        }
    );
}

#[test]
fn test_regex() {
    let keyword: Arc<dyn TextAnalyzer> = Arc::new(KeywordAnalyzer);
    let compiler = compiler(
        CompilerSettings::new("f"),
        Arc::new(keyword_catalog().with_field("f.trigram", keyword)),
    )
    .with_regex_accelerator(Arc::new(NgramRegexAccelerator::new()));

    assert_eq!(
        compile(&compiler, "/foo./"),
        QueryNode::Regex(RegexQuery::new("f", "foo.").with_ngram_field("f.trigram", 3))
    );
    assert_eq!(
        compile(&compiler, "/f\\oo./"),
        QueryNode::Regex(RegexQuery::new("f", "f\\oo.").with_ngram_field("f.trigram", 3))
    );
    assert_eq!(
        compile(&compiler, "/cat|dog/"),
        QueryNode::Regex(RegexQuery::new("f", "cat|dog").with_ngram_field("f.trigram", 3))
    );

    let disabled = self::compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    assert_eq!(compile(&disabled, "/foo./"), QueryNode::term("f", "/foo./"));
}

#[test]
fn test_synonyms_from_mapping_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "fields": {{
                "body": {{ "analyzer": {{ "type": "keyword" }}, "synonyms": {{ "foo": ["bar"] }} }}
            }}
        }}"#
    )
    .unwrap();

    let config = CatalogConfig::from_json_file(file.path()).unwrap();
    let compiler = compiler(CompilerSettings::new("body"), Arc::new(StaticCatalog::from_config(&config)));

    assert_eq!(
        compile(&compiler, "foo"),
        or(vec![QueryNode::term("body", "foo"), QueryNode::term("body", "bar")])
    );
    assert_eq!(
        compile(&compiler, "\"foo baz\""),
        QueryNode::MultiPhrase(MultiPhraseQuery::new(
            "body",
            vec![terms(&["foo", "bar"]), terms(&["baz"])]
        ))
    );
}

#[test]
fn test_compiled_query_serializes() {
    let compiler = compiler(CompilerSettings::new("f"), Arc::new(keyword_catalog()));
    let json = serde_json::to_value(compile(&compiler, "foo -bar")).unwrap();
    assert_eq!(json["type"], "boolean");
    assert_eq!(json["clauses"][1]["occur"], "must_not");
    assert_eq!(json["clauses"][1]["query"]["text"], "bar");
}
