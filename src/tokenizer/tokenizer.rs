use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::{UnicodeSegmentation, UnicodeWords};

use super::{AnalyzedToken, TextAnalyzer, TokenStream};
use crate::config::{Language, TokenizerConfig};
use crate::error::QueryError;
use crate::Result;

/// Snowball algorithm and stopword list for a language
fn language_resources(language: Language) -> (Algorithm, LANGUAGE) {
    match language {
        Language::Arabic => (Algorithm::Arabic, LANGUAGE::Arabic),
        Language::Danish => (Algorithm::Danish, LANGUAGE::Danish),
        Language::Dutch => (Algorithm::Dutch, LANGUAGE::Dutch),
        Language::English => (Algorithm::English, LANGUAGE::English),
        Language::Finnish => (Algorithm::Finnish, LANGUAGE::Finnish),
        Language::French => (Algorithm::French, LANGUAGE::French),
        Language::German => (Algorithm::German, LANGUAGE::German),
        Language::Greek => (Algorithm::Greek, LANGUAGE::Greek),
        Language::Hungarian => (Algorithm::Hungarian, LANGUAGE::Hungarian),
        Language::Italian => (Algorithm::Italian, LANGUAGE::Italian),
        Language::Norwegian => (Algorithm::Norwegian, LANGUAGE::Norwegian),
        Language::Portuguese => (Algorithm::Portuguese, LANGUAGE::Portuguese),
        Language::Romanian => (Algorithm::Romanian, LANGUAGE::Romanian),
        Language::Russian => (Algorithm::Russian, LANGUAGE::Russian),
        Language::Spanish => (Algorithm::Spanish, LANGUAGE::Spanish),
        Language::Swedish => (Algorithm::Swedish, LANGUAGE::Swedish),
        Language::Turkish => (Algorithm::Turkish, LANGUAGE::Turkish),
    }
}

/// Word analyzer with lowercasing, stemming and stopword removal
///
/// Words are split on Unicode word boundaries. Words removed by the length or
/// stopword filters still consume a position, so the next kept token reports
/// a position increment greater than one.
pub struct StandardAnalyzer {
    name: String,
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl StandardAnalyzer {
    /// Create a new analyzer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let (algorithm, stopword_language) = language_resources(config.language);
        let stemmer = if config.stem {
            Some(Stemmer::create(algorithm))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(stopword_language)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        let name = match (config.stem, config.remove_stopwords) {
            (true, true) => format!("{}_standard", config.language),
            (true, false) => format!("{}_stemmed", config.language),
            (false, true) => format!("{}_stopwords", config.language),
            (false, false) => "plain".to_string(),
        };

        Self {
            name,
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    /// Normalize one word, or `None` if it is filtered out
    fn normalize(&self, word: &str) -> Option<String> {
        let mut token = if self.config.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        let length = token.chars().count();
        if length < self.config.min_token_length || length > self.config.max_token_length {
            return None;
        }

        // Stopwords are matched after lowercasing, before stemming
        if self.stopwords.contains(&token) {
            return None;
        }

        if let Some(stemmer) = &self.stemmer {
            token = stemmer.stem(&token).into_owned();
        }

        Some(token)
    }
}

impl fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

impl TextAnalyzer for StandardAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze<'a>(&'a self, field: &str, text: &'a str) -> Result<Box<dyn TokenStream + 'a>> {
        Ok(Box::new(StandardTokenStream {
            analyzer: self,
            field: field.to_string(),
            words: text.unicode_words(),
            skipped: 0,
            closed: false,
        }))
    }
}

struct StandardTokenStream<'a> {
    analyzer: &'a StandardAnalyzer,
    field: String,
    words: UnicodeWords<'a>,
    skipped: u32,
    closed: bool,
}

impl TokenStream for StandardTokenStream<'_> {
    fn next_token(&mut self) -> Result<Option<AnalyzedToken>> {
        if self.closed {
            return Err(QueryError::analysis(&self.field, "token stream read after close"));
        }

        for word in self.words.by_ref() {
            match self.analyzer.normalize(word) {
                Some(text) => {
                    let increment = self.skipped + 1;
                    self.skipped = 0;
                    return Ok(Some(AnalyzedToken::new(text, increment)));
                }
                None => self.skipped += 1,
            }
        }

        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::analyze_all;

    fn texts(analyzer: &StandardAnalyzer, text: &str) -> Vec<String> {
        analyze_all(analyzer, "field", text)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_basic_tokenization() {
        let config = TokenizerConfig {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 2,
            max_token_length: 50,
            language: Language::English,
        };

        let analyzer = StandardAnalyzer::new(&config);
        let tokens = texts(&analyzer, "Hello World! This is a test.");

        assert_eq!(tokens, vec!["hello", "world", "this", "is", "test"]);
    }

    #[test]
    fn test_stopword_removal() {
        let config = TokenizerConfig {
            stem: false,
            ..TokenizerConfig::default()
        };

        let analyzer = StandardAnalyzer::new(&config);
        let tokens = texts(&analyzer, "This is the rust programming language");

        assert!(!tokens.contains(&"this".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(tokens.contains(&"rust".to_string()));
        assert!(tokens.contains(&"programming".to_string()));
    }

    #[test]
    fn test_stemming() {
        let analyzer = StandardAnalyzer::new(&TokenizerConfig::precise());
        assert_eq!(texts(&analyzer, "pickles"), vec!["pickles"]);

        let analyzer = StandardAnalyzer::new(&TokenizerConfig::default());
        assert_eq!(texts(&analyzer, "pickles"), vec!["pickl"]);
        assert_eq!(texts(&analyzer, "cats"), vec!["cat"]);
    }

    #[test]
    fn test_min_max_token_length() {
        let config = TokenizerConfig {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 3,
            max_token_length: 5,
            language: Language::English,
        };

        let analyzer = StandardAnalyzer::new(&config);
        let tokens = texts(&analyzer, "a ab abc abcd abcde abcdef");

        assert_eq!(tokens, vec!["abc", "abcd", "abcde"]);
    }

    #[test]
    fn test_position_increments_skip_stopwords() {
        let config = TokenizerConfig {
            stem: false,
            ..TokenizerConfig::default()
        };
        let analyzer = StandardAnalyzer::new(&config);

        let tokens = analyze_all(&analyzer, "field", "rust the programming").unwrap();
        assert_eq!(
            tokens,
            vec![
                AnalyzedToken::new("rust", 1),
                AnalyzedToken::new("programming", 2),
            ]
        );
    }

    #[test]
    fn test_stopwords_only() {
        let analyzer = StandardAnalyzer::new(&TokenizerConfig::default());
        assert!(texts(&analyzer, "the AND or").is_empty());
    }

    #[test]
    fn test_punctuation_only() {
        let analyzer = StandardAnalyzer::new(&TokenizerConfig::default());
        assert!(texts(&analyzer, "??? ,").is_empty());
    }

    #[test]
    fn test_ideographs_are_separate_tokens() {
        let analyzer = StandardAnalyzer::new(&TokenizerConfig::precise());
        assert_eq!(texts(&analyzer, "日本語"), vec!["日", "本", "語"]);
    }

    #[test]
    fn test_read_after_close_fails() {
        let analyzer = StandardAnalyzer::new(&TokenizerConfig::default());
        let mut stream = analyzer.analyze("field", "rust").unwrap();
        stream.close().unwrap();
        assert!(stream.next_token().is_err());
    }

    #[test]
    fn test_analyzer_names() {
        assert_eq!(
            StandardAnalyzer::new(&TokenizerConfig::default()).name(),
            "english_standard"
        );
        assert_eq!(StandardAnalyzer::new(&TokenizerConfig::precise()).name(), "plain");
    }

    #[test]
    fn test_configured_language_drives_analysis() {
        let german = TokenizerConfig {
            language: Language::German,
            ..TokenizerConfig::default()
        };
        let analyzer = StandardAnalyzer::new(&german);
        assert_eq!(analyzer.name(), "german_standard");

        // German stopwords are dropped, English ones are ordinary words
        assert!(texts(&analyzer, "und").is_empty());
        assert_eq!(texts(&analyzer, "the").len(), 1);

        let english = StandardAnalyzer::new(&TokenizerConfig::default());
        assert_eq!(texts(&english, "und").len(), 1);
        assert_ne!(texts(&analyzer, "katzen"), texts(&english, "katzen"));
    }
}
