use super::{AnalyzedToken, TextAnalyzer, TokenStream};
use crate::Result;

/// Emits the whole input as a single unmodified token
#[derive(Clone, Debug, Default)]
pub struct KeywordAnalyzer;

impl TextAnalyzer for KeywordAnalyzer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn analyze<'a>(&'a self, _field: &str, text: &'a str) -> Result<Box<dyn TokenStream + 'a>> {
        Ok(Box::new(KeywordTokenStream { text: Some(text) }))
    }
}

struct KeywordTokenStream<'a> {
    text: Option<&'a str>,
}

impl TokenStream for KeywordTokenStream<'_> {
    fn next_token(&mut self) -> Result<Option<AnalyzedToken>> {
        Ok(self
            .text
            .take()
            .filter(|text| !text.is_empty())
            .map(|text| AnalyzedToken::new(text, 1)))
    }

    fn close(&mut self) -> Result<()> {
        self.text = None;
        Ok(())
    }
}
