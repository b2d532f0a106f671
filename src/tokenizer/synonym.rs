use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::{AnalyzedToken, TextAnalyzer, TokenStream};
use crate::Result;

/// Adds synonyms at the same position as the token they expand
///
/// Lookups use the wrapped analyzer's output, so keys should be written in
/// normalized form.
#[derive(Debug)]
pub struct SynonymAnalyzer {
    name: String,
    inner: Arc<dyn TextAnalyzer>,
    synonyms: HashMap<String, Vec<String>>,
}

impl SynonymAnalyzer {
    pub fn new(inner: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            name: format!("{}_synonyms", inner.name()),
            inner,
            synonyms: HashMap::new(),
        }
    }

    /// Emit `synonym` wherever `term` appears
    pub fn with_synonym(mut self, term: impl Into<String>, synonym: impl Into<String>) -> Self {
        self.synonyms
            .entry(term.into())
            .or_default()
            .push(synonym.into());
        self
    }
}

impl TextAnalyzer for SynonymAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze<'a>(&'a self, field: &str, text: &'a str) -> Result<Box<dyn TokenStream + 'a>> {
        Ok(Box::new(SynonymTokenStream {
            inner: self.inner.analyze(field, text)?,
            synonyms: &self.synonyms,
            pending: VecDeque::new(),
        }))
    }
}

struct SynonymTokenStream<'a> {
    inner: Box<dyn TokenStream + 'a>,
    synonyms: &'a HashMap<String, Vec<String>>,
    pending: VecDeque<AnalyzedToken>,
}

impl TokenStream for SynonymTokenStream<'_> {
    fn next_token(&mut self) -> Result<Option<AnalyzedToken>> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(Some(token));
        }

        let token = match self.inner.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        if let Some(synonyms) = self.synonyms.get(&token.text) {
            self.pending
                .extend(synonyms.iter().map(|synonym| AnalyzedToken::new(synonym.clone(), 0)));
        }
        Ok(Some(token))
    }

    fn close(&mut self) -> Result<()> {
        self.pending.clear();
        self.inner.close()
    }
}
