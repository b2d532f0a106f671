//! Text analysis
//!
//! Analyzers turn a raw sub-term into normalized tokens, each carrying a
//! position increment: `0` stacks the token on the previous position (a
//! synonym), `n >= 1` advances by `n` positions, so `n - 1` positions were
//! removed (usually stopwords).
//!
//! Token streams are scoped resources. Open them through [`StreamGuard`],
//! which closes the stream when dropped even if draining failed halfway.

mod keyword;
mod synonym;
#[allow(clippy::module_inception)]
mod tokenizer;

pub use keyword::KeywordAnalyzer;
pub use synonym::SynonymAnalyzer;
pub use tokenizer::StandardAnalyzer;

use std::fmt::Debug;

use tracing::warn;

use crate::Result;

/// One normalized token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub text: String,
    pub position_increment: u32,
}

impl AnalyzedToken {
    pub fn new(text: impl Into<String>, position_increment: u32) -> Self {
        Self {
            text: text.into(),
            position_increment,
        }
    }
}

/// Lazy, finite sequence of tokens produced by an analyzer
pub trait TokenStream {
    /// Next token, or `None` once the input is exhausted
    fn next_token(&mut self) -> Result<Option<AnalyzedToken>>;

    /// Release analyzer resources held by this stream
    fn close(&mut self) -> Result<()>;
}

/// Turns field text into a token stream
pub trait TextAnalyzer: Send + Sync + Debug {
    /// Short name used in logs and diagnostics
    fn name(&self) -> &str;

    fn analyze<'a>(&'a self, field: &str, text: &'a str) -> Result<Box<dyn TokenStream + 'a>>;
}

/// Owns an open token stream and guarantees it is closed
pub struct StreamGuard<'a> {
    stream: Box<dyn TokenStream + 'a>,
    field: String,
    closed: bool,
}

impl<'a> StreamGuard<'a> {
    /// Open a stream for `text` on `field`
    pub fn open(analyzer: &'a dyn TextAnalyzer, field: &str, text: &'a str) -> Result<Self> {
        Ok(Self {
            stream: analyzer.analyze(field, text)?,
            field: field.to_string(),
            closed: false,
        })
    }

    pub fn next_token(&mut self) -> Result<Option<AnalyzedToken>> {
        self.stream.next_token()
    }

    /// Close the stream, reporting any failure
    pub fn finish(mut self) -> Result<()> {
        self.closed = true;
        self.stream.close()
    }
}

impl Drop for StreamGuard<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.stream.close() {
                warn!(field = %self.field, error = %err, "failed to close abandoned token stream");
            }
        }
    }
}

/// Drain an analyzer into a vector, closing the stream
pub fn analyze_all(analyzer: &dyn TextAnalyzer, field: &str, text: &str) -> Result<Vec<AnalyzedToken>> {
    let mut stream = StreamGuard::open(analyzer, field, text)?;
    let mut tokens = Vec::new();
    while let Some(token) = stream.next_token()? {
        tokens.push(token);
    }
    stream.finish()?;
    Ok(tokens)
}
