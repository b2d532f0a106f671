//! Recursive descent parser for query strings
//!
//! # Grammar
//!
//! ```text
//! query     := unmarked EOF
//! unmarked  := or_expr*
//! or_expr   := and_expr (OR and_expr)*
//! and_expr  := prefixed (AND prefixed)*
//! prefixed  := ('+' | '-' | NOT) prefixed | fielded
//! fielded   := (fields ':')? boosted
//! fields    := field ('^' number)? (',' field ('^' number)?)*
//! boosted   := term ('^' boost)*
//! term      := '(' unmarked ')' | phrase | regex | word ('~' similarity?)?
//! phrase    := '"' text '"'? ('~' slop?)*
//! ```
//!
//! Parsing never fails. Operators without operands, stray parentheses and
//! malformed modifiers all degrade to literal text, since end users type
//! whatever they like into a search box.

use super::lexer::{Lexer, Token, TokenKind};
use super::syntax::ParseNode;
use crate::fields::{is_valid_field_name, FieldReference};
use crate::query::builder::PhraseItem;
use crate::query::nodes::has_wildcard;

/// Parser for Lucene-style query strings
pub struct QueryStringParser {
    lexer: Lexer,
    tokens: Vec<Token>,
    position: usize,
}

impl QueryStringParser {
    /// Create a new parser for the given query string
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();
        Self {
            lexer,
            tokens,
            position: 0,
        }
    }

    /// Parse the whole query string
    ///
    /// The root is always [`ParseNode::Unmarked`]; an empty root means the
    /// query contained nothing to search for.
    pub fn parse(&mut self) -> ParseNode {
        let clauses = self.parse_sequence(false);
        ParseNode::Unmarked { clauses }
    }

    fn parse_sequence(&mut self, in_group: bool) -> Vec<ParseNode> {
        let mut clauses = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::RightParen if in_group => break,
                TokenKind::RightParen => {
                    self.advance();
                    clauses.push(ParseNode::term(")"));
                }
                _ => clauses.extend(self.parse_or()),
            }
        }
        clauses
    }

    fn parse_or(&mut self) -> Option<ParseNode> {
        let mut clauses: Vec<ParseNode> = self.parse_and().into_iter().collect();
        while self.current().kind == TokenKind::Or && self.operand_follows() {
            self.advance();
            clauses.extend(self.parse_and());
        }
        Self::join(clauses, |clauses| ParseNode::Or { clauses })
    }

    fn parse_and(&mut self) -> Option<ParseNode> {
        let mut clauses: Vec<ParseNode> = self.parse_prefixed().into_iter().collect();
        while self.current().kind == TokenKind::And && self.operand_follows() {
            self.advance();
            clauses.extend(self.parse_prefixed());
        }
        Self::join(clauses, |clauses| ParseNode::And { clauses })
    }

    fn join(mut clauses: Vec<ParseNode>, wrap: fn(Vec<ParseNode>) -> ParseNode) -> Option<ParseNode> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(wrap(clauses)),
        }
    }

    fn parse_prefixed(&mut self) -> Option<ParseNode> {
        let kind = self.current().kind.clone();
        match kind {
            TokenKind::Plus if self.operand_follows() => {
                self.advance();
                let clause = self.parse_prefixed()?;
                Some(ParseNode::Must {
                    clause: Box::new(clause),
                })
            }
            TokenKind::Minus | TokenKind::Not if self.operand_follows() => {
                self.advance();
                let clause = self.parse_prefixed()?;
                Some(ParseNode::MustNot {
                    clause: Box::new(clause),
                })
            }
            _ => self.parse_fielded(),
        }
    }

    fn parse_fielded(&mut self) -> Option<ParseNode> {
        let start = self.current().start;
        let (fields, after_colon) = match self.try_fields() {
            Some(found) => found,
            None => return self.parse_boosted(),
        };
        self.position = after_colon;
        let clause = self.parse_boosted()?;
        Some(ParseNode::Fielded {
            fields,
            clause: Box::new(clause),
            raw: self.raw_since(start),
        })
    }

    /// Look ahead for `field^boost, field:` followed by a glued value
    ///
    /// Returns the fields and the token index after the colon without
    /// consuming anything.
    fn try_fields(&self) -> Option<(Vec<FieldReference>, usize)> {
        let mut index = self.position;
        let mut fields = Vec::new();
        loop {
            let name = match &self.tokens[index].kind {
                TokenKind::Word(name) if is_valid_field_name(name) => name.clone(),
                _ => return None,
            };
            index += 1;

            let mut field = FieldReference::new(name);
            if self.is_glued(index, |kind| *kind == TokenKind::Caret) {
                let boost = match &self.tokens[index + 1].kind {
                    TokenKind::Word(number) if self.tokens[index + 1].glued => parse_number(number)?,
                    _ => return None,
                };
                field = field.with_boost(boost);
                index += 2;
            }
            fields.push(field);

            if self.is_glued(index, |kind| *kind == TokenKind::Comma) {
                index += 1;
                continue;
            }
            break;
        }

        if !self.is_glued(index, |kind| *kind == TokenKind::Colon) {
            return None;
        }
        index += 1;
        let value_follows = self.is_glued(index, |kind| {
            matches!(
                kind,
                TokenKind::Word(_) | TokenKind::Phrase { .. } | TokenKind::Regex(_) | TokenKind::LeftParen
            )
        });
        if !value_follows {
            return None;
        }
        Some((fields, index))
    }

    fn parse_boosted(&mut self) -> Option<ParseNode> {
        let start = self.current().start;
        let mut node = self.parse_term();

        while self.current().kind == TokenKind::Caret && self.current().glued {
            self.advance();
            let boost = self.take_word_run(true).and_then(|text| parse_number(&text));
            let raw = self.raw_since(start);
            node = node.map(|clause| ParseNode::Boosted {
                clause: Box::new(clause),
                boost,
                raw,
            });
        }
        node
    }

    fn parse_term(&mut self) -> Option<ParseNode> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Eof => None,
            TokenKind::LeftParen => {
                self.advance();
                let clauses = self.parse_sequence(true);
                if self.current().kind == TokenKind::RightParen {
                    self.advance();
                }
                Some(ParseNode::Unmarked { clauses })
            }
            TokenKind::Phrase { text, terminated } => {
                self.advance();
                self.parse_phrase(&text, terminated)
            }
            TokenKind::Regex(pattern) => {
                self.advance();
                Some(ParseNode::Regex { pattern })
            }
            TokenKind::Word(_) | TokenKind::Colon | TokenKind::Comma => self.parse_word(),
            _ => {
                // Operator in literal position
                self.advance();
                Some(ParseNode::term(self.lexer.slice(token.start, token.end)))
            }
        }
    }

    fn parse_phrase(&mut self, text: &str, terminated: bool) -> Option<ParseNode> {
        let mut slop = None;
        let mut use_quoted_field = true;

        if terminated {
            while self.current().kind == TokenKind::Tilde && self.current().glued {
                self.advance();
                match self.glued_word() {
                    Some(word) if is_digits(&word) => {
                        self.advance();
                        let value: u64 = word.parse().unwrap_or(u64::MAX);
                        slop = Some(u32::try_from(value).unwrap_or(u32::MAX));
                    }
                    Some(_) => {
                        self.advance();
                        use_quoted_field = false;
                    }
                    None => use_quoted_field = false,
                }
            }
            if self.glued_word().is_some() {
                self.advance();
            }
        }

        let items = split_phrase(text);
        if items.is_empty() {
            return None;
        }
        Some(ParseNode::Phrase {
            items,
            slop,
            use_quoted_field,
        })
    }

    fn parse_word(&mut self) -> Option<ParseNode> {
        let start = self.current().start;
        let text = self.take_word_run(false)?;

        if self.current().kind == TokenKind::Tilde && self.current().glued {
            self.advance();
            let similarity = match self.take_word_run(true) {
                Some(value) => match parse_similarity(&value) {
                    Some(similarity) => Some(similarity),
                    None => return Some(ParseNode::term(self.raw_since(start))),
                },
                None => None,
            };
            if has_wildcard(&text) {
                return Some(ParseNode::term(self.raw_since(start)));
            }
            return Some(ParseNode::Fuzzy {
                text: unescape(&text),
                similarity,
            });
        }

        Some(classify_word(&text))
    }

    /// Consume a run of glued words, colons and commas, returning its text
    ///
    /// With `glued_start` the run must also touch the previous token, as a
    /// boost or similarity after `^` or `~` does.
    fn take_word_run(&mut self, glued_start: bool) -> Option<String> {
        let first = self.current();
        if !first.is_word_like() || (glued_start && !first.glued) {
            return None;
        }
        let start = first.start;
        let mut end = first.end;
        self.advance();
        while self.current().is_word_like() && self.current().glued {
            end = self.current().end;
            self.advance();
        }
        Some(self.lexer.slice(start, end))
    }

    fn glued_word(&self) -> Option<String> {
        match &self.current().kind {
            TokenKind::Word(word) if self.current().glued => Some(word.clone()),
            _ => None,
        }
    }

    fn is_glued(&self, index: usize, predicate: impl Fn(&TokenKind) -> bool) -> bool {
        let token = &self.tokens[index];
        token.glued && predicate(&token.kind)
    }

    /// Whether the token after the current one can start a clause
    fn operand_follows(&self) -> bool {
        match self.tokens.get(self.position + 1) {
            Some(next) => !matches!(
                next.kind,
                TokenKind::Eof | TokenKind::RightParen | TokenKind::And | TokenKind::Or
            ),
            None => false,
        }
    }

    fn raw_since(&self, start: usize) -> String {
        let end = if self.position == 0 {
            start
        } else {
            self.tokens[self.position - 1].end
        };
        self.lexer.slice(start, end)
    }

    fn current(&self) -> &Token {
        // The token list always ends with Eof and parsing never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }
}

/// Classify a bare word by its wildcards
fn classify_word(text: &str) -> ParseNode {
    if text == "*" {
        return ParseNode::FieldExists;
    }
    if let Some(prefix) = strip_prefix_star(text) {
        return ParseNode::Prefix {
            text: unescape(prefix),
        };
    }
    if has_wildcard(text) {
        return ParseNode::Wildcard {
            pattern: text.to_string(),
        };
    }
    ParseNode::term(unescape(text))
}

/// Text before a trailing unescaped `*` when that is the only wildcard
fn strip_prefix_star(text: &str) -> Option<&str> {
    let rest = text.strip_suffix('*')?;
    let backslashes = rest.chars().rev().take_while(|c| *c == '\\').count();
    if rest.is_empty() || backslashes % 2 == 1 || has_wildcard(rest) {
        return None;
    }
    Some(rest)
}

/// Split phrase text into items on whitespace
fn split_phrase(text: &str) -> Vec<PhraseItem> {
    text.split_whitespace()
        .map(|piece| classify_phrase_piece(&piece.replace("\\\"", "\"")))
        .collect()
}

fn classify_phrase_piece(piece: &str) -> PhraseItem {
    if let Some(index) = unescaped_tilde(piece) {
        let (text, suffix) = (&piece[..index], &piece[index + 1..]);
        if !text.is_empty() && !has_wildcard(text) {
            if suffix.is_empty() {
                return PhraseItem::fuzzy(unescape(text), None);
            }
            if let Some(similarity) = parse_similarity(suffix) {
                return PhraseItem::fuzzy(unescape(text), Some(similarity));
            }
        }
        return PhraseItem::literal(piece);
    }
    if let Some(prefix) = strip_prefix_star(piece) {
        return PhraseItem::prefix(unescape(prefix));
    }
    if piece != "*" && has_wildcard(piece) {
        return PhraseItem::wildcard(piece);
    }
    PhraseItem::literal(piece)
}

fn unescaped_tilde(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '~' => return Some(index),
            _ => {}
        }
    }
    None
}

/// Drop escaping backslashes
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Parse a boost; only finite positive numbers count
fn parse_number(text: &str) -> Option<f32> {
    if !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    text.parse::<f32>().ok().filter(|value| value.is_finite())
}

fn parse_similarity(text: &str) -> Option<f32> {
    parse_number(text).filter(|value| *value >= 0.0)
}
