//! Lexer for query string syntax
//!
//! Splits Lucene-style query strings into tokens. Lexing never fails: any
//! character sequence becomes some token, and the parser decides what is
//! literal text. Each token records whether it touches the previous token,
//! because `foo^2` and `foo ^2` mean different things.

/// Token types for query string parsing
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Unquoted text, escapes kept as written
    Word(String),
    /// Text between double quotes, escapes kept as written
    Phrase { text: String, terminated: bool },
    /// Pattern between slashes
    Regex(String),

    /// `AND` or `&&`
    And,
    /// `OR` or `||`
    Or,
    /// `NOT` or `!`
    Not,
    /// Required clause prefix
    Plus,
    /// Excluded clause prefix
    Minus,

    /// Boost suffix
    Caret,
    /// Fuzzy or slop suffix
    Tilde,
    /// Field separator (field:value)
    Colon,
    /// Separates fields in a field list
    Comma,

    /// Left parenthesis (grouping)
    LeftParen,
    /// Right parenthesis (grouping)
    RightParen,

    /// End of input
    Eof,
}

/// A token with its character span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Char index of the first character
    pub start: usize,
    /// Char index one past the last character
    pub end: usize,
    /// No whitespace separates this token from the previous one
    pub glued: bool,
}

impl Token {
    /// Check if this token can be part of a word run such as `a,b` or `acprof:oso`
    pub fn is_word_like(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Word(_) | TokenKind::Colon | TokenKind::Comma
        )
    }
}

/// Lexer for tokenizing query strings
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the whole input; the last token is always [`TokenKind::Eof`]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Source text between two char indices
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.input.len());
        let start = start.min(end);
        self.input[start..end].iter().collect()
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;
        let kind = self.read_kind();
        let glued =
            kind != TokenKind::Eof && start > 0 && !self.input[start - 1].is_whitespace();
        Token {
            kind,
            start,
            end: self.position,
            glued,
        }
    }

    fn read_kind(&mut self) -> TokenKind {
        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return TokenKind::Eof,
        };

        match ch {
            '"' => {
                self.advance();
                self.read_phrase()
            }
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '^' => self.single(TokenKind::Caret),
            '~' => self.single(TokenKind::Tilde),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '!' => self.single(TokenKind::Not),
            '&' if self.peek() == Some('&') => self.double(TokenKind::And),
            '|' if self.peek() == Some('|') => self.double(TokenKind::Or),
            '/' => match self.read_regex() {
                Some(pattern) => TokenKind::Regex(pattern),
                None => self.read_word(),
            },
            _ => self.read_word(),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        self.advance();
        kind
    }

    /// Read a phrase body; the opening quote is already consumed
    fn read_phrase(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            match ch {
                '\\' => {
                    text.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char() {
                        text.push(escaped);
                        self.advance();
                    }
                }
                '"' => {
                    self.advance();
                    return TokenKind::Phrase {
                        text,
                        terminated: true,
                    };
                }
                _ => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
        TokenKind::Phrase {
            text,
            terminated: false,
        }
    }

    /// Read `/pattern/` if a closing slash exists, leaving the position
    /// untouched otherwise
    fn read_regex(&mut self) -> Option<String> {
        let mut index = self.position + 1;
        let mut pattern = String::new();
        while index < self.input.len() {
            match self.input[index] {
                '\\' if index + 1 < self.input.len() => {
                    pattern.push('\\');
                    pattern.push(self.input[index + 1]);
                    index += 2;
                }
                '/' => {
                    if pattern.is_empty() {
                        return None;
                    }
                    self.position = index + 1;
                    return Some(pattern);
                }
                ch => {
                    pattern.push(ch);
                    index += 1;
                }
            }
        }
        None
    }

    /// Read a word; the current character is always consumed
    fn read_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(ch) = self.current_char() {
            if !word.is_empty() && !self.is_word_char(ch) {
                break;
            }
            word.push(ch);
            self.advance();
            if ch == '\\' {
                if let Some(escaped) = self.current_char() {
                    word.push(escaped);
                    self.advance();
                }
            }
        }

        match word.as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            _ => TokenKind::Word(word),
        }
    }

    fn is_word_char(&self, ch: char) -> bool {
        match ch {
            c if c.is_whitespace() => false,
            '"' | '(' | ')' | '^' | '~' | ':' | ',' => false,
            '&' => self.peek() != Some('&'),
            '|' => self.peek() != Some('|'),
            _ => true,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }
}
