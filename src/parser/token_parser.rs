//! Base token parser shared by the SQL scanners.
//!
//! Wraps the sqlparser tokenizer (PostgreSQL dialect) with the navigation
//! helpers the index-definition and statement-shape scanners need. String
//! literals, dollar-quoted bodies, quoted identifiers and comments each come
//! out as a single token, so nothing inside them is ever mistaken for a
//! placeholder or keyword.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};

/// Tokenize SQL text with source locations
pub fn tokenize(sql: &str) -> Result<Vec<TokenWithSpan>, String> {
    let dialect = PostgreSqlDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| e.to_string())
}

/// Base token parser with common helper methods.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Create a new TokenParser from a SQL string.
    ///
    /// Returns `None` if tokenization fails (e.g. an unterminated literal).
    pub fn new(sql: &str) -> Option<Self> {
        let tokens = tokenize(sql).ok()?;
        Some(Self { tokens, pos: 0 })
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comment tokens.
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            match &token.token {
                Token::Whitespace(_) => self.advance(),
                _ => break,
            }
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(
            self.current_token().map(|t| &t.token),
            Some(Token::Word(w)) if w.keyword == keyword && w.quote_style.is_none()
        )
    }

    /// Check if current token matches a specific token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        match self.current_token() {
            Some(token) => std::mem::discriminant(&token.token) == std::mem::discriminant(expected),
            None => false,
        }
    }

    /// Advance past the current token if it is the given token type.
    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Advance until the given token type (not consumed) or end of input.
    pub fn skip_to_token(&mut self, target: &Token) {
        while !self.is_at_end() && !self.check_token(target) {
            self.advance();
        }
    }
}

/// Byte offsets of line starts, for mapping tokenizer locations back into text
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    /// Byte offset of a 1-based line/column location (columns count chars)
    pub fn offset(&self, location: Location) -> Option<usize> {
        let line = usize::try_from(location.line).ok()?.checked_sub(1)?;
        let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
        let start = *self.line_starts.get(line)?;
        let rest = &self.text[start..];
        match rest.char_indices().nth(column) {
            Some((i, _)) => Some(start + i),
            None if rest.chars().count() == column => Some(self.text.len()),
            None => None,
        }
    }
}
