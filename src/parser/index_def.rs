//! Token-based parsing of catalog index definitions
//!
//! PostgreSQL reports each index as reconstructed DDL (`pg_indexes.indexdef`):
//!
//! ```sql
//! CREATE UNIQUE INDEX users_email_key ON public.users USING btree (email)
//! CREATE INDEX posts_author_idx ON public.posts USING btree (author_id, created_at DESC)
//! CREATE INDEX users_name_idx ON public.users USING btree ("Display Name" text_pattern_ops)
//! CREATE INDEX users_lower_idx ON public.users USING btree (lower(email))
//! ```
//!
//! Only the key column list is extracted. INCLUDE, WITH and WHERE clauses
//! follow it and are ignored.

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::identifier_utils::quote_identifier;
use super::token_parser::{LineIndex, TokenParser};

/// Extract the key column list from an index definition.
///
/// - Quoted identifiers are kept verbatim, quotes included.
/// - Unquoted names drop trailing sort order, collation and operator class.
/// - Expression entries (`lower(email)`) are kept as their source text.
///
/// Returns `None` if the definition has no parenthesized column list.
pub fn parse_index_columns(definition: &str) -> Option<Vec<String>> {
    let mut parser = TokenParser::new(definition)?;
    let index = LineIndex::new(definition);

    // The key list is the first parenthesis after ON <table> [USING <method>]
    while !parser.is_at_end() && !parser.check_keyword(Keyword::ON) {
        parser.advance();
    }
    parser.skip_to_token(&Token::LParen);
    parser.expect_token(&Token::LParen)?;

    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut entry_start: Option<usize> = None;

    while let Some(token) = parser.current_token() {
        let separator = depth == 0 && matches!(token.token, Token::RParen | Token::Comma);
        if entry_start.is_none() && !separator && !matches!(token.token, Token::Whitespace(_)) {
            entry_start = Some(parser.pos());
        }

        match &token.token {
            Token::LParen => depth += 1,
            Token::RParen if depth == 0 => {
                if let Some(start) = entry_start.take() {
                    columns.push(entry_column(&parser, &index, definition, start, parser.pos()));
                }
                return Some(columns).filter(|c| !c.is_empty());
            }
            Token::RParen => depth -= 1,
            Token::Comma if depth == 0 => {
                if let Some(start) = entry_start.take() {
                    columns.push(entry_column(&parser, &index, definition, start, parser.pos()));
                }
            }
            _ => {}
        }
        parser.advance();
    }

    // Unbalanced parentheses
    None
}

/// Column name for the tokens in `start..end` of one list entry
fn entry_column(
    parser: &TokenParser,
    index: &LineIndex<'_>,
    definition: &str,
    start: usize,
    end: usize,
) -> String {
    let tokens = &parser.tokens()[start..end];
    let next_significant = tokens
        .iter()
        .skip(1)
        .find(|t| !matches!(t.token, Token::Whitespace(_)))
        .map(|t| &t.token);

    match (&tokens[0].token, next_significant) {
        (Token::Word(w), next) if !matches!(next, Some(Token::LParen)) => match w.quote_style {
            Some('"') => quote_identifier(&w.value),
            _ => w.value.clone(),
        },
        _ => raw_text(parser, index, definition, start, end),
    }
}

fn raw_text(
    parser: &TokenParser,
    index: &LineIndex<'_>,
    definition: &str,
    start: usize,
    end: usize,
) -> String {
    let tokens = parser.tokens();
    let from = index.offset(tokens[start].span.start);
    let to = tokens.get(end).and_then(|t| index.offset(t.span.start));
    match (from, to) {
        (Some(from), Some(to)) if from <= to => definition[from..to].trim().to_string(),
        _ => tokens[start..end]
            .iter()
            .map(|t| t.token.to_string())
            .collect::<String>()
            .trim()
            .to_string(),
    }
}
