//! Quote- and comment-aware scanning of statement bodies
//!
//! Placeholders are recognised from the token stream rather than from raw
//! text, so `'$1'`, `"$1"`, `$$ ... $1 ... $$` and `-- $1` never count.

use std::collections::BTreeSet;

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::token_parser::{tokenize, LineIndex, TokenParser};
use crate::model::Parameter;

/// A positional placeholder located in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpan {
    pub number: u32,
    /// Byte range of the `$N` token
    pub start: usize,
    pub end: usize,
}

/// `$N` -> N; anything else (`$name`, `$1a`) is not a positional placeholder
fn placeholder_number(text: &str) -> Option<u32> {
    let digits = text.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Find every positional placeholder outside literals, quoted identifiers and comments
pub fn find_placeholders(sql: &str) -> Result<Vec<PlaceholderSpan>, String> {
    let tokens = tokenize(sql)?;
    let index = LineIndex::new(sql);

    let mut spans = Vec::new();
    for token in &tokens {
        let Token::Placeholder(text) = &token.token else {
            continue;
        };
        let Some(number) = placeholder_number(text) else {
            continue;
        };
        let start = index
            .offset(token.span.start)
            .ok_or_else(|| format!("placeholder {} has no source position", text))?;
        spans.push(PlaceholderSpan {
            number,
            start,
            end: start + text.len(),
        });
    }
    Ok(spans)
}

/// Distinct placeholder numbers, ascending, one unresolved [`Parameter`] each
///
/// Repeated occurrences of the same `$N` collapse to a single parameter.
pub fn extract_parameters(sql: &str) -> Result<Vec<Parameter>, String> {
    if sql.trim().is_empty() {
        return Ok(Vec::new());
    }
    let numbers: BTreeSet<u32> = find_placeholders(sql)?
        .into_iter()
        .map(|p| p.number)
        .collect();
    Ok(numbers.into_iter().map(Parameter::unresolved).collect())
}

/// Replace every placeholder outside quoted content with `replacement`
///
/// Whole tokens are replaced by byte span, so `$1` can never match inside
/// `$10`. Rewriting runs from the end of the text backwards so earlier
/// offsets stay valid.
pub fn substitute_placeholders(sql: &str, replacement: &str) -> Result<String, String> {
    let mut spans = find_placeholders(sql)?;
    spans.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = sql.to_string();
    for span in spans {
        result.replace_range(span.start..span.end, replacement);
    }
    Ok(result)
}

/// First keyword of a statement, skipping comments and opening parentheses
pub fn leading_keyword(sql: &str) -> Option<Keyword> {
    let mut parser = TokenParser::new(sql)?;
    loop {
        parser.skip_whitespace();
        if parser.expect_token(&Token::LParen).is_none() {
            break;
        }
    }
    match parser.current_token().map(|t| &t.token) {
        Some(Token::Word(w)) if w.quote_style.is_none() => Some(w.keyword),
        _ => None,
    }
}

/// Whether a statement produces a result set the way a SELECT does
///
/// Common table expressions count, as do bare VALUES / TABLE queries.
pub fn is_select_shaped(sql: &str) -> bool {
    matches!(
        leading_keyword(sql),
        Some(Keyword::SELECT | Keyword::WITH | Keyword::VALUES | Keyword::TABLE)
    )
}

/// Statement text with trailing semicolons and whitespace removed
pub fn strip_trailing_terminator(sql: &str) -> &str {
    let mut trimmed = sql.trim_end();
    while let Some(rest) = trimmed.strip_suffix(';') {
        trimmed = rest.trim_end();
    }
    trimmed
}
