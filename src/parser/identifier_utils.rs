//! Identifier handling: PostgreSQL quoting and generated-name validation.
//!
//! # Examples
//!
//! ```ignore
//! assert_eq!(quote_identifier("has\"quote"), "\"has\"\"quote\"");
//! assert!(is_valid_query_name("GetUser"));
//! assert!(!is_valid_query_name("match"));
//! ```

/// Rust keywords (strict and reserved) that cannot name a generated function.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Wraps an identifier in double quotes, doubling embedded quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Whether `name` can be used verbatim as an identifier in generated Rust code.
///
/// ASCII letters, digits and underscores, not starting with a digit, not a
/// lone underscore, and not a keyword.
pub fn is_valid_query_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    name != "_" && !RUST_KEYWORDS.contains(&name)
}
