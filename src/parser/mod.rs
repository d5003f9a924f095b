//! Annotated query parsing and SQL token scanning

mod annotation_parser;
mod identifier_utils;
mod index_def;
mod sql_scan;
mod token_parser;

pub use annotation_parser::{parse_queries, parse_query_file, parse_query_files, validate_shape};
pub use identifier_utils::{is_valid_query_name, quote_identifier};
pub use index_def::parse_index_columns;
pub use sql_scan::{
    extract_parameters, find_placeholders, is_select_shaped, leading_keyword,
    strip_trailing_terminator, substitute_placeholders, PlaceholderSpan,
};
