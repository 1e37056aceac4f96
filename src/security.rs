//! Identifier validation and quoting for generated SQL.

mod identifiers;

pub use identifiers::{escape_identifier, qualify, validate_identifier, MAX_IDENTIFIER_LENGTH};
