//! Free-text transfer command parsing.
//!
//! Grammar (case-insensitive, first match anywhere in the text):
//!
//! ```text
//! transfer [<schema>.]<table> from <source_db> to <dest_db>
//! ```

use super::request::TransferRequest;
use crate::constants::DEFAULT_SCHEMA;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Compiled transfer grammar.
static TRANSFER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)transfer\s+(?:(\w+)\.)?(\w+)\s+from\s+(\w+)\s+to\s+(\w+)")
        .unwrap_or_else(|e| panic!("Internal error: invalid transfer pattern: {}", e))
});

/// Why a command could not be turned into a [`TransferRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing in the text matched the grammar.
    #[error(
        "Error: Could not parse the transfer command. \
         Use format: 'transfer [schema].[table] from [source_db] to [dest_db]'"
    )]
    NoMatch,

    /// The grammar matched but a name was unusable.
    #[error(
        "Error: Could not parse the transfer command: {0}. \
         Use format: 'transfer [schema].[table] from [source_db] to [dest_db]'"
    )]
    InvalidName(String),
}

/// Turns free text into a transfer request.
pub trait CommandParser: Send + Sync {
    fn parse(&self, input: &str) -> Result<TransferRequest, ParseError>;
}

/// The regular-expression grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCommandParser;

impl RegexCommandParser {
    pub fn new() -> Self {
        Self
    }
}

impl CommandParser for RegexCommandParser {
    fn parse(&self, input: &str) -> Result<TransferRequest, ParseError> {
        let captures = TRANSFER_PATTERN
            .captures(input)
            .ok_or(ParseError::NoMatch)?;

        let schema = captures.get(1).map_or(DEFAULT_SCHEMA, |m| m.as_str());
        // Groups 2-4 are mandatory in the pattern.
        let (Some(table), Some(source), Some(destination)) =
            (captures.get(2), captures.get(3), captures.get(4))
        else {
            return Err(ParseError::NoMatch);
        };

        TransferRequest::new(
            schema,
            table.as_str(),
            source.as_str(),
            destination.as_str(),
        )
        .map_err(|e| ParseError::InvalidName(e.to_string()))
    }
}
