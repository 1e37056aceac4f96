//! SQL Server identifier escaping utilities.
//!
//! Uses SQL Server's bracket notation `[identifier]` to safely escape identifiers.

use crate::error::BotError;

/// Maximum length for SQL Server identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Escape a single identifier part using bracket notation.
///
/// Embedded right brackets are doubled, so the result is always a single
/// quoted part regardless of input.
///
/// # Examples
///
/// ```
/// use teams_db_agent::security::escape_identifier;
///
/// assert_eq!(escape_identifier("DB_EVENTS").unwrap(), "[DB_EVENTS]");
/// assert_eq!(escape_identifier("odd]name").unwrap(), "[odd]]name]");
/// ```
pub fn escape_identifier(identifier: &str) -> Result<String, BotError> {
    validate_identifier(identifier)?;
    Ok(format!("[{}]", identifier.replace(']', "]]")))
}

/// Build a dot-separated qualified name from identifier parts.
///
/// ```
/// use teams_db_agent::security::qualify;
///
/// assert_eq!(
///     qualify(&["TempObjDB", "dbo", "DB_EVENTS"]).unwrap(),
///     "[TempObjDB].[dbo].[DB_EVENTS]"
/// );
/// ```
pub fn qualify(parts: &[&str]) -> Result<String, BotError> {
    if parts.is_empty() {
        return Err(BotError::invalid_input("Qualified name needs at least one part"));
    }

    let escaped = parts
        .iter()
        .map(|part| escape_identifier(part))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(escaped.join("."))
}

/// Validate that an identifier part is non-empty, fits SQL Server's limit and
/// carries no statement-breaking sequences.
pub fn validate_identifier(identifier: &str) -> Result<(), BotError> {
    if identifier.trim().is_empty() {
        return Err(BotError::invalid_input("Identifier cannot be empty"));
    }

    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(BotError::invalid_input(format!(
            "Identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }

    let dangerous_patterns = [
        "--",   // SQL comment
        "/*",   // Multi-line comment start
        "*/",   // Multi-line comment end
        ";",    // Statement separator
        "'",    // String delimiter
        "\"",   // Quoted identifier delimiter
        "\\",   // Escape character
        "\x00", // Null byte
    ];

    for pattern in &dangerous_patterns {
        if identifier.contains(pattern) {
            return Err(BotError::invalid_input(format!(
                "Identifier contains forbidden character sequence: {}",
                pattern
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_simple_identifier() {
        assert_eq!(escape_identifier("Users").unwrap(), "[Users]");
        assert_eq!(escape_identifier("dw_production").unwrap(), "[dw_production]");
    }

    #[test]
    fn test_escape_with_brackets() {
        assert_eq!(escape_identifier("Table]1").unwrap(), "[Table]]1]");
    }

    #[test]
    fn test_qualify_two_and_three_parts() {
        assert_eq!(qualify(&["dbo", "DB_EVENTS"]).unwrap(), "[dbo].[DB_EVENTS]");
        assert_eq!(
            qualify(&["TempObjDB", "dbo", "DB_EVENTS"]).unwrap(),
            "[TempObjDB].[dbo].[DB_EVENTS]"
        );
        assert!(qualify(&[]).is_err());
    }

    #[test]
    fn test_empty_identifier() {
        assert!(escape_identifier("").is_err());
        assert!(escape_identifier("   ").is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Users").is_ok());
        assert!(validate_identifier("my_table").is_ok());

        assert!(validate_identifier("Users--").is_err());
        assert!(validate_identifier("Users;DROP").is_err());
        assert!(validate_identifier("Users'").is_err());
        assert!(validate_identifier(&"x".repeat(129)).is_err());
    }
}
