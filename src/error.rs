//! Error types for the Teams database agent.
//!
//! SQL Server error numbers are mapped to semantic variants so callers can
//! tell driver-level failures apart from everything else.

use thiserror::Error;

/// Domain errors raised inside the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Database not found
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Object not found (table, view, ...)
    #[error("{object_type} not found: {name}")]
    ObjectNotFound { object_type: String, name: String },

    /// Object already exists
    #[error("Object already exists: {0}")]
    ObjectExists(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Statement execution error
    #[error("Query execution error: {message}")]
    QueryExecution {
        message: String,
        sql_error_code: Option<i32>,
    },

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// No tool registered under the requested name
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Agent failed to produce a reply
    #[error("Agent error: {0}")]
    Agent(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an object not found error.
    pub fn object_not_found(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            object_type: object_type.into(),
            name: name.into(),
        }
    }

    /// Create a permission denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a statement execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a statement execution error carrying the SQL Server error number.
    pub fn query_error_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create an agent error.
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error originated in the database layer (connectivity,
    /// login, permissions, syntax, constraints).
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::Authentication(_)
                | Self::DatabaseNotFound(_)
                | Self::ObjectNotFound { .. }
                | Self::ObjectExists(_)
                | Self::PermissionDenied(_)
                | Self::QueryExecution { .. }
                | Self::ConstraintViolation(_)
        )
    }

    /// SQL Server error number, when the error came from the server.
    pub fn sql_error_code(&self) -> Option<i32> {
        match self {
            Self::QueryExecution { sql_error_code, .. } => *sql_error_code,
            _ => None,
        }
    }
}

/// Map SQL Server error numbers to semantic error variants.
pub fn from_sql_error(code: i32, message: &str) -> BotError {
    match code {
        // Authentication errors
        18456 => BotError::auth(format!("Login failed: {}", message)),

        // Database errors
        4060 | 911 => BotError::DatabaseNotFound(message.to_string()),

        // Object not found
        208 => BotError::object_not_found("Object", message),

        // Object already exists (SELECT INTO / CREATE TABLE race)
        2714 => BotError::ObjectExists(message.to_string()),

        // Permission errors
        229 | 230 => BotError::permission_denied(message),
        262 => BotError::permission_denied(format!("CREATE permission denied: {}", message)),

        // Constraint violations
        547 => BotError::ConstraintViolation(message.to_string()),
        2601 | 2627 => BotError::ConstraintViolation(format!("Duplicate key: {}", message)),

        // Syntax errors
        102 => BotError::query_error_with_code(format!("Syntax error: {}", message), code),

        // Deadlock
        1205 => BotError::query_error_with_code(
            "Transaction was deadlocked and has been rolled back",
            code,
        ),

        _ => BotError::query_error_with_code(message, code),
    }
}

impl From<tiberius::error::Error> for BotError {
    fn from(e: tiberius::error::Error) -> Self {
        use tiberius::error::Error;

        match &e {
            Error::Server(token) => from_sql_error(token.code() as i32, token.message()),
            Error::Io { .. } => BotError::connection(format!("IO error: {}", e)),
            Error::Tls(_) => BotError::connection(format!("TLS error: {}", e)),
            Error::Protocol(_) => BotError::connection(format!("Protocol error: {}", e)),
            Error::Routing { host, port } => BotError::connection(format!(
                "Server requested routing to {}:{}",
                host, port
            )),
            Error::Conversion(_) => BotError::query_error(format!("Type conversion error: {}", e)),
            _ => BotError::query_error(e.to_string()),
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::ConnectionRefused => BotError::connection_with_source("Connection refused", e),
            ErrorKind::ConnectionReset => BotError::connection_with_source("Connection reset", e),
            ErrorKind::TimedOut => BotError::connection_with_source("Connection timed out", e),
            _ => BotError::connection_with_source(format!("IO error: {}", e), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_mapping() {
        let err = from_sql_error(18456, "Login failed for user 'test'");
        assert!(matches!(err, BotError::Authentication(_)));

        let err = from_sql_error(208, "Invalid object name 'foo'");
        assert!(matches!(err, BotError::ObjectNotFound { .. }));

        let err = from_sql_error(229, "SELECT permission denied");
        assert!(matches!(err, BotError::PermissionDenied(_)));

        let err = from_sql_error(2714, "There is already an object named 'X'");
        assert!(matches!(err, BotError::ObjectExists(_)));
    }

    #[test]
    fn test_unknown_code_keeps_number() {
        let err = from_sql_error(50000, "custom raise");
        assert_eq!(err.sql_error_code(), Some(50000));
        assert!(err.to_string().contains("custom raise"));
    }

    #[test]
    fn test_database_error_classification() {
        assert!(BotError::connection("refused").is_database_error());
        assert!(from_sql_error(102, "Incorrect syntax").is_database_error());
        assert!(!BotError::config("missing").is_database_error());
        assert!(!BotError::internal("boom").is_database_error());
        assert!(!BotError::ToolNotFound("x".into()).is_database_error());
    }

    #[test]
    fn test_io_error_is_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BotError::from(io);
        assert!(matches!(err, BotError::Connection { .. }));
        assert!(err.is_database_error());
    }
}
