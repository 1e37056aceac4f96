//! Transfer execution against a database backend.
//!
//! The executor never returns an error to its caller: every path ends in a
//! [`TransferOutcome`] that renders to the text the agent shows the user.

use super::parser::{CommandParser, ParseError, RegexCommandParser};
use super::request::TransferRequest;
use crate::constants::LOG_TEXT_TRUNCATE_LENGTH;
use crate::database::truncate_for_log;
use crate::error::BotError;
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Opens connections to a catalog.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Connection type handed out by this backend.
    type Session: TransferSession;

    /// Open a connection whose default catalog is `catalog`.
    async fn open(&self, catalog: &str) -> Result<Self::Session, BotError>;
}

/// One open connection used for a single transfer.
#[async_trait]
pub trait TransferSession: Send {
    /// Whether a user table with the given qualified name exists.
    async fn table_exists(&mut self, qualified_name: &str) -> Result<bool, BotError>;

    /// Start an explicit transaction.
    async fn begin(&mut self) -> Result<(), BotError>;

    /// Run one statement, returning the rows it affected.
    async fn execute(&mut self, statement: &str) -> Result<u64, BotError>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<(), BotError>;

    /// Close the connection, rolling back anything left uncommitted.
    async fn release(self) -> Result<(), BotError>;
}

/// Result of one transfer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The destination was created and committed.
    Completed {
        source_name: String,
        source_database: String,
        destination_name: String,
        rows_copied: u64,
    },

    /// The command text did not parse; no connection was opened.
    Rejected(ParseError),

    /// The destination already existed; nothing was copied.
    TargetExists { destination_database: String },

    /// A driver-level failure (connect, login, permission, statement).
    DatabaseFailure(String),

    /// Any other failure.
    Unexpected(String),
}

impl TransferOutcome {
    /// Whether the copy was committed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    fn from_error(error: BotError) -> Self {
        if error.is_database_error() {
            Self::DatabaseFailure(error.to_string())
        } else {
            Self::Unexpected(error.to_string())
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                source_name,
                source_database,
                destination_name,
                ..
            } => write!(
                f,
                "Table transfer completed successfully: {} from {} to {}",
                source_name, source_database, destination_name
            ),
            Self::Rejected(e) => write!(f, "{}", e),
            Self::TargetExists {
                destination_database,
            } => write!(
                f,
                "Error: The target table already exists in '{}'.",
                destination_database
            ),
            Self::DatabaseFailure(message) => {
                write!(f, "An error occurred during data transfer: {}", message)
            }
            Self::Unexpected(message) => write!(f, "An unexpected error occurred: {}", message),
        }
    }
}

/// Parses transfer commands and runs them against a backend.
pub struct TransferExecutor<B: TransferBackend> {
    backend: B,
    parser: Box<dyn CommandParser>,
}

impl<B: TransferBackend> TransferExecutor<B> {
    /// Create an executor using the regular-expression grammar.
    pub fn new(backend: B) -> Self {
        Self::with_parser(backend, Box::new(RegexCommandParser::new()))
    }

    /// Create an executor with a custom command parser.
    pub fn with_parser(backend: B, parser: Box<dyn CommandParser>) -> Self {
        Self { backend, parser }
    }

    /// Get a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parse a free-text command and run it.
    pub async fn run(&self, command: &str) -> TransferOutcome {
        match self.parser.parse(command) {
            Ok(request) => self.execute(&request).await,
            Err(e) => {
                info!(
                    "Rejected transfer command: {}",
                    truncate_for_log(command, LOG_TEXT_TRUNCATE_LENGTH)
                );
                TransferOutcome::Rejected(e)
            }
        }
    }

    /// Run an already parsed request.
    pub async fn execute(&self, request: &TransferRequest) -> TransferOutcome {
        let start = Instant::now();
        info!(
            "Transferring {} from {} to {}",
            request.source_name(),
            request.source_database(),
            request.destination_name()
        );

        let mut session = match self.backend.open(request.source_database()).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to open connection to {}: {}", request.source_database(), e);
                return TransferOutcome::from_error(e);
            }
        };

        let outcome = match copy_table(&mut session, request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Transfer of {} failed: {}", request.source_name(), e);
                TransferOutcome::from_error(e)
            }
        };

        if let Err(e) = session.release().await {
            warn!("Failed to release connection cleanly: {}", e);
        }

        debug!(
            "Transfer finished in {} ms (success: {})",
            start.elapsed().as_millis(),
            outcome.is_success()
        );
        outcome
    }
}

/// Check the destination, copy and commit on an open session.
async fn copy_table<S: TransferSession>(
    session: &mut S,
    request: &TransferRequest,
) -> Result<TransferOutcome, BotError> {
    if session.table_exists(request.destination_name()).await? {
        info!("Destination {} already exists", request.destination_name());
        return Ok(TransferOutcome::TargetExists {
            destination_database: request.destination_database().to_string(),
        });
    }

    session.begin().await?;
    let rows_copied = session.execute(&request.select_into_sql()).await?;
    session.commit().await?;

    info!(
        "Copied {} row(s) into {}",
        rows_copied,
        request.destination_name()
    );

    Ok(TransferOutcome::Completed {
        source_name: request.source_name().to_string(),
        source_database: request.source_database().to_string(),
        destination_name: request.destination_name().to_string(),
        rows_copied,
    })
}
