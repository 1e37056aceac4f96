//! The validated description of one table copy.

use crate::constants::DESTINATION_SCHEMA;
use crate::error::BotError;
use crate::security::qualify;

/// Existence check for a user table; `@P1` is the three-part destination name.
pub const TABLE_EXISTS_SQL: &str =
    "IF OBJECT_ID(@P1, N'U') IS NOT NULL SELECT 1 ELSE SELECT 0;";

/// One table copy between two catalogs on the same server.
///
/// Built only through [`TransferRequest::new`], so every name is non-empty
/// and the qualified names are always well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source_schema: String,
    source_table: String,
    source_database: String,
    destination_database: String,
    destination_schema: String,
    destination_table: String,

    /// `[schema].[table]`, resolved inside the source catalog.
    source_name: String,

    /// `[database].[dbo].[table]`.
    destination_name: String,
}

impl TransferRequest {
    /// Create a request. The destination schema is always `dbo` and the
    /// destination table always keeps the source table's name.
    pub fn new(
        source_schema: &str,
        source_table: &str,
        source_database: &str,
        destination_database: &str,
    ) -> Result<Self, BotError> {
        let source_name = qualify(&[source_schema, source_table])?;
        let destination_name = qualify(&[destination_database, DESTINATION_SCHEMA, source_table])?;
        // The source catalog is only used as a connection target.
        qualify(&[source_database])?;

        Ok(Self {
            source_schema: source_schema.to_string(),
            source_table: source_table.to_string(),
            source_database: source_database.to_string(),
            destination_database: destination_database.to_string(),
            destination_schema: DESTINATION_SCHEMA.to_string(),
            destination_table: source_table.to_string(),
            source_name,
            destination_name,
        })
    }

    pub fn source_schema(&self) -> &str {
        &self.source_schema
    }

    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    pub fn source_database(&self) -> &str {
        &self.source_database
    }

    pub fn destination_database(&self) -> &str {
        &self.destination_database
    }

    pub fn destination_schema(&self) -> &str {
        &self.destination_schema
    }

    pub fn destination_table(&self) -> &str {
        &self.destination_table
    }

    /// Source table name qualified by schema, e.g. `[dbo].[DB_EVENTS]`.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Destination name qualified by catalog and schema,
    /// e.g. `[TempObjDB].[dbo].[DB_EVENTS]`.
    pub fn destination_name(&self) -> &str {
        &self.destination_name
    }

    /// The single statement that creates the destination and copies every row.
    pub fn select_into_sql(&self) -> String {
        format!(
            "SELECT * INTO {} FROM {};",
            self.destination_name, self.source_name
        )
    }
}
