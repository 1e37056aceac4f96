//! SQL Server backend for table transfers.
//!
//! Every transfer gets its own dedicated connection, opened on the source
//! catalog and closed when the transfer ends. No pool is kept between calls.

use super::auth::{create_connection, RawConnection};
use crate::config::DatabaseConfig;
use crate::error::BotError;
use crate::transfer::{TransferBackend, TransferSession, TABLE_EXISTS_SQL};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens one connection per transfer.
#[derive(Debug, Clone)]
pub struct SqlServerBackend {
    db_config: Arc<DatabaseConfig>,
}

impl SqlServerBackend {
    /// Create a backend from database configuration.
    pub fn new(db_config: Arc<DatabaseConfig>) -> Self {
        Self { db_config }
    }

    /// Get the database configuration.
    pub fn db_config(&self) -> &DatabaseConfig {
        &self.db_config
    }
}

#[async_trait]
impl TransferBackend for SqlServerBackend {
    type Session = SqlServerSession;

    async fn open(&self, catalog: &str) -> Result<SqlServerSession, BotError> {
        let client = create_connection(&self.db_config, catalog).await?;
        Ok(SqlServerSession {
            client,
            in_transaction: false,
        })
    }
}

/// A dedicated connection held for one transfer.
pub struct SqlServerSession {
    client: RawConnection,
    in_transaction: bool,
}

impl SqlServerSession {
    async fn run_batch(&mut self, sql: &str) -> Result<(), BotError> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

#[async_trait]
impl TransferSession for SqlServerSession {
    async fn table_exists(&mut self, qualified_name: &str) -> Result<bool, BotError> {
        let row = self
            .client
            .query(TABLE_EXISTS_SQL, &[&qualified_name])
            .await?
            .into_row()
            .await?;

        let flag = row.and_then(|r| r.get::<i32, _>(0)).unwrap_or(0);
        debug!("Table {} exists: {}", qualified_name, flag);
        Ok(flag == 1)
    }

    async fn begin(&mut self) -> Result<(), BotError> {
        self.run_batch("BEGIN TRANSACTION").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> Result<u64, BotError> {
        let result = self.client.execute(statement, &[]).await?;
        Ok(result.rows_affected().iter().sum())
    }

    async fn commit(&mut self) -> Result<(), BotError> {
        self.run_batch("COMMIT TRANSACTION").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn release(mut self) -> Result<(), BotError> {
        if self.in_transaction {
            warn!("Rolling back uncommitted transfer transaction");
            if let Err(e) = self
                .run_batch("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION")
                .await
            {
                warn!("Rollback before close failed: {}", e);
            }
        }

        self.client.close().await?;
        debug!("Transfer connection closed");
        Ok(())
    }
}
