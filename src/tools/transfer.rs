//! Table transfer tool.

use super::Tool;
use crate::transfer::{TransferBackend, TransferExecutor};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Transfers a full table from one SQL database to another.
pub struct TransferTableTool<B: TransferBackend> {
    executor: Arc<TransferExecutor<B>>,
}

impl<B: TransferBackend> TransferTableTool<B> {
    pub fn new(executor: Arc<TransferExecutor<B>>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<B: TransferBackend + 'static> Tool for TransferTableTool<B> {
    fn name(&self) -> &'static str {
        "transfer_table_data"
    }

    fn description(&self) -> &'static str {
        "Transfers a full table from one SQL database to another. Input should be in format: \
         'transfer [schema].[table] from [source_db] to [dest_db]'. \
         Example: 'transfer dbo.DB_EVENTS from dw_production to TempObjDB'"
    }

    async fn invoke(&self, input: &str) -> String {
        let outcome = self.executor.run(input).await;
        info!("Transfer tool finished (success: {})", outcome.is_success());
        outcome.to_string()
    }
}
