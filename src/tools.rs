//! Tools exposed to the conversational agent.
//!
//! Every tool takes one free-text string and returns one free-text string:
//!
//! - `get_current_time`: Current local time
//! - `say_hello`: Greet a person by name
//! - `transfer_table_data`: Copy a full table between two catalogs

mod clock;
mod greeting;
mod transfer;

pub use clock::CurrentTimeTool;
pub use greeting::SayHelloTool;
pub use transfer::TransferTableTool;

use crate::constants::LOG_TEXT_TRUNCATE_LENGTH;
use crate::database::truncate_for_log;
use crate::error::BotError;
use crate::transfer::{TransferBackend, TransferExecutor};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A capability the agent can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &'static str;

    /// Description shown to the agent when it chooses a tool.
    fn description(&self) -> &'static str;

    /// Run the tool. Failures are reported inside the returned text.
    async fn invoke(&self, input: &str) -> String;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

/// Tools addressable by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names and descriptions of every registered tool, ordered by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name(),
                description: tool.description(),
            })
            .collect()
    }

    /// Invoke a tool by name.
    pub async fn invoke(&self, name: &str, input: &str) -> Result<String, BotError> {
        let tool = self
            .get(name)
            .ok_or_else(|| BotError::ToolNotFound(name.to_string()))?;

        debug!(
            "Invoking tool {} with input: {}",
            name,
            truncate_for_log(input, LOG_TEXT_TRUNCATE_LENGTH)
        );
        Ok(tool.invoke(input).await)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registry holding the clock, greeting and transfer tools.
pub fn default_registry<B>(executor: Arc<TransferExecutor<B>>) -> ToolRegistry
where
    B: TransferBackend + 'static,
{
    let mut registry = ToolRegistry::new();
    registry.register(CurrentTimeTool);
    registry.register(SayHelloTool);
    registry.register(TransferTableTool::new(executor));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Repeats its input."
        }

        async fn invoke(&self, input: &str) -> String {
            input.to_string()
        }
    }

    #[tokio::test]
    async fn test_invoke_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.invoke("echo", "ping").await.unwrap(), "ping");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        let err = registry.invoke("missing", "").await.unwrap_err();
        assert!(matches!(err, BotError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_default_registry() {
        use crate::config::{AuthConfig, DatabaseConfig};
        use crate::database::SqlServerBackend;

        let backend = SqlServerBackend::new(Arc::new(DatabaseConfig {
            server: "unreachable.invalid".to_string(),
            auth: AuthConfig::SqlServer {
                username: "u".to_string(),
                password: "p".to_string(),
            },
            encrypt: true,
            trust_server_certificate: true,
            application_name: "test".to_string(),
        }));
        let registry = default_registry(Arc::new(TransferExecutor::new(backend)));

        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["get_current_time", "say_hello", "transfer_table_data"]);

        // Unparseable commands are answered without touching the server
        let reply = registry
            .invoke("transfer_table_data", "please move data")
            .await
            .unwrap();
        assert!(reply.starts_with("Error: Could not parse the transfer command."));
    }

    #[test]
    fn test_descriptors_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(SayHelloTool);
        registry.register(CurrentTimeTool);
        registry.register(EchoTool);

        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["echo", "get_current_time", "say_hello"]);
    }
}
