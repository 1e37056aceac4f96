//! Conversational agent that turns user text into tool calls.

use crate::constants::TRANSFER_EXAMPLE;
use crate::error::BotError;
use crate::history::ChatMessage;
use crate::tools::ToolRegistry;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TRANSFER_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btransfer\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid transfer intent pattern: {}", e))
});

static GREETING_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:say\s+)?hello(?:\s+to)?\s+(.+?)[\s.!?]*$")
        .unwrap_or_else(|e| panic!("Internal error: invalid greeting pattern: {}", e))
});

static TIME_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:time|clock)\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid time intent pattern: {}", e))
});

/// Answers one user message given the prior turns of its conversation.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn respond(&self, input: &str, history: &[ChatMessage]) -> Result<String, BotError>;
}

/// Keyword-driven agent dispatching to registered tools.
pub struct CommandAgent {
    tools: ToolRegistry,
}

impl CommandAgent {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn help_text() -> String {
        format!(
            "I can help with:\n\
             - **Table transfers**, e.g. `{}`\n\
             - **Greetings**, e.g. `say hello to John`\n\
             - **The current time**, e.g. `what time is it?`",
            TRANSFER_EXAMPLE
        )
    }
}

#[async_trait]
impl Agent for CommandAgent {
    async fn respond(&self, input: &str, history: &[ChatMessage]) -> Result<String, BotError> {
        let input = input.trim();
        debug!("Routing message ({} prior message(s))", history.len());

        if TRANSFER_INTENT.is_match(input) {
            return self.tools.invoke("transfer_table_data", input).await;
        }

        if let Some(caps) = GREETING_INTENT.captures(input) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            return self.tools.invoke("say_hello", name).await;
        }

        if TIME_INTENT.is_match(input) {
            let now = self.tools.invoke("get_current_time", "").await?;
            return Ok(format!("The current time is {}.", now));
        }

        Ok(Self::help_text())
    }
}
