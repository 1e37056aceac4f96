//! Centralized constants for the Teams database agent.
//!
//! Default values and fixed strings used across modules live here so they
//! are easy to find and change.

use std::time::Duration;

// =============================================================================
// Transfer Constants
// =============================================================================

/// Schema assumed when a transfer command names no schema.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Schema every transferred table is written into.
pub const DESTINATION_SCHEMA: &str = "dbo";

/// Usage line shown when a transfer command cannot be parsed.
pub const TRANSFER_USAGE: &str = "transfer [schema].[table] from [source_db] to [dest_db]";

/// Example transfer command shown to users and to the agent.
pub const TRANSFER_EXAMPLE: &str = "transfer dbo.DB_EVENTS from dw_production to TempObjDB";

// =============================================================================
// Database Constants
// =============================================================================

/// Application name reported to SQL Server.
pub const APPLICATION_NAME: &str = "teams-db-agent";

// =============================================================================
// HTTP Constants
// =============================================================================

/// Default HTTP bind host.
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP port (the Bot Framework emulator's default).
pub const DEFAULT_HTTP_PORT: u16 = 3978;

/// Maximum accepted activity body size in bytes.
pub const MAX_ACTIVITY_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// Conversation History Constants
// =============================================================================

/// Default number of exchanges kept per conversation.
pub const DEFAULT_HISTORY_MAX_TURNS: usize = 20;

/// Default idle time before a conversation is evicted, in seconds.
pub const DEFAULT_HISTORY_IDLE_SECS: u64 = 3600;

/// Default interval between eviction sweeps, in seconds.
pub const DEFAULT_HISTORY_CLEANUP_SECS: u64 = 60;

/// Conversation id used by the console transport.
pub const CONSOLE_CONVERSATION_ID: &str = "console";

// =============================================================================
// Shutdown Constants
// =============================================================================

/// Default shutdown drain timeout in seconds.
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;

/// Default shutdown drain timeout as Duration.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS);

/// Sleep interval during drain phase.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

// =============================================================================
// Logging Constants
// =============================================================================

/// Truncation length for user text and SQL in log lines.
pub const LOG_TEXT_TRUNCATE_LENGTH: usize = 100;

// =============================================================================
// Bot Messages
// =============================================================================

/// Acknowledgement sent before the agent runs.
pub const PROCESSING_MESSAGE: &str = "🔄 Processing your request...";

/// Greeting sent to members added to a conversation.
pub const WELCOME_MESSAGE: &str = "👋 **Hello! I'm your Database Assistant Bot!**

I can help you with database operations. Here are some things you can ask me:

• **Transfer tables**: `transfer dbo.DB_EVENTS from dw_production to TempObjDB`
• **Get current time**: `what time is it?`
• **Say hello**: `say hello to John`

Just type your request in natural language and I'll help you out! 🚀";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_duration() {
        assert_eq!(DEFAULT_DRAIN_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_welcome_mentions_example() {
        assert!(WELCOME_MESSAGE.contains(TRANSFER_EXAMPLE));
    }
}
