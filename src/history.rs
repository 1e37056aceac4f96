//! Per-conversation chat history.
//!
//! Turns are kept in memory per conversation id, bounded by a maximum
//! number of turns, and dropped once a conversation has been idle longer
//! than the configured TTL.

use crate::config::HistoryConfig;
use crate::constants::DEFAULT_HISTORY_CLEANUP_SECS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Who authored a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

#[derive(Debug)]
struct Conversation {
    messages: Vec<ChatMessage>,
    last_active: Instant,
}

impl Conversation {
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_active) > ttl
    }
}

/// In-memory store of conversation histories.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    config: HistoryConfig,
}

impl ConversationStore {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Messages recorded so far for a conversation, oldest first.
    ///
    /// Unknown or expired conversations yield an empty history.
    pub async fn history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let conversations = self.conversations.read().await;
        match conversations.get(conversation_id) {
            Some(conv) if !conv.is_idle(Instant::now(), self.config.idle_ttl) => {
                conv.messages.clone()
            }
            _ => Vec::new(),
        }
    }

    /// Append one completed turn (user input and agent output).
    pub async fn record(&self, conversation_id: &str, input: &str, output: &str) {
        let now = Instant::now();
        let mut conversations = self.conversations.write().await;
        let conv = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Conversation {
                messages: Vec::new(),
                last_active: now,
            });

        if conv.is_idle(now, self.config.idle_ttl) {
            conv.messages.clear();
        }

        conv.messages.push(ChatMessage::human(input));
        conv.messages.push(ChatMessage::ai(output));
        conv.last_active = now;

        let max_messages = self.config.max_turns.saturating_mul(2);
        if conv.messages.len() > max_messages {
            let excess = conv.messages.len() - max_messages;
            conv.messages.drain(..excess);
        }
    }

    /// Drop every conversation idle at `now`. Returns how many were removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, conv| !conv.is_idle(now, self.config.idle_ttl));
        before - conversations.len()
    }

    /// Number of tracked conversations.
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }

    /// Forget every conversation.
    pub async fn clear(&self) {
        self.conversations.write().await.clear();
    }
}

/// Shared store wrapper.
pub type SharedConversationStore = Arc<ConversationStore>;

/// Spawn the periodic idle-eviction sweep.
///
/// A zero interval falls back to the default sweep interval.
pub fn spawn_cleanup_task(store: SharedConversationStore) -> JoinHandle<()> {
    let mut period = store.config().cleanup_interval;
    if period.is_zero() {
        period = Duration::from_secs(DEFAULT_HISTORY_CLEANUP_SECS);
    }
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(Instant::now()).await;
            if evicted > 0 {
                debug!("Evicted {} idle conversation(s)", evicted);
            }
        }
    })
}
