//! Teams activity handling.
//!
//! The bot turns one incoming activity into the list of replies sent back
//! on the same conversation. Message text goes through the agent with the
//! conversation's history; membership updates produce a welcome message.

use crate::activity::Activity;
use crate::agent::Agent;
use crate::constants::{LOG_TEXT_TRUNCATE_LENGTH, PROCESSING_MESSAGE, WELCOME_MESSAGE};
use crate::database::truncate_for_log;
use crate::history::SharedConversationStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Activity handler shared by every transport.
pub struct TeamsBot {
    agent: Arc<dyn Agent>,
    store: SharedConversationStore,
    in_flight: AtomicUsize,
}

/// Shared bot wrapper.
pub type SharedBot = Arc<TeamsBot>;

/// Decrements the in-flight counter when a turn ends.
struct TurnGuard<'a>(&'a AtomicUsize);

impl<'a> TurnGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TeamsBot {
    pub fn new(agent: Arc<dyn Agent>, store: SharedConversationStore) -> Self {
        Self {
            agent,
            store,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &SharedConversationStore {
        &self.store
    }

    /// Number of turns currently being processed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Handle one activity, returning the replies in send order.
    pub async fn handle(&self, activity: &Activity) -> Vec<Activity> {
        let _turn = TurnGuard::enter(&self.in_flight);

        if activity.is_message() {
            self.on_message(activity).await
        } else if activity.is_conversation_update() {
            self.on_members_added(activity)
        } else {
            debug!("Ignoring activity of type {}", activity.activity_type);
            Vec::new()
        }
    }

    /// Run one message through the agent.
    ///
    /// History is only updated when the agent succeeds. Activities with
    /// neither a conversation nor a sender id run without history. History
    /// is read and recorded under separate locks, so concurrent turns in one
    /// conversation may each answer from the same earlier snapshot.
    pub async fn on_message(&self, activity: &Activity) -> Vec<Activity> {
        let text = activity.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            debug!("Ignoring message without text");
            return Vec::new();
        }

        let history_key = activity.history_key();
        info!(
            "Message in {}: {}",
            history_key.unwrap_or("<unknown>"),
            truncate_for_log(text, LOG_TEXT_TRUNCATE_LENGTH)
        );

        let mut replies = vec![activity.reply(PROCESSING_MESSAGE)];
        let history = match history_key {
            Some(key) => self.store.history(key).await,
            None => Vec::new(),
        };

        match self.agent.respond(text, &history).await {
            Ok(output) => {
                if let Some(key) = history_key {
                    self.store.record(key, text, &output).await;
                }
                replies.push(activity.reply(format!("✅ {}", output)));
            }
            Err(e) => {
                error!("Agent failed in {}: {}", history_key.unwrap_or("<unknown>"), e);
                replies.push(activity.reply(format!("❌ Sorry, an error occurred: {}", e)));
            }
        }

        replies
    }

    /// Welcome every added member other than the bot itself.
    pub fn on_members_added(&self, activity: &Activity) -> Vec<Activity> {
        let bot_id = activity.recipient.as_ref().map(|r| r.id.as_str());

        activity
            .members_added
            .iter()
            .filter(|member| Some(member.id.as_str()) != bot_id)
            .map(|member| {
                info!("Welcoming member {}", member.id);
                activity.reply(WELCOME_MESSAGE)
            })
            .collect()
    }
}
