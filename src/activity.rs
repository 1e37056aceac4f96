//! Bot Framework activity model.
//!
//! Only the fields the bot reads or writes are modelled; everything else in
//! an incoming activity is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity type for user messages.
pub const MESSAGE: &str = "message";

/// Activity type for membership changes.
pub const CONVERSATION_UPDATE: &str = "conversationUpdate";

/// A user or bot account on a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<String>,
}

/// One Bot Framework activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    /// Create a message activity with the given text.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            activity_type: MESSAGE.to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_message(&self) -> bool {
        self.activity_type == MESSAGE
    }

    pub fn is_conversation_update(&self) -> bool {
        self.activity_type == CONVERSATION_UPDATE
    }

    /// Conversation id, or an empty string when absent.
    pub fn conversation_id(&self) -> &str {
        self.conversation
            .as_ref()
            .map(|c| c.id.as_str())
            .unwrap_or_default()
    }

    /// Key under which this activity's history is kept.
    ///
    /// The conversation id when present, otherwise the sender's id. `None`
    /// when neither is known.
    pub fn history_key(&self) -> Option<&str> {
        let conversation = self.conversation.as_ref().map(|c| c.id.as_str());
        let sender = self.from.as_ref().map(|f| f.id.as_str());
        conversation
            .filter(|id| !id.is_empty())
            .or_else(|| sender.filter(|id| !id.is_empty()))
    }

    /// Build a markdown message replying to this activity.
    ///
    /// The sender and recipient are swapped and the reply keeps the channel,
    /// service URL and conversation of the incoming activity.
    pub fn reply(&self, text: impl Into<String>) -> Activity {
        Activity {
            activity_type: MESSAGE.to_string(),
            id: Some(Uuid::new_v4().to_string()),
            timestamp: Some(Utc::now()),
            channel_id: self.channel_id.clone(),
            service_url: self.service_url.clone(),
            from: self.recipient.clone(),
            recipient: self.from.clone(),
            conversation: self.conversation.clone(),
            text: Some(text.into()),
            text_format: Some("markdown".to_string()),
            members_added: Vec::new(),
            reply_to_id: self.id.clone(),
        }
    }
}

/// Response body carrying replies inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedReplies {
    pub activities: Vec<Activity>,
}
