//! Chat log and player feedback
//!
//! Both are append-only lists in the store; delivery to connected clients is
//! someone else's job.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::Result;
use crate::core::sanitize::sanitize;
use crate::core::types::{now_millis, AvatarId, Timestamp};
use crate::engine::{counter, Engine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: Option<AvatarId>,
    pub name: String,
    /// Channel, world id or avatar id the message was sent to
    pub to: String,
    pub body: String,
    #[serde(default)]
    pub sent_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub from: Option<AvatarId>,
    pub contact: Option<String>,
    pub body: String,
    #[serde(default)]
    pub sent_at: Timestamp,
}

impl Engine {
    /// Sanitize and append a chat message; returns false when nothing was left to log
    pub fn log_chat_message(&self, message: ChatMessage) -> Result<bool> {
        let app = &self.config.app;
        let body = sanitize(&message.body, app.sanitize_length_limit);
        let to = sanitize(&message.to, app.sanitize_length_limit);
        if body.is_empty() || to.is_empty() {
            return Ok(false);
        }
        let entry = ChatMessage {
            name: sanitize(&message.name, app.avatar_name_length_limit),
            to,
            body,
            sent_at: now_millis(),
            ..message
        };
        let json = serde_json::to_string(&entry)?;
        self.store.lpush(&self.keys.chat(&entry.to), json)?;
        self.bump(counter::CHAT_MESSAGES)?;
        debug!(to = %entry.to, "chat message logged");
        Ok(true)
    }

    /// Most recent chat on a channel, newest first
    pub fn recent_chat(&self, to: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store
            .lrange(&self.keys.chat(to), 0, limit - 1)?
            .iter()
            .map(|raw| -> Result<ChatMessage> { Ok(serde_json::from_str(raw)?) })
            .collect()
    }

    pub fn submit_feedback(&self, feedback: Feedback) -> Result<bool> {
        let limit = self.config.app.sanitize_length_limit;
        let body = sanitize(&feedback.body, limit);
        if body.is_empty() {
            return Ok(false);
        }
        let entry = Feedback {
            contact: feedback.contact.map(|c| sanitize(&c, limit)),
            body,
            sent_at: now_millis(),
            ..feedback
        };
        self.store
            .lpush(&self.keys.feedback(), serde_json::to_string(&entry)?)?;
        self.bump(counter::FEEDBACK)?;
        Ok(true)
    }
}
