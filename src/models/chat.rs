//! Chat turns and sessions.

use super::de;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Where a message stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Loaded from history or acknowledged by a reply.
    Confirmed,
    /// Sent, reply not yet received.
    Pending,
    /// The send failed; the text stays visible.
    Failed,
}

/// One turn in a conversation. Never mutated after creation, apart from
/// its delivery state moving out of `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub delivery: Delivery,
}

impl ChatMessage {
    /// Locally authored user turn, pending until the server answers.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            delivery: Delivery::Pending,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            delivery: Delivery::Confirmed,
        }
    }

    /// The synthesised greeting shown before any history exists.
    pub fn welcome(content: impl Into<String>) -> Self {
        Self {
            id: WELCOME_ID.to_string(),
            ..Self::assistant(content)
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_ID
    }
}

pub(crate) const WELCOME_ID: &str = "welcome";

/// History entry as returned by `GET /api/chat/sessions/:id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<MessageRecord> for ChatMessage {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: r.id,
            role: r.role,
            content: r.content,
            timestamp: r.created_at.unwrap_or_else(Utc::now),
            delivery: Delivery::Confirmed,
        }
    }
}

/// A server-tracked conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    #[serde(alias = "session_id", deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Ordering key for "most recently updated".
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}
