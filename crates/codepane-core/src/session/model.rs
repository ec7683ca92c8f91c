//! Chat session domain model.

use super::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// Title given to sessions created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// One independent conversation thread.
///
/// Sessions are owned by the chat store; controllers work on a transient copy
/// of the message log and write it back as a whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Display title, editable by the user
    pub title: String,
    /// Messages in chronological (insertion) order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Timestamp when the session was created (RFC 3339)
    #[serde(default)]
    pub created_at: String,
}

impl ChatSession {
    /// Creates an empty session. A blank title falls back to [`DEFAULT_CHAT_TITLE`].
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            DEFAULT_CHAT_TITLE.to_string()
        } else {
            title
        };

        Self {
            id: id.into(),
            title,
            messages: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            message_count: self.messages.len(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Lightweight view of a session for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub created_at: String,
}
