//! Key-value backed ChatStore implementation.
//!
//! The whole session collection is kept in memory and written back, as one
//! JSON array under [`CHAT_HISTORY_KEY`], on every mutation. The collection
//! is read from the key-value store once, when the store is opened.

use async_trait::async_trait;
use codepane_core::Result;
use codepane_core::session::{ChatMessage, ChatSession, ChatStore, SessionSummary};
use codepane_core::storage::{CHAT_HISTORY_KEY, KeyValueStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Chat store persisting to a [`KeyValueStore`].
///
/// Mutations build the next collection from a copy, persist it, and only then
/// replace the in-memory state, so a failed write leaves both sides at the
/// previous version.
pub struct LocalChatStore {
    sessions: RwLock<Vec<ChatSession>>,
    kv: Arc<dyn KeyValueStore>,
}

impl LocalChatStore {
    /// Opens the store, loading the persisted collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value store cannot be read or if the stored
    /// value is not a valid session array.
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> Result<Self> {
        let sessions = match kv.get(CHAT_HISTORY_KEY).await? {
            Some(raw) => serde_json::from_str::<Vec<ChatSession>>(&raw)?,
            None => Vec::new(),
        };

        tracing::info!(sessions = sessions.len(), "chat history loaded");

        Ok(Self {
            sessions: RwLock::new(sessions),
            kv,
        })
    }

    /// Applies `update` to a copy of the collection, persists it, and commits.
    ///
    /// `update` returns `false` when it changed nothing; no write happens then.
    /// Returns whether the collection was written.
    async fn mutate<F>(&self, update: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<ChatSession>) -> bool,
    {
        let mut sessions = self.sessions.write().await;
        let mut next = sessions.clone();
        if !update(&mut next) {
            return Ok(false);
        }

        let serialized = serde_json::to_string(&next)?;
        self.kv.set(CHAT_HISTORY_KEY, &serialized).await?;
        *sessions = next;
        Ok(true)
    }
}

#[async_trait]
impl ChatStore for LocalChatStore {
    async fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions
            .read()
            .await
            .iter()
            .map(ChatSession::summary)
            .collect()
    }

    async fn create_session(&self, id: &str, title: &str) -> Result<()> {
        let created = self
            .mutate(|sessions| {
                if sessions.iter().any(|s| s.id == id) {
                    tracing::debug!(session_id = id, "session already exists; create ignored");
                    return false;
                }
                sessions.push(ChatSession::new(id, title));
                true
            })
            .await?;

        if created {
            tracing::info!(session_id = id, "chat session created");
        }
        Ok(())
    }

    async fn append_snapshot(&self, id: &str, messages: &[ChatMessage]) -> Result<()> {
        self.mutate(|sessions| match sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.messages = messages.to_vec();
                true
            }
            None => {
                tracing::warn!(session_id = id, "snapshot for unknown session dropped");
                false
            }
        })
        .await?;
        Ok(())
    }

    async fn get_messages(&self, id: &str) -> Option<Vec<ChatMessage>> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.messages.clone())
    }

    async fn rename_session(&self, id: &str, title: &str) -> Result<()> {
        self.mutate(|sessions| match sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.title = title.to_string();
                true
            }
            None => {
                tracing::warn!(session_id = id, "rename of unknown session ignored");
                false
            }
        })
        .await?;
        Ok(())
    }
}
