//! Chat list and selection.

use codepane_core::session::{ChatStore, DEFAULT_CHAT_TITLE, SessionSummary};
use codepane_core::{CodepaneError, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Keeps track of the available chats and which one is selected.
pub struct ChatDashboard {
    store: Arc<dyn ChatStore>,
    selected: Option<String>,
}

impl ChatDashboard {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            selected: None,
        }
    }

    pub fn store(&self) -> Arc<dyn ChatStore> {
        self.store.clone()
    }

    /// All chats in creation order.
    pub async fn chats(&self) -> Vec<SessionSummary> {
        self.store.list_sessions().await
    }

    /// Creates a chat with a fresh id and selects it.
    ///
    /// # Returns
    ///
    /// The id of the new chat.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat list cannot be persisted.
    pub async fn create_chat(&mut self, title: Option<&str>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_CHAT_TITLE);

        self.store.create_session(&id, title).await?;
        tracing::info!(chat_id = %id, title, "chat created");

        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Selects an existing chat.
    ///
    /// # Errors
    ///
    /// Returns `CodepaneError::NotFound` if no chat has this id.
    pub async fn select_chat(&mut self, id: &str) -> Result<()> {
        self.ensure_exists(id).await?;
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Renames a chat.
    ///
    /// # Errors
    ///
    /// Returns `CodepaneError::NotFound` for an unknown id, or a store error
    /// if the change cannot be persisted.
    pub async fn rename_chat(&self, id: &str, title: &str) -> Result<()> {
        self.ensure_exists(id).await?;
        self.store.rename_session(id, title).await
    }

    /// The selected chat, falling back to the first one when nothing was
    /// selected explicitly.
    pub async fn selected_chat_id(&self) -> Option<String> {
        if let Some(id) = &self.selected {
            return Some(id.clone());
        }
        self.chats().await.into_iter().next().map(|chat| chat.id)
    }

    async fn ensure_exists(&self, id: &str) -> Result<()> {
        if self.store.get_messages(id).await.is_some() {
            Ok(())
        } else {
            Err(CodepaneError::not_found("chat session", id))
        }
    }
}
