//! Chat store trait.
//!
//! Defines the interface the conversation layer uses to read and write
//! chat sessions.

use super::message::ChatMessage;
use super::model::SessionSummary;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract store for chat sessions.
///
/// Every mutation persists the whole session collection before it returns.
/// There is no merging: `append_snapshot` replaces the stored log with the
/// caller's copy (last writer wins).
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Lists all sessions in creation order.
    async fn list_sessions(&self) -> Vec<SessionSummary>;

    /// Creates an empty session.
    ///
    /// Creating a session with an id that already exists is a no-op; callers
    /// are expected to generate a fresh id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    async fn create_session(&self, id: &str, title: &str) -> Result<()>;

    /// Replaces the message log of a session with `messages`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    async fn append_snapshot(&self, id: &str, messages: &[ChatMessage]) -> Result<()>;

    /// Returns the message log of a session, or `None` if the session is unknown.
    async fn get_messages(&self, id: &str) -> Option<Vec<ChatMessage>>;

    /// Changes the title of a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    async fn rename_session(&self, id: &str, title: &str) -> Result<()>;
}
