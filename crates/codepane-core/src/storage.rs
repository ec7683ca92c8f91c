//! Key-value persistence contract.
//!
//! The chat store keeps its whole collection under a single key, so the
//! backing store only needs string get/set.

use crate::error::Result;
use async_trait::async_trait;

/// Key under which the serialized session collection is stored.
pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// A minimal string key-value store (the local-storage equivalent).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: a value is stored
    /// - `Ok(None)`: nothing stored under `key`
    /// - `Err(_)`: the backing storage could not be read
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
