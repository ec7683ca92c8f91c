pub mod config_service;
pub mod local_chat_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::{ConfigService, ResolvedConfig};
pub use crate::local_chat_store::LocalChatStore;
pub use crate::paths::CodepanePaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
