//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: chat message types (`Sender`, `ChatMessage`)
//! - `model`: the session entity (`ChatSession`) and its listing view
//! - `repository`: the store trait controllers depend on (`ChatStore`)

mod message;
mod model;
mod repository;

pub use message::{ChatMessage, ChatMessageRecord, Sender};
pub use model::{ChatSession, DEFAULT_CHAT_TITLE, SessionSummary};
pub use repository::ChatStore;
