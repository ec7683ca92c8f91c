//! Domain layer of codepane: chat sessions, the contracts of the store and
//! remote services, configuration, and code-block extraction.

pub mod config;
pub mod content;
pub mod error;
pub mod markdown;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{CodepaneError, Result};
