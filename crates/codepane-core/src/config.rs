//! Configuration model.
//!
//! `config.toml` carries the non-secret settings ([`AppConfig`]); API keys
//! live in `secret.json` ([`SecretConfig`]). Both deserialize from partial
//! files, every missing field taking its default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GENERATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 20;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generative: GenerativeConfig,
    pub search: SearchConfig,
    pub typing: TypingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    /// Base URL; requests go to `{endpoint}/models/{model}:generateContent`.
    pub endpoint: String,
    /// Model selected when a conversation is opened.
    pub default_model: String,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Delay between two revealed characters.
    pub interval_ms: u64,
}

impl TypingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_TYPING_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the chat history; defaults to the config directory.
    pub data_dir: Option<PathBuf>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
    #[serde(default)]
    pub search: Option<SearchSecret>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSecret {
    pub api_key: String,
    /// Programmable search engine id (`cx`).
    pub engine_id: String,
}

impl SecretConfig {
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }
}
