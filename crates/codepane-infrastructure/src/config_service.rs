//! Configuration loading.
//!
//! Reads `config.toml` and `secret.json` from the codepane config directory
//! and applies environment overrides for API keys.

use crate::paths::CodepanePaths;
use codepane_core::config::{AppConfig, GeminiSecret, SearchSecret, SecretConfig};
use codepane_core::{CodepaneError, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_SEARCH_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
pub const ENV_SEARCH_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";

/// Everything the application needs to start.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub app: AppConfig,
    pub secrets: SecretConfig,
    /// Directory the chat history is stored in.
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

/// Loads configuration files through [`CodepanePaths`].
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    paths: CodepanePaths,
}

impl ConfigService {
    pub fn new(paths: CodepanePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &CodepanePaths {
        &self.paths
    }

    /// Loads configuration, taking key overrides from the process environment.
    pub fn load(&self) -> Result<ResolvedConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Loads configuration with a custom environment lookup.
    ///
    /// Missing files yield defaults; malformed files are errors.
    pub fn load_with_env<F>(&self, env: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_file = self.paths.config_file().map_err(path_error)?;
        let secret_file = self.paths.secret_file().map_err(path_error)?;

        let app: AppConfig = read_optional(&config_file, |s| Ok(toml::from_str(s)?))?;
        let mut secrets: SecretConfig = read_optional(&secret_file, |s| Ok(serde_json::from_str(s)?))?;
        apply_env_overrides(&mut secrets, &env);

        let data_dir = self
            .paths
            .data_dir(app.storage.data_dir.as_deref())
            .map_err(path_error)?;
        let logs_dir = self.paths.logs_dir().map_err(path_error)?;

        tracing::debug!(
            config = %config_file.display(),
            data_dir = %data_dir.display(),
            gemini_key = secrets.gemini_api_key().is_some(),
            search_configured = secrets.search.is_some(),
            "configuration loaded"
        );

        Ok(ResolvedConfig {
            app,
            secrets,
            data_dir,
            logs_dir,
        })
    }
}

fn path_error(err: crate::paths::PathError) -> CodepaneError {
    CodepaneError::config(err.to_string())
}

fn read_optional<T, F>(path: &Path, parse: F) -> Result<T>
where
    T: DeserializeOwned + Default,
    F: FnOnce(&str) -> Result<T>,
{
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(T::default()),
        Ok(content) => parse(&content).map_err(|err| {
            CodepaneError::config(format!("Failed to parse {}: {}", path.display(), err))
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err.into()),
    }
}

fn apply_env_overrides<F>(secrets: &mut SecretConfig, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(api_key) = non_empty(ENV_GEMINI_API_KEY) {
        secrets.gemini = Some(GeminiSecret { api_key });
    }

    let search_key = non_empty(ENV_SEARCH_API_KEY);
    let engine_id = non_empty(ENV_SEARCH_ENGINE_ID);
    if search_key.is_some() || engine_id.is_some() {
        let current = secrets.search.take();
        secrets.search = Some(SearchSecret {
            api_key: search_key
                .or_else(|| current.as_ref().map(|s| s.api_key.clone()))
                .unwrap_or_default(),
            engine_id: engine_id
                .or_else(|| current.as_ref().map(|s| s.engine_id.clone()))
                .unwrap_or_default(),
        });
    }
}
