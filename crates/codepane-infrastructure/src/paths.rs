//! Unified path management for codepane configuration files.

use codepane_core::config::{GeminiSecret, SearchSecret, SecretConfig};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "codepane";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for codepane.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/codepane/          # Config directory (or the base override)
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API keys
/// ├── chatHistory.json         # Chat sessions (unless storage.data_dir is set)
/// └── logs/                    # Application logs
///     └── codepane.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodepanePaths {
    base: Option<PathBuf>,
}

impl CodepanePaths {
    /// Creates a resolver. With `base`, every path is resolved under it
    /// instead of the platform config directory.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the codepane configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/codepane/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Directory holding the chat history, honouring an explicit override.
    pub fn data_dir(&self, configured: Option<&Path>) -> Result<PathBuf, PathError> {
        match configured {
            Some(dir) => Ok(dir.to_path_buf()),
            None => self.config_dir(),
        }
    }

    /// Ensures the secret file exists, creating an empty template if it doesn't.
    ///
    /// # Security Note
    ///
    /// This function sets file permissions to 600 (user read/write only) on Unix systems.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiSecret {
                api_key: String::new(),
            }),
            search: Some(SearchSecret {
                api_key: String::new(),
                engine_id: String::new(),
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}
