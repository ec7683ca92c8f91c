//! Remote content service contract and the collaborators around a turn.

use crate::error::Result;
use async_trait::async_trait;

/// Text returned by `search` when the request failed in any way.
pub const SEARCH_ERROR_TEXT: &str = "Error fetching search results.";

/// Text returned by `search` when the response held no snippets.
pub const SEARCH_EMPTY_TEXT: &str = "No search results found.";

/// Stateless access to the generative and search endpoints.
///
/// The two operations fail differently on purpose: `generate` returns an
/// error the caller must handle, `search` always resolves to text and reports
/// failure through [`SEARCH_ERROR_TEXT`].
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Generates a response for `prompt` with the given model.
    ///
    /// `api_key` overrides the configured key for this call.
    ///
    /// # Errors
    ///
    /// - `CodepaneError::Request` for non-success statuses and transport failures
    /// - `CodepaneError::MalformedResponse` when the body lacks the expected text
    /// - `CodepaneError::Config` when no API key is available
    async fn generate(&self, model: &str, prompt: &str, api_key: Option<&str>) -> Result<String>;

    /// Runs a web search and returns the result snippets joined by newlines.
    async fn search(&self, query: &str) -> String;
}

/// Surface that displays code extracted from assistant responses.
pub trait CodeDisplay: Send + Sync {
    fn show_code(&self, code: &str);
}
