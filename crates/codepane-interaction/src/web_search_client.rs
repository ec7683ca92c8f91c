//! Google Custom Search client.

use codepane_core::config::{DEFAULT_SEARCH_ENDPOINT, SearchSecret};
use codepane_core::content::{SEARCH_EMPTY_TEXT, SEARCH_ERROR_TEXT};
use codepane_core::{CodepaneError, Result};
use reqwest::Client;
use serde::Deserialize;

/// Runs queries against the Custom Search JSON API and flattens the result
/// snippets into plain text.
#[derive(Clone)]
pub struct WebSearchClient {
    client: Client,
    endpoint: String,
    credentials: Option<SearchSecret>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    snippet: Option<String>,
}

impl WebSearchClient {
    pub fn new(credentials: Option<SearchSecret>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            credentials,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|c| !c.api_key.is_empty() && !c.engine_id.is_empty())
    }

    /// Searches for `query`.
    ///
    /// Never fails: an empty result set yields [`SEARCH_EMPTY_TEXT`] and any
    /// error yields [`SEARCH_ERROR_TEXT`].
    pub async fn search(&self, query: &str) -> String {
        match self.fetch_snippets(query).await {
            Ok(snippets) if snippets.is_empty() => SEARCH_EMPTY_TEXT.to_string(),
            Ok(snippets) => snippets,
            Err(err) => {
                tracing::warn!(error = %err, "web search failed");
                SEARCH_ERROR_TEXT.to_string()
            }
        }
    }

    async fn fetch_snippets(&self, query: &str) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .filter(|_| self.is_configured())
            .ok_or_else(|| CodepaneError::Search("search credentials are not configured".into()))?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| CodepaneError::Search(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CodepaneError::Search(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CodepaneError::Search(format!("invalid response: {}", e.without_url())))?;

        Ok(join_snippets(body))
    }
}

/// Joins the item snippets with newlines, skipping items without one.
fn join_snippets(response: SearchResponse) -> String {
    response
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.snippet)
        .filter(|snippet| !snippet.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> SearchResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn joins_snippets_in_order() {
        let body = r#"{"items":[{"snippet":"a"},{"title":"t"},{"snippet":" "},{"snippet":"b"}]}"#;
        assert_eq!(join_snippets(parse(body)), "a\nb");
    }

    #[test]
    fn no_items_is_empty() {
        assert_eq!(join_snippets(parse(r#"{"kind":"customsearch#search"}"#)), "");
        assert_eq!(join_snippets(parse(r#"{"items":[]}"#)), "");
        assert_eq!(join_snippets(parse(r#"{"items":[{"title":"x"},{"title":"y"}]}"#)), "");
    }

    #[tokio::test]
    async fn unconfigured_client_reports_error_text() {
        let client = WebSearchClient::new(None);
        assert!(!client.is_configured());
        assert_eq!(client.search("rust").await, SEARCH_ERROR_TEXT);
    }
}
