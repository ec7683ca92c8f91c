//! [`ContentService`] backed by the Gemini and Custom Search clients.

use crate::gemini_api_client::GeminiApiClient;
use crate::web_search_client::WebSearchClient;
use async_trait::async_trait;
use codepane_core::Result;
use codepane_core::config::{AppConfig, SecretConfig};
use codepane_core::content::ContentService;

#[derive(Clone)]
pub struct RemoteContentService {
    gemini: GeminiApiClient,
    search: WebSearchClient,
}

impl RemoteContentService {
    pub fn new(gemini: GeminiApiClient, search: WebSearchClient) -> Self {
        Self { gemini, search }
    }

    /// Builds both clients from the configured endpoints and keys.
    pub fn from_config(app: &AppConfig, secrets: &SecretConfig) -> Self {
        let gemini = GeminiApiClient::new(secrets.gemini_api_key().map(str::to_string))
            .with_endpoint(app.generative.endpoint.clone());
        let search =
            WebSearchClient::new(secrets.search.clone()).with_endpoint(app.search.endpoint.clone());
        Self::new(gemini, search)
    }

    pub fn gemini(&self) -> &GeminiApiClient {
        &self.gemini
    }

    pub fn web_search(&self) -> &WebSearchClient {
        &self.search
    }
}

#[async_trait]
impl ContentService for RemoteContentService {
    async fn generate(&self, model: &str, prompt: &str, api_key: Option<&str>) -> Result<String> {
        self.gemini.generate(model, prompt, api_key).await
    }

    async fn search(&self, query: &str) -> String {
        self.search.search(query).await
    }
}
