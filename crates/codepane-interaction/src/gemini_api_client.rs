//! GeminiApiClient - direct REST client for Gemini `generateContent`.
//!
//! One POST per call; no retry, no timeout, no rate limiting.

use codepane_core::config::DEFAULT_GENERATIVE_ENDPOINT;
use codepane_core::{CodepaneError, Result};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiApiClient {
    /// Creates a client for the public endpoint with an optional default API key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Overrides the base URL (`{endpoint}/models/{model}:generateContent`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends `prompt` to `model` and returns the first candidate's text.
    ///
    /// `api_key` takes precedence over the key the client was built with.
    pub async fn generate(&self, model: &str, prompt: &str, api_key: Option<&str>) -> Result<String> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .or(self.api_key.as_deref())
            .ok_or_else(|| CodepaneError::config("Gemini API key is not configured"))?;

        let url = self.generate_url(model)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(model, prompt_chars = prompt.chars().count(), "sending generateContent");

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                CodepaneError::request(None, format!("Gemini API request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            CodepaneError::request(
                Some(status.as_u16()),
                format!("Failed to read Gemini response: {}", err.without_url()),
            )
        })?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Gemini API error");
            return Err(map_http_error(status, &body));
        }

        extract_text_response(&body)
    }

    /// `{endpoint}/models/{model}:generateContent` with the model as one encoded path segment.
    fn generate_url(&self, model: &str) -> Result<Url> {
        let invalid = || CodepaneError::config(format!("Invalid Gemini endpoint: {}", self.endpoint));

        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("models")
            .push(&format!("{model}:generateContent"));
        Ok(url)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pulls `candidates[0].content.parts[0].text` out of a success body.
fn extract_text_response(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| CodepaneError::malformed(format!("Failed to parse Gemini response: {err}")))?;

    parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            CodepaneError::malformed("Gemini API returned no text in the response candidates")
        })
}

/// Message from `error.message` when the body carries one, else a generic status line.
fn map_http_error(status: StatusCode, body: &str) -> CodepaneError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

    CodepaneError::request(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"first"},{"text":"ignored"}]}},
            {"content":{"parts":[{"text":"second"}]}}
        ]}"#;
        assert_eq!(extract_text_response(body).unwrap(), "first");
    }

    #[test]
    fn missing_shape_is_malformed() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{}}]}}]}"#,
            "not json",
        ] {
            let err = extract_text_response(body).unwrap_err();
            assert!(
                matches!(err, CodepaneError::MalformedResponse(_)),
                "body {body} gave {err:?}"
            );
        }
    }

    #[test]
    fn http_error_uses_body_message() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(err, CodepaneError::request(Some(400), "API key not valid."));
    }

    #[test]
    fn http_error_falls_back_to_status() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>");
        assert_eq!(err.to_string(), "HTTP error! status: 503");
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn model_is_a_single_path_segment() {
        let client = GeminiApiClient::new(None).with_endpoint("http://localhost:9/v1beta/");

        let url = client.generate_url("gemini-1.5-pro").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9/v1beta/models/gemini-1.5-pro:generateContent");

        let url = client.generate_url("a/b?c").unwrap();
        assert_eq!(url.path(), "/v1beta/models/a%2Fb%3Fc:generateContent");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let client = GeminiApiClient::new(None).with_endpoint("not a url");
        assert!(matches!(client.generate_url("gemini-pro"), Err(CodepaneError::Config(_))));
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let client = GeminiApiClient::new(Some("   ".to_string()));
        assert!(!client.has_api_key());

        let err = client.generate("gemini-pro", "hi", None).await.unwrap_err();
        assert!(matches!(err, CodepaneError::Config(_)));
    }
}
