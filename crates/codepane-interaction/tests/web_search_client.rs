mod common;

use codepane_core::config::SearchSecret;
use codepane_core::content::{SEARCH_EMPTY_TEXT, SEARCH_ERROR_TEXT};
use codepane_interaction::WebSearchClient;
use common::serve_once;

fn client(base_url: &str) -> WebSearchClient {
    WebSearchClient::new(Some(SearchSecret {
        api_key: "search-key".to_string(),
        engine_id: "engine".to_string(),
    }))
    .with_endpoint(format!("{base_url}/customsearch/v1"))
}

#[tokio::test]
async fn test_search_joins_snippets() {
    let (base_url, server) = serve_once(
        200,
        r#"{"items":[{"title":"One","snippet":"Rust is fast."},{"title":"Two","snippet":"Rust is safe."}]}"#,
    )
    .await;

    let text = client(&base_url).search("rust lang").await;
    assert_eq!(text, "Rust is fast.\nRust is safe.");

    let request = server.await.unwrap();
    assert_eq!(
        request.request_line(),
        "GET /customsearch/v1?key=search-key&cx=engine&q=rust+lang HTTP/1.1"
    );
}

#[tokio::test]
async fn test_search_without_items() {
    let (base_url, _server) = serve_once(200, r#"{"kind":"customsearch#search"}"#).await;

    assert_eq!(client(&base_url).search("nothing").await, SEARCH_EMPTY_TEXT);
}

#[tokio::test]
async fn test_search_items_without_snippets() {
    let (base_url, _server) =
        serve_once(200, r#"{"items":[{"title":"x"},{"title":"y"}]}"#).await;

    assert_eq!(client(&base_url).search("q").await, SEARCH_EMPTY_TEXT);
}

#[tokio::test]
async fn test_search_error_status() {
    let (base_url, _server) = serve_once(403, r#"{"error":{"message":"quota"}}"#).await;

    assert_eq!(client(&base_url).search("rust").await, SEARCH_ERROR_TEXT);
}

#[tokio::test]
async fn test_search_invalid_json() {
    let (base_url, _server) = serve_once(200, "<html></html>").await;

    assert_eq!(client(&base_url).search("rust").await, SEARCH_ERROR_TEXT);
}
