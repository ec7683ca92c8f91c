pub mod gemini_api_client;
pub mod remote_content_service;
pub mod supported_models;
pub mod web_search_client;

pub use gemini_api_client::GeminiApiClient;
pub use remote_content_service::RemoteContentService;
pub use supported_models::SupportedModel;
pub use web_search_client::WebSearchClient;
