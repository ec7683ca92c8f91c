//! Code panel state.
//!
//! Holds the editor content, the latest code block received from the
//! assistant, and runs the editor content through the generative model.

use codepane_core::Result;
use codepane_core::content::{CodeDisplay, ContentService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const INITIAL_EDITOR_TEXT: &str = "// Click on a file to view its contents";

#[derive(Debug)]
struct PanelState {
    editor: String,
    assistant_code: Option<String>,
    preview_expanded: bool,
}

/// Editor and preview for code produced during a conversation.
#[derive(Debug)]
pub struct CodePanel {
    state: Mutex<PanelState>,
    executing: AtomicBool,
}

impl Default for CodePanel {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CodePanel {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            state: Mutex::new(PanelState {
                editor: initial.unwrap_or(INITIAL_EDITOR_TEXT).to_string(),
                assistant_code: None,
                preview_expanded: true,
            }),
            executing: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn content(&self) -> String {
        self.lock().editor.clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.lock().editor = content.into();
    }

    pub fn assistant_code(&self) -> Option<String> {
        self.lock().assistant_code.clone()
    }

    /// What the preview shows: the assistant's code if any, else the editor.
    pub fn displayed_content(&self) -> String {
        let state = self.lock();
        state
            .assistant_code
            .clone()
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| state.editor.clone())
    }

    /// Empties the editor. Assistant code is kept.
    pub fn clear(&self) {
        self.lock().editor.clear();
    }

    pub fn toggle_preview(&self) -> bool {
        let mut state = self.lock();
        state.preview_expanded = !state.preview_expanded;
        state.preview_expanded
    }

    pub fn is_preview_expanded(&self) -> bool {
        self.lock().preview_expanded
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    /// Sends the editor content to `model` and replaces it with the result.
    ///
    /// # Returns
    ///
    /// The model's response, also written into the editor.
    ///
    /// # Errors
    ///
    /// The generate error, after its message has been written into the editor.
    pub async fn run(
        &self,
        service: &dyn ContentService,
        model: &str,
        api_key: Option<&str>,
    ) -> Result<String> {
        let source = self.content();
        self.executing.store(true, Ordering::Release);
        let result = service.generate(model, &source, api_key).await;
        self.executing.store(false, Ordering::Release);

        match result {
            Ok(response) => {
                self.set_content(format!("// API Response:\n{response}"));
                Ok(response)
            }
            Err(err) => {
                tracing::error!(model, error = %err, "code run failed");
                self.set_content(format!("// API Response Error:\n{err}"));
                Err(err)
            }
        }
    }
}

impl CodeDisplay for CodePanel {
    fn show_code(&self, code: &str) {
        self.lock().assistant_code = Some(code.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codepane_core::CodepaneError;

    struct FixedService(std::result::Result<&'static str, CodepaneError>);

    #[async_trait]
    impl ContentService for FixedService {
        async fn generate(&self, _model: &str, prompt: &str, _api_key: Option<&str>) -> Result<String> {
            self.0
                .clone()
                .map(|response| format!("{response} ({prompt})"))
        }

        async fn search(&self, _query: &str) -> String {
            String::new()
        }
    }

    #[test]
    fn test_initial_content() {
        let panel = CodePanel::default();
        assert_eq!(panel.content(), INITIAL_EDITOR_TEXT);
        assert_eq!(panel.displayed_content(), INITIAL_EDITOR_TEXT);
        assert!(panel.is_preview_expanded());
        assert!(!panel.is_executing());

        let panel = CodePanel::new(Some("let x = 1;"));
        assert_eq!(panel.content(), "let x = 1;");
    }

    #[test]
    fn test_assistant_code_takes_precedence() {
        let panel = CodePanel::default();
        panel.show_code("fn main() {}");

        assert_eq!(panel.displayed_content(), "fn main() {}");
        assert_eq!(panel.content(), INITIAL_EDITOR_TEXT);

        panel.clear();
        assert_eq!(panel.content(), "");
        assert_eq!(panel.assistant_code().as_deref(), Some("fn main() {}"));
    }

    #[test]
    fn test_toggle_preview() {
        let panel = CodePanel::default();
        assert!(!panel.toggle_preview());
        assert!(panel.toggle_preview());
    }

    #[tokio::test]
    async fn test_run_writes_response() {
        let panel = CodePanel::new(Some("print(1)"));
        let response = panel
            .run(&FixedService(Ok("1")), "gemini-pro", None)
            .await
            .unwrap();

        assert_eq!(response, "1 (print(1))");
        assert_eq!(panel.content(), "// API Response:\n1 (print(1))");
        assert!(!panel.is_executing());
    }

    #[tokio::test]
    async fn test_run_writes_error() {
        let panel = CodePanel::default();
        let err = panel
            .run(
                &FixedService(Err(CodepaneError::request(Some(429), "Quota exceeded"))),
                "gemini-pro",
                None,
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(panel.content(), "// API Response Error:\nQuota exceeded");
        assert!(!panel.is_executing());
    }
}
