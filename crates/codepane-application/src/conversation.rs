//! Conversation controller.
//!
//! Drives one chat session: validates input, persists the message log,
//! calls the content service, animates the reply and forwards extracted
//! code to the code display.

use crate::typing::{SharedTranscript, TypingAnimator};
use codepane_core::config::{AppConfig, DEFAULT_MODEL, DEFAULT_TYPING_INTERVAL_MS};
use codepane_core::content::{CodeDisplay, ContentService};
use codepane_core::markdown::extract_first_code_block;
use codepane_core::session::{ChatMessage, ChatStore};
use codepane_core::{CodepaneError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

/// Bot text recorded when generation fails.
pub const FALLBACK_TEXT: &str = "Sorry, I encountered an error.";

/// Shown in place of an empty log. Never stored.
pub const GREETING_TEXT: &str = "Welcome! I'm your AI assistant. How can I help you today?";

pub const EMPTY_MESSAGE_TEXT: &str = "Please enter a message.";
pub const EMPTY_SEARCH_TEXT: &str = "Please enter a message before searching.";

/// Where the controller is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    /// The prompt has been sent and no reply has arrived yet.
    AwaitingResponse,
    /// The reply at `message_index` is being revealed.
    Responding { message_index: usize },
    /// The last turn failed. Cleared by the next input change, search or submit.
    Failed,
}

/// Result of a submit that reached the content service.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Responded {
        message_index: usize,
        /// First fenced code block of the reply, already sent to the code display.
        code: Option<String>,
    },
    /// Generation failed; a fallback message was appended to the log.
    Failed { error: CodepaneError },
}

/// Per-conversation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSettings {
    pub model: String,
    pub api_key: Option<String>,
    pub typing_interval: Duration,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            typing_interval: Duration::from_millis(DEFAULT_TYPING_INTERVAL_MS),
        }
    }
}

impl ConversationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.generative.default_model.clone(),
            api_key: None,
            typing_interval: config.typing.interval(),
        }
    }
}

/// Read-only view of the controller's progress that can be polled from
/// another task while a submit or search is in flight.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    state: Arc<Mutex<ConversationState>>,
    searching: Arc<AtomicBool>,
}

impl ActivityHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ConversationState::Idle)),
            searching: Arc::new(AtomicBool::new(false)),
        }
    }

    /// State as last recorded by the controller. Unlike
    /// [`ConversationController::state`], `Responding` is not decayed here.
    pub fn state(&self) -> ConversationState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    fn set_state(&self, state: ConversationState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    fn set_searching(&self, searching: bool) {
        self.searching.store(searching, Ordering::Release);
    }
}

/// Controller for a single chat session.
///
/// `submit` and `search` take `&mut self`, so at most one turn is in flight
/// per controller.
pub struct ConversationController {
    session_id: String,
    store: Arc<dyn ChatStore>,
    content: Arc<dyn ContentService>,
    code_display: Arc<dyn CodeDisplay>,
    transcript: SharedTranscript,
    animator: TypingAnimator,
    activity: ActivityHandle,
    input: String,
    model: String,
    api_key: Option<String>,
    search_context: Option<String>,
}

impl ConversationController {
    /// Opens the conversation for `session_id`, loading its log from the store.
    ///
    /// Loaded messages are fully revealed.
    ///
    /// # Errors
    ///
    /// Returns `CodepaneError::NotFound` if the store has no such session.
    pub async fn open(
        session_id: impl Into<String>,
        store: Arc<dyn ChatStore>,
        content: Arc<dyn ContentService>,
        code_display: Arc<dyn CodeDisplay>,
        settings: ConversationSettings,
    ) -> Result<Self> {
        let session_id = session_id.into();
        let messages = store
            .get_messages(&session_id)
            .await
            .ok_or_else(|| CodepaneError::not_found("chat session", &session_id))?;
        let messages: Vec<ChatMessage> = messages.iter().map(ChatMessage::finalized).collect();

        tracing::info!(session_id = %session_id, messages = messages.len(), model = %settings.model, "conversation opened");

        let transcript: SharedTranscript = Arc::new(RwLock::new(messages));
        Ok(Self {
            session_id,
            store,
            content,
            code_display,
            animator: TypingAnimator::new(transcript.clone(), settings.typing_interval),
            transcript,
            activity: ActivityHandle::new(),
            input: String::new(),
            model: settings.model,
            api_key: settings.api_key.filter(|key| !key.trim().is_empty()),
            search_context: None,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.clear_failure();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Uses `model` for subsequent turns. Any model name is accepted.
    pub fn select_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        tracing::debug!(model = %self.model, "model selected");
    }

    /// Sets the API key sent with each generate call; blank clears it.
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
    }

    pub fn pending_context(&self) -> Option<&str> {
        self.search_context.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.activity.is_searching()
    }

    /// A handle for observing this controller while one of its calls is awaited.
    pub fn activity(&self) -> ActivityHandle {
        self.activity.clone()
    }

    pub fn state(&self) -> ConversationState {
        match self.activity.state() {
            ConversationState::Responding { message_index }
                if !self.animator.is_running(message_index) =>
            {
                ConversationState::Idle
            }
            state => state,
        }
    }

    /// A snapshot of the message log as currently displayed.
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    /// The welcome text to show while the log is empty.
    pub async fn greeting(&self) -> Option<&'static str> {
        self.transcript
            .read()
            .await
            .is_empty()
            .then_some(GREETING_TEXT)
    }

    /// Runs a web search for the current input and keeps the result as
    /// context for the next submit. The input itself is left in place.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the input is blank. Search failures are
    /// not errors; they come back as placeholder text.
    pub async fn search(&mut self) -> Result<&str> {
        if self.input.trim().is_empty() {
            return Err(CodepaneError::validation(EMPTY_SEARCH_TEXT));
        }
        self.clear_failure();

        self.activity.set_searching(true);
        let results = self.content.search(&self.input).await;
        self.activity.set_searching(false);

        tracing::info!(session_id = %self.session_id, chars = results.len(), "search context stored");
        Ok(self.search_context.insert(results).as_str())
    }

    /// Sends the current input as a new turn.
    ///
    /// # Errors
    ///
    /// - Validation error for blank input, with nothing changed
    /// - Store errors when the log cannot be persisted
    ///
    /// A failed generate call is not an error: it yields
    /// [`TurnOutcome::Failed`] after a fallback reply has been recorded.
    pub async fn submit(&mut self) -> Result<TurnOutcome> {
        if self.input.trim().is_empty() {
            return Err(CodepaneError::validation(EMPTY_MESSAGE_TEXT));
        }
        self.clear_failure();

        let input = self.input.clone();
        self.transcript.write().await.push(ChatMessage::user(input.clone()));
        if let Err(err) = self.persist().await {
            self.transcript.write().await.pop();
            tracing::error!(session_id = %self.session_id, error = %err, "failed to store user message");
            return Err(err);
        }
        self.input.clear();

        self.activity.set_state(ConversationState::AwaitingResponse);
        let context = self.search_context.take();
        let prompt = build_prompt(&input, context.as_deref());

        let result = self
            .content
            .generate(&self.model, &prompt, self.api_key.as_deref())
            .await;

        match result {
            Ok(text) => self.record_reply(text).await,
            Err(error) => self.record_failure(error).await,
        }
    }

    /// Stops all typing and shows every message in full.
    pub async fn reveal_all(&mut self) {
        self.animator.cancel_all();
        for message in self.transcript.write().await.iter_mut() {
            message.reveal_all();
        }
    }

    /// Waits for the animation of `message_index` to finish.
    pub async fn wait_for_typing(&mut self, message_index: usize) {
        self.animator.wait(message_index).await;
    }

    async fn record_reply(&mut self, text: String) -> Result<TurnOutcome> {
        let code = extract_first_code_block(&text);
        let message_index = {
            let mut messages = self.transcript.write().await;
            messages.push(ChatMessage::bot_pending(text));
            messages.len() - 1
        };

        if let Err(err) = self.persist().await {
            self.activity.set_state(ConversationState::Idle);
            if let Some(message) = self.transcript.write().await.get_mut(message_index) {
                message.reveal_all();
            }
            tracing::error!(session_id = %self.session_id, error = %err, "failed to store reply");
            return Err(err);
        }

        self.activity
            .set_state(ConversationState::Responding { message_index });
        self.animator.start(message_index);

        if let Some(code) = &code {
            self.code_display.show_code(code);
        }

        tracing::info!(session_id = %self.session_id, message_index, has_code = code.is_some(), "reply received");
        Ok(TurnOutcome::Responded {
            message_index,
            code,
        })
    }

    async fn record_failure(&mut self, error: CodepaneError) -> Result<TurnOutcome> {
        tracing::error!(session_id = %self.session_id, model = %self.model, error = %error, "generate failed");

        self.transcript
            .write()
            .await
            .push(ChatMessage::bot(FALLBACK_TEXT));
        self.activity.set_state(ConversationState::Failed);
        self.persist().await?;

        Ok(TurnOutcome::Failed { error })
    }

    async fn persist(&self) -> Result<()> {
        let snapshot: Vec<ChatMessage> = self
            .transcript
            .read()
            .await
            .iter()
            .map(ChatMessage::finalized)
            .collect();
        self.store.append_snapshot(&self.session_id, &snapshot).await
    }

    fn clear_failure(&self) {
        if self.activity.state() == ConversationState::Failed {
            self.activity.set_state(ConversationState::Idle);
        }
    }
}

/// Builds the prompt for `input`, folding in search results when present.
pub fn build_prompt(input: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("User query: {input}\n\nSearch results:\n{context}"),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use codepane_core::session::{Sender, SessionSummary};
    use codepane_infrastructure::{LocalChatStore, MemoryKeyValueStore};
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    struct GenerateCall {
        model: String,
        prompt: String,
        api_key: Option<String>,
    }

    /// Content service returning queued responses and recording calls.
    #[derive(Default)]
    struct MockContentService {
        responses: Mutex<VecDeque<Result<String>>>,
        search_result: Mutex<String>,
        search_delay: Duration,
        generate_calls: Mutex<Vec<GenerateCall>>,
        search_calls: Mutex<Vec<String>>,
    }

    impl MockContentService {
        fn respond(self, response: Result<String>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        fn search_returns(self, text: &str) -> Self {
            *self.search_result.lock().unwrap() = text.to_string();
            self
        }

        fn search_takes(mut self, delay: Duration) -> Self {
            self.search_delay = delay;
            self
        }

        fn generate_calls(&self) -> Vec<GenerateCall> {
            self.generate_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentService for MockContentService {
        async fn generate(&self, model: &str, prompt: &str, api_key: Option<&str>) -> Result<String> {
            self.generate_calls.lock().unwrap().push(GenerateCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                api_key: api_key.map(str::to_string),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".to_string()))
        }

        async fn search(&self, query: &str) -> String {
            self.search_calls.lock().unwrap().push(query.to_string());
            if !self.search_delay.is_zero() {
                tokio::time::sleep(self.search_delay).await;
            }
            self.search_result.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        shown: Mutex<Vec<String>>,
    }

    impl CodeDisplay for RecordingDisplay {
        fn show_code(&self, code: &str) {
            self.shown.lock().unwrap().push(code.to_string());
        }
    }

    struct Fixture {
        store: Arc<LocalChatStore>,
        content: Arc<MockContentService>,
        display: Arc<RecordingDisplay>,
    }

    impl Fixture {
        async fn new(content: MockContentService) -> Self {
            let store = LocalChatStore::open(Arc::new(MemoryKeyValueStore::new()))
                .await
                .unwrap();
            store.create_session("chat-1", "Test").await.unwrap();
            Self {
                store: Arc::new(store),
                content: Arc::new(content),
                display: Arc::new(RecordingDisplay::default()),
            }
        }

        async fn controller(&self) -> ConversationController {
            ConversationController::open(
                "chat-1",
                self.store.clone(),
                self.content.clone(),
                self.display.clone(),
                ConversationSettings {
                    typing_interval: Duration::from_millis(1),
                    ..ConversationSettings::default()
                },
            )
            .await
            .unwrap()
        }

        async fn stored(&self) -> Vec<ChatMessage> {
            self.store.get_messages("chat-1").await.unwrap()
        }
    }

    /// Chat store whose writes start failing after `writes_left` successes.
    struct FlakyChatStore {
        inner: LocalChatStore,
        writes_left: Mutex<usize>,
    }

    impl FlakyChatStore {
        async fn new(writes_left: usize) -> Self {
            let inner = LocalChatStore::open(Arc::new(MemoryKeyValueStore::new()))
                .await
                .unwrap();
            inner.create_session("chat-1", "Test").await.unwrap();
            Self {
                inner,
                writes_left: Mutex::new(writes_left),
            }
        }
    }

    #[async_trait]
    impl ChatStore for FlakyChatStore {
        async fn list_sessions(&self) -> Vec<SessionSummary> {
            self.inner.list_sessions().await
        }

        async fn create_session(&self, id: &str, title: &str) -> Result<()> {
            self.inner.create_session(id, title).await
        }

        async fn append_snapshot(&self, id: &str, messages: &[ChatMessage]) -> Result<()> {
            {
                let mut left = self.writes_left.lock().unwrap();
                if *left == 0 {
                    return Err(CodepaneError::io("quota"));
                }
                *left -= 1;
            }
            self.inner.append_snapshot(id, messages).await
        }

        async fn get_messages(&self, id: &str) -> Option<Vec<ChatMessage>> {
            self.inner.get_messages(id).await
        }

        async fn rename_session(&self, id: &str, title: &str) -> Result<()> {
            self.inner.rename_session(id, title).await
        }
    }

    async fn open_with_store(
        store: Arc<FlakyChatStore>,
        content: Arc<MockContentService>,
        display: Arc<RecordingDisplay>,
    ) -> ConversationController {
        ConversationController::open(
            "chat-1",
            store,
            content,
            display,
            ConversationSettings {
                typing_interval: Duration::from_millis(1),
                ..ConversationSettings::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_hello_world_turn() {
        let fixture = Fixture::new(MockContentService::default().respond(Ok("world".into()))).await;
        let mut controller = fixture.controller().await;
        assert_eq!(controller.greeting().await, Some(GREETING_TEXT));

        controller.set_input("hello");
        let outcome = controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Responded {
                message_index: 1,
                code: None
            }
        );
        assert_eq!(
            fixture.content.generate_calls(),
            vec![GenerateCall {
                model: "gemini-pro".into(),
                prompt: "hello".into(),
                api_key: None,
            }]
        );
        assert_eq!(controller.input(), "");

        let stored = fixture.stored().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].sender(), Sender::User);
        assert_eq!(stored[0].text(), "hello");
        assert_eq!(stored[1].sender(), Sender::Bot);
        assert_eq!(stored[1].text(), "world");
        assert_eq!(stored[1].displaying_text(), "world");

        controller.wait_for_typing(1).await;
        let transcript = controller.transcript().await;
        assert_eq!(transcript[1].displaying_text(), "world");
        assert_eq!(controller.state(), ConversationState::Idle);
        assert_eq!(controller.greeting().await, None);
    }

    #[tokio::test]
    async fn test_n_turns_alternate() {
        let fixture = Fixture::new(MockContentService::default()).await;
        let mut controller = fixture.controller().await;

        for i in 0..3 {
            controller.set_input(format!("question {i}"));
            controller.submit().await.unwrap();
        }

        let stored = fixture.stored().await;
        assert_eq!(stored.len(), 6);
        for (i, message) in stored.iter().enumerate() {
            let expected = if i % 2 == 0 { Sender::User } else { Sender::Bot };
            assert_eq!(message.sender(), expected);
        }
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let fixture = Fixture::new(MockContentService::default()).await;
        let mut controller = fixture.controller().await;

        for input in ["", "   ", "\n\t"] {
            controller.set_input(input);
            let err = controller.submit().await.unwrap_err();
            assert_eq!(err, CodepaneError::validation(EMPTY_MESSAGE_TEXT));
        }

        assert!(controller.transcript().await.is_empty());
        assert!(fixture.stored().await.is_empty());
        assert!(fixture.content.generate_calls().is_empty());
        assert_eq!(controller.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_failure_appends_one_fallback_and_recovers() {
        let content = MockContentService::default()
            .respond(Err(CodepaneError::request(Some(500), "HTTP error! status: 500")))
            .respond(Ok("recovered".into()));
        let fixture = Fixture::new(content).await;
        let mut controller = fixture.controller().await;

        controller.set_input("first");
        let outcome = controller.submit().await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Failed {
                error: CodepaneError::request(Some(500), "HTTP error! status: 500")
            }
        );
        assert_eq!(controller.state(), ConversationState::Failed);

        let transcript = controller.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text(), FALLBACK_TEXT);
        assert_eq!(transcript[1].displaying_text(), FALLBACK_TEXT);
        assert_eq!(fixture.stored().await, transcript);

        controller.set_input("second");
        assert_eq!(controller.state(), ConversationState::Idle);
        let outcome = controller.submit().await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Responded { message_index: 3, .. }));
        assert_eq!(fixture.stored().await[3].text(), "recovered");
    }

    #[tokio::test]
    async fn test_search_context_is_used_once() {
        let content = MockContentService::default().search_returns("a\nb");
        let fixture = Fixture::new(content).await;
        let mut controller = fixture.controller().await;

        controller.set_input("cats");
        assert_eq!(controller.search().await.unwrap(), "a\nb");
        assert_eq!(controller.input(), "cats");
        assert!(!controller.is_searching());
        assert_eq!(
            fixture.content.search_calls.lock().unwrap().clone(),
            vec!["cats".to_string()]
        );

        controller.submit().await.unwrap();
        controller.set_input("dogs");
        controller.submit().await.unwrap();

        let prompts: Vec<String> = fixture
            .content
            .generate_calls()
            .into_iter()
            .map(|call| call.prompt)
            .collect();
        assert_eq!(
            prompts,
            vec![
                "User query: cats\n\nSearch results:\na\nb".to_string(),
                "dogs".to_string()
            ]
        );
        assert_eq!(fixture.stored().await[0].text(), "cats");
        assert_eq!(controller.pending_context(), None);
    }

    #[tokio::test]
    async fn test_context_cleared_after_failed_turn() {
        let content = MockContentService::default()
            .search_returns("snippet")
            .respond(Err(CodepaneError::malformed("no candidates")));
        let fixture = Fixture::new(content).await;
        let mut controller = fixture.controller().await;

        controller.set_input("query");
        controller.search().await.unwrap();
        controller.submit().await.unwrap();

        assert_eq!(controller.pending_context(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_reports_search_in_flight() {
        let content = MockContentService::default()
            .search_returns("snippet")
            .search_takes(Duration::from_millis(100));
        let fixture = Fixture::new(content).await;
        let mut controller = fixture.controller().await;
        let activity = controller.activity();
        assert!(!activity.is_searching());

        controller.set_input("query");
        let search = tokio::spawn(async move {
            let result = controller.search().await.map(str::to_string);
            (controller, result)
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(activity.is_searching());
        assert_eq!(activity.state(), ConversationState::Idle);

        let (controller, result) = search.await.unwrap();
        assert_eq!(result.unwrap(), "snippet");
        assert!(!activity.is_searching());
        assert!(!controller.is_searching());
        assert_eq!(controller.pending_context(), Some("snippet"));
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected() {
        let fixture = Fixture::new(MockContentService::default()).await;
        let mut controller = fixture.controller().await;

        controller.set_input("  ");
        let err = controller.search().await.unwrap_err();
        assert_eq!(err.to_string(), EMPTY_SEARCH_TEXT);
        assert!(fixture.content.search_calls.lock().unwrap().is_empty());
        assert_eq!(controller.pending_context(), None);
    }

    #[tokio::test]
    async fn test_code_is_forwarded_to_display() {
        let reply = "Here:\n```rust\nfn main() {}\n```\nand\n```\nsecond\n```";
        let fixture = Fixture::new(MockContentService::default().respond(Ok(reply.into()))).await;
        let mut controller = fixture.controller().await;

        controller.set_input("write main");
        let outcome = controller.submit().await.unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Responded {
                message_index: 1,
                code: Some("fn main() {}".into())
            }
        );
        assert_eq!(
            fixture.display.shown.lock().unwrap().clone(),
            vec!["fn main() {}".to_string()]
        );
    }

    #[tokio::test]
    async fn test_model_and_key_are_sent() {
        let fixture = Fixture::new(MockContentService::default()).await;
        let mut controller = fixture.controller().await;

        controller.select_model("gemini-1.5-flash-8b");
        controller.set_api_key(Some("user-key".into()));
        controller.set_input("hi");
        controller.submit().await.unwrap();

        assert_eq!(
            fixture.content.generate_calls()[0],
            GenerateCall {
                model: "gemini-1.5-flash-8b".into(),
                prompt: "hi".into(),
                api_key: Some("user-key".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_reopen_shows_stored_log_in_full() {
        let fixture = Fixture::new(MockContentService::default().respond(Ok("long reply".into()))).await;
        {
            let mut controller = fixture.controller().await;
            controller.set_input("hello");
            controller.submit().await.unwrap();
        }

        let controller = fixture.controller().await;
        let transcript = controller.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert!(transcript.iter().all(ChatMessage::is_fully_revealed));
        assert_eq!(controller.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_open_unknown_session() {
        let fixture = Fixture::new(MockContentService::default()).await;
        let result = ConversationController::open(
            "missing",
            fixture.store.clone(),
            fixture.content.clone(),
            fixture.display.clone(),
            ConversationSettings::default(),
        )
        .await;

        assert!(matches!(result, Err(err) if err.is_not_found()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_responding_decays_to_idle() {
        let fixture = Fixture::new(MockContentService::default().respond(Ok("abc".into()))).await;
        let mut controller = ConversationController::open(
            "chat-1",
            fixture.store.clone(),
            fixture.content.clone(),
            fixture.display.clone(),
            ConversationSettings {
                typing_interval: Duration::from_millis(20),
                ..ConversationSettings::default()
            },
        )
        .await
        .unwrap();

        controller.set_input("go");
        controller.submit().await.unwrap();
        assert_eq!(
            controller.state(),
            ConversationState::Responding { message_index: 1 }
        );
        assert_eq!(controller.transcript().await[1].displaying_text(), "");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.state(), ConversationState::Idle);
        assert_eq!(controller.transcript().await[1].displaying_text(), "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_all_skips_animation() {
        let fixture = Fixture::new(MockContentService::default().respond(Ok("abcdef".into()))).await;
        let mut controller = fixture.controller().await;

        controller.set_input("go");
        controller.submit().await.unwrap();
        controller.reveal_all().await;

        assert_eq!(controller.transcript().await[1].displaying_text(), "abcdef");
        assert_eq!(controller.state(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn test_failed_user_write_keeps_input() {
        let store = Arc::new(FlakyChatStore::new(0).await);
        let content = Arc::new(MockContentService::default());
        let mut controller =
            open_with_store(store.clone(), content.clone(), Arc::new(RecordingDisplay::default())).await;

        controller.set_input("hi");
        let err = controller.submit().await.unwrap_err();

        assert_eq!(err, CodepaneError::io("quota"));
        assert_eq!(controller.input(), "hi");
        assert!(controller.transcript().await.is_empty());
        assert_eq!(controller.state(), ConversationState::Idle);
        assert!(content.generate_calls().is_empty());
        assert_eq!(store.get_messages("chat-1").await, Some(vec![]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reply_write_reveals_reply() {
        let store = Arc::new(FlakyChatStore::new(1).await);
        let content = Arc::new(
            MockContentService::default().respond(Ok("```\ncode\n```".into())),
        );
        let display = Arc::new(RecordingDisplay::default());
        let mut controller = open_with_store(store.clone(), content, display.clone()).await;

        controller.set_input("go");
        let err = controller.submit().await.unwrap_err();
        assert_eq!(err, CodepaneError::io("quota"));

        let transcript = controller.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert!(transcript[1].is_fully_revealed());
        assert_eq!(transcript[1].displaying_text(), "```\ncode\n```");
        assert_eq!(controller.state(), ConversationState::Idle);
        assert_eq!(controller.activity().state(), ConversationState::Idle);
        assert!(display.shown.lock().unwrap().is_empty());

        let stored = store.get_messages("chat-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text(), "go");
    }

    #[test]
    fn test_build_prompt() {
        assert_eq!(build_prompt("q", None), "q");
        assert_eq!(
            build_prompt("q", Some("r1\nr2")),
            "User query: q\n\nSearch results:\nr1\nr2"
        );
    }
}
