//! Typing animation for bot replies.
//!
//! Each animated message gets its own tokio task that reveals one character
//! of the message per tick until the whole text is visible. The stepping
//! itself is [`ChatMessage::reveal_next`]; this module only schedules it.

use codepane_core::session::ChatMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The in-memory message log shared between a conversation and its animations.
pub type SharedTranscript = Arc<RwLock<Vec<ChatMessage>>>;

struct Animation {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs reveal animations over a [`SharedTranscript`], keyed by message index.
///
/// Dropping the animator cancels every animation it started.
pub struct TypingAnimator {
    transcript: SharedTranscript,
    interval: Duration,
    root: CancellationToken,
    animations: HashMap<usize, Animation>,
}

impl TypingAnimator {
    pub fn new(transcript: SharedTranscript, interval: Duration) -> Self {
        Self {
            transcript,
            interval: interval.max(Duration::from_millis(1)),
            root: CancellationToken::new(),
            animations: HashMap::new(),
        }
    }

    /// Starts revealing the message at `index`.
    ///
    /// An animation already running for the same message is cancelled first;
    /// the new one continues from whatever is currently visible.
    pub fn start(&mut self, index: usize) {
        self.cancel(index);
        self.animations.retain(|_, animation| !animation.handle.is_finished());

        let token = self.root.child_token();
        let handle = tokio::spawn(run_animation(
            self.transcript.clone(),
            index,
            self.interval,
            token.clone(),
        ));

        tracing::debug!(index, interval_ms = self.interval.as_millis() as u64, "typing started");
        self.animations.insert(index, Animation { token, handle });
    }

    /// Stops the animation for `index`, leaving the message as far as it got.
    pub fn cancel(&mut self, index: usize) {
        if let Some(animation) = self.animations.remove(&index) {
            animation.token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, animation) in self.animations.drain() {
            animation.token.cancel();
        }
    }

    pub fn is_running(&self, index: usize) -> bool {
        self.animations
            .get(&index)
            .is_some_and(|animation| !animation.handle.is_finished())
    }

    pub fn has_running(&self) -> bool {
        self.animations
            .values()
            .any(|animation| !animation.handle.is_finished())
    }

    /// Waits until the animation for `index` has finished or was cancelled.
    pub async fn wait(&mut self, index: usize) {
        if let Some(animation) = self.animations.remove(&index) {
            if let Err(err) = animation.handle.await {
                tracing::warn!(index, error = %err, "typing task ended abnormally");
            }
        }
    }
}

impl Drop for TypingAnimator {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

async fn run_animation(
    transcript: SharedTranscript,
    index: usize,
    interval: Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(index, "typing cancelled");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let mut messages = transcript.write().await;
        let Some(message) = messages.get_mut(index) else {
            return;
        };
        if !message.reveal_next() || message.is_fully_revealed() {
            return;
        }
    }
}
