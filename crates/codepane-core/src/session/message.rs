//! Chat message types.
//!
//! A [`ChatMessage`] carries the final text of a turn together with the prefix
//! of it that is currently visible. Bot replies start with an empty visible
//! prefix and are revealed one character at a time by the typing animation.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Message produced by the generative model (or the fallback on failure).
    Bot,
}

/// A single message in a chat log.
///
/// `displaying_text` is always a prefix of `text` on a character boundary and
/// only ever grows. The fields are private so that invariant cannot be broken
/// from outside; stored records go through [`ChatMessageRecord`] on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ChatMessageRecord")]
pub struct ChatMessage {
    sender: Sender,
    text: String,
    displaying_text: String,
}

impl ChatMessage {
    /// A user message, fully visible from the start.
    pub fn user(text: impl Into<String>) -> Self {
        Self::revealed(Sender::User, text.into())
    }

    /// A bot message whose text is hidden until the typing animation reveals it.
    pub fn bot_pending(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            displaying_text: String::new(),
        }
    }

    /// A bot message that is shown in full immediately.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::revealed(Sender::Bot, text.into())
    }

    fn revealed(sender: Sender, text: String) -> Self {
        Self {
            sender,
            displaying_text: text.clone(),
            text,
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn displaying_text(&self) -> &str {
        &self.displaying_text
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.displaying_text.len() == self.text.len()
    }

    /// Number of characters currently visible.
    pub fn revealed_chars(&self) -> usize {
        self.displaying_text.chars().count()
    }

    /// Reveals one more character. Returns `false` once nothing is left to reveal.
    pub fn reveal_next(&mut self) -> bool {
        match self.text[self.displaying_text.len()..].chars().next() {
            Some(ch) => {
                self.displaying_text.push(ch);
                true
            }
            None => false,
        }
    }

    /// Makes the whole text visible.
    pub fn reveal_all(&mut self) {
        if !self.is_fully_revealed() {
            self.displaying_text = self.text.clone();
        }
    }

    /// Returns a copy with the whole text visible.
    ///
    /// Stored logs only ever hold finished messages; the animation is a
    /// display effect on top of them.
    pub fn finalized(&self) -> Self {
        let mut message = self.clone();
        message.reveal_all();
        message
    }
}

/// On-disk shape of a message. `displayingText` is optional because user
/// messages have historically been stored without it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRecord {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub displaying_text: Option<String>,
}

impl From<ChatMessageRecord> for ChatMessage {
    fn from(record: ChatMessageRecord) -> Self {
        let displaying_text = match record.displaying_text {
            Some(prefix) if record.text.starts_with(prefix.as_str()) => prefix,
            Some(_) => {
                tracing::debug!("stored displayingText is not a prefix of text; showing full text");
                record.text.clone()
            }
            None => record.text.clone(),
        };

        Self {
            sender: record.sender,
            text: record.text,
            displaying_text,
        }
    }
}
