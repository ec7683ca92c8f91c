//! Models offered in the model selector.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Gemini models the conversation can be switched to.
///
/// The controller accepts any model name; this list is what the UI offers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
pub enum SupportedModel {
    #[default]
    #[strum(serialize = "gemini-pro")]
    GeminiPro,
    #[strum(serialize = "gemini-2.0-flash-exp")]
    Gemini20FlashExp,
    #[strum(serialize = "gemini-1.5-pro")]
    Gemini15Pro,
    #[strum(serialize = "gemini-2.0-flash-thinking-exp-1219")]
    Gemini20FlashThinkingExp,
    #[strum(serialize = "gemini-1.5-flash-8b")]
    Gemini15Flash8b,
}

impl SupportedModel {
    /// Model names in selector order.
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|m| m.as_str()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeminiPro => "gemini-pro",
            Self::Gemini20FlashExp => "gemini-2.0-flash-exp",
            Self::Gemini15Pro => "gemini-1.5-pro",
            Self::Gemini20FlashThinkingExp => "gemini-2.0-flash-thinking-exp-1219",
            Self::Gemini15Flash8b => "gemini-1.5-flash-8b",
        }
    }

    pub fn is_supported(name: &str) -> bool {
        name.parse::<Self>().is_ok()
    }
}
