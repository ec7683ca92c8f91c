//! Application layer: conversation turns, typing animation, the chat list
//! and the code panel.

pub mod code_panel;
pub mod conversation;
pub mod dashboard;
pub mod typing;

pub use code_panel::CodePanel;
pub use conversation::{
    ActivityHandle, ConversationController, ConversationSettings, ConversationState, TurnOutcome,
};
pub use dashboard::ChatDashboard;
pub use typing::{SharedTranscript, TypingAnimator};
