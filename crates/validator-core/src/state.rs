//! UI-agnostic display state
//!
//! The transcript a front-end renders: the user's idea followed by the
//! critic's answer. Independent of any UI framework.

use serde::{Deserialize, Serialize};

use crate::idea::ValidIdea;

/// A message in the on-screen transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub text: String,
    /// True until the typewriter has shown the whole text.
    pub revealing: bool,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(id: i64, idea: &ValidIdea) -> Self {
        Self {
            id,
            role: ChatRole::User,
            text: format!(
                "Minha ideia que vai me deixar milionário, :\n\n{}\n\n{}",
                idea.display_title(),
                idea.description()
            ),
            revealing: false,
        }
    }

    pub fn assistant(id: i64, text: impl Into<String>, revealing: bool) -> Self {
        Self {
            id,
            role: ChatRole::Assistant,
            text: text.into(),
            revealing,
        }
    }
}
