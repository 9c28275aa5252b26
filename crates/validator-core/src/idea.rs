//! The idea form: raw input, validation and the sarcasm tone control.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubmitError};

/// Title shown and sent when the user only wrote a description.
pub const UNTITLED: &str = "Sem título";

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaSubmission {
    pub title: String,
    pub description: String,
}

impl IdeaSubmission {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Trims both fields and requires at least one of them to be non-empty.
    pub fn validate(&self) -> Result<ValidIdea> {
        let title = self.title.trim();
        let description = self.description.trim();

        if title.is_empty() && description.is_empty() {
            return Err(SubmitError::EmptyIdea);
        }

        Ok(ValidIdea {
            title: title.to_string(),
            description: description.to_string(),
        })
    }
}

/// An idea that passed validation. Fields are already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidIdea {
    title: String,
    description: String,
}

impl ValidIdea {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

/// Requested sarcasm level, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct ToneLevel(u8);

impl ToneLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamps out-of-range values instead of rejecting them, like a slider would.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn raise(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn lower(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// `min(1.2, 0.1 + tone/10 * 1.1)`, rounded to two decimals.
    pub fn temperature(self) -> f64 {
        let raw = (0.1 + f64::from(self.0) / 10.0 * 1.1).min(1.2);
        (raw * 100.0).round() / 100.0
    }
}

impl Default for ToneLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl From<u8> for ToneLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<ToneLevel> for u8 {
    fn from(tone: ToneLevel) -> Self {
        tone.0
    }
}

impl std::fmt::Display for ToneLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
