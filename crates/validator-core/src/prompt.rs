//! Chat-completion payload construction.

use serde::{Deserialize, Serialize};

use crate::idea::{ToneLevel, ValidIdea};

pub const SYSTEM_PROMPT: &str = "Você é um crítico de ideias SaaS com humor ácido e ironia afiada. \
Sua missão é zoar, tirar sarro e fazer piadas sobre qualquer ideia apresentada, sem papas na língua. \
Seja engraçado, sarcástico e criativo. Responda sempre em português brasileiro, sem ser sério nem construtivo.";

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperaturePolicy {
    /// Derived from the tone slider, see [`ToneLevel::temperature`].
    FromTone,
    Fixed(f64),
}

impl TemperaturePolicy {
    pub fn resolve(self, tone: ToneLevel) -> f64 {
        match self {
            TemperaturePolicy::FromTone => tone.temperature(),
            TemperaturePolicy::Fixed(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: TemperaturePolicy,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: TemperaturePolicy::FromTone,
        }
    }
}

pub fn user_prompt(idea: &ValidIdea, tone: ToneLevel) -> String {
    format!(
        "Analise esta ideia de SaaS:\nTítulo: {}\nDescrição: {}\nNível de sarcasmo: {}/10",
        idea.display_title(),
        idea.description(),
        tone
    )
}

pub fn build_request(idea: &ValidIdea, tone: ToneLevel, settings: &RequestSettings) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: vec![
            PromptMessage::new("system", SYSTEM_PROMPT),
            PromptMessage::new("user", user_prompt(idea, tone)),
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature.resolve(tone),
    }
}
