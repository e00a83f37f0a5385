use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling knobs exposed by "try it yourself" panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingSettings {
    pub model_name: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 256,
        }
    }
}

impl SamplingSettings {
    /// Clamp values into the ranges completion APIs accept.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.top_p = self.top_p.clamp(0.0, 1.0);
        self.max_tokens = self.max_tokens.clamp(1, 4096);
        self
    }
}

/// Request handed to the text-completion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model_name: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(settings: &SamplingSettings, messages: Vec<ChatMessage>) -> Self {
        let settings = settings.clone().normalized();
        Self {
            model_name: settings.model_name,
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let settings = SamplingSettings {
            model_name: "m".into(),
            temperature: 5.0,
            top_p: -1.0,
            max_tokens: 0,
        }
        .normalized();
        assert!((settings.temperature - 2.0).abs() < f32::EPSILON);
        assert!(settings.top_p.abs() < f32::EPSILON);
        assert_eq!(settings.max_tokens, 1);
    }

    #[test]
    fn request_keeps_message_order() {
        let request = CompletionRequest::new(
            &SamplingSettings::default(),
            vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
        );
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[1].content, "hi");
    }
}
