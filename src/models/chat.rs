//! Chat turns and the HTTP request/response bodies built from them.

use serde::{Deserialize, Serialize};

/// Role of a human turn in `chat_history`.
pub const ROLE_HUMAN: &str = "human";
/// Role of an agent turn in `chat_history`.
pub const ROLE_AI: &str = "ai";

/// One entry of the caller-held conversation history.
///
/// Extra keys are kept so history round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_HUMAN.to_string(),
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_AI.to_string(),
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Body of the chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

/// Reply of the chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub agent_output: String,
    pub chat_history: Vec<ChatMessage>,
}

impl ChatResponse {
    /// Append the (human, ai) pair for this turn to the caller's history.
    pub fn from_turn(mut history: Vec<ChatMessage>, user_input: &str, agent_output: String) -> Self {
        history.push(ChatMessage::human(user_input));
        history.push(ChatMessage::ai(agent_output.clone()));
        Self {
            agent_output,
            chat_history: history,
        }
    }
}

/// Body of the document Q&A endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    pub question: String,
}

/// Reply of the document Q&A endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_turn_appends_human_then_ai() {
        let history = vec![ChatMessage::human("hi"), ChatMessage::ai("hello")];
        let response = ChatResponse::from_turn(history, "list users", "- Ana (ana@x.io)".to_string());

        assert_eq!(response.chat_history.len(), 4);
        assert_eq!(response.chat_history[2], ChatMessage::human("list users"));
        assert_eq!(response.chat_history[3].role, ROLE_AI);
        assert_eq!(response.chat_history[3].content, response.agent_output);
    }

    #[test]
    fn test_history_keeps_unknown_keys() {
        let raw = r#"{"user_input":"x","chat_history":[{"role":"human","content":"a","ts":42}]}"#;
        let request: ChatRequest = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&request.chat_history[0]).unwrap();
        assert_eq!(back["ts"], 42);
    }

    #[test]
    fn test_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"user_input":"hello"}"#).unwrap();
        assert!(request.chat_history.is_empty());
    }
}
