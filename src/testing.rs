//! Shared fakes for unit tests: a local chat-completions stub and a
//! keyword embedder.

use crate::embedding::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Canned completions served in order; request bodies are recorded.
#[derive(Default)]
pub struct StubModel {
    pub replies: Mutex<Vec<Value>>,
    pub requests: Mutex<Vec<Value>>,
}

async fn completions(State(stub): State<Arc<StubModel>>, Json(body): Json<Value>) -> Json<Value> {
    stub.requests.lock().unwrap().push(body);
    let mut replies = stub.replies.lock().unwrap();
    let reply = if replies.is_empty() {
        text_reply("out of replies")
    } else {
        replies.remove(0)
    };
    Json(reply)
}

fn completion(message: Value, finish_reason: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 0,
        "model": "stub",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason
        }]
    })
}

pub fn text_reply(content: &str) -> Value {
    completion(json!({"role": "assistant", "content": content}), "stop")
}

pub fn tool_reply(name: &str, arguments: &str) -> Value {
    completion(
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": name, "arguments": arguments}
            }]
        }),
        "tool_calls",
    )
}

/// Serve `replies` on a random local port; returns the base URL.
pub async fn spawn_stub(replies: Vec<Value>) -> (String, Arc<StubModel>) {
    let stub = Arc::new(StubModel {
        replies: Mutex::new(replies),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stub)
}

/// Embeds text as keyword counts over a fixed vocabulary.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .map(|word| lower.matches(word.as_str()).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}
