use serde_json::json;

use super::openai::{build_http, post_chat};
use super::{ChatRequest, CompletionClient, TutorError};
use crate::config::TutorConfig;

pub const MODEL: &str = "llama-3.1-8b-instant";

/// Groq's OpenAI-compatible endpoint. Only the learner's message is sent,
/// without history or a system prompt.
pub struct GroqClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    http: reqwest::blocking::Client,
}

impl GroqClient {
    pub fn new(config: &TutorConfig) -> Result<Self, TutorError> {
        Ok(Self {
            endpoint: config.groq_endpoint.clone(),
            api_key: config.groq_api_key.clone(),
            timeout_secs: config.timeout_secs,
            http: build_http(config.timeout_secs)?,
        })
    }
}

impl CompletionClient for GroqClient {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<String, TutorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TutorError::MissingApiKey("GROQ_API_KEY"))?;

        post_chat(
            &self.http,
            &self.endpoint,
            api_key,
            &request_body(request.message),
            self.timeout_secs,
        )
    }
}

fn request_body(message: &str) -> serde_json::Value {
    json!({
        "model": MODEL,
        "messages": [{ "role": "user", "content": message }],
        "temperature": 1,
        "max_completion_tokens": 512,
        "top_p": 1,
    })
}
