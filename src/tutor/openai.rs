use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{subject_prompt, ChatRequest, CompletionClient, TutorError};
use crate::config::TutorConfig;

pub const MODEL: &str = "gpt-4o-mini";

const CLOSING_INSTRUCTIONS: &str = "Siempre responde en español de forma clara, amigable y educativa. Usa emojis ocasionalmente para hacer tus respuestas más atractivas. Mantén tus respuestas concisas pero completas.";

pub struct OpenAiClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    http: reqwest::blocking::Client,
}

impl OpenAiClient {
    pub fn new(config: &TutorConfig) -> Result<Self, TutorError> {
        Ok(Self {
            endpoint: config.openai_endpoint.clone(),
            api_key: config.openai_api_key.clone(),
            timeout_secs: config.timeout_secs,
            http: build_http(config.timeout_secs)?,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<String, TutorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TutorError::MissingApiKey("OPENAI_API_KEY"))?;

        let body = json!({
            "model": MODEL,
            "messages": build_messages(request),
            "temperature": 0.7,
            "max_tokens": 500,
        });
        post_chat(&self.http, &self.endpoint, api_key, &body, self.timeout_secs)
    }
}

/// System prompt for the subject and learner, then history, then the new
/// message.
pub fn build_messages(request: &ChatRequest<'_>) -> Vec<Value> {
    let greeting = if request.child_name.trim().is_empty() {
        String::new()
    } else {
        format!("El estudiante se llama {}. ", request.child_name.trim())
    };
    let system = format!(
        "{} {}{}",
        subject_prompt(request.subject),
        greeting,
        CLOSING_INSTRUCTIONS
    );

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(json!({ "role": "system", "content": system }));
    messages.extend(
        request
            .history
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content })),
    );
    messages.push(json!({ "role": "user", "content": request.message }));
    messages
}

pub(crate) fn build_http(timeout_secs: u64) -> Result<reqwest::blocking::Client, TutorError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TutorError::Http(format!("no se pudo crear el cliente: {}", e)))
}

/// POSTs to an OpenAI-compatible `/v1/chat/completions` endpoint.
pub(crate) fn post_chat(
    http: &reqwest::blocking::Client,
    endpoint: &str,
    api_key: &str,
    body: &Value,
    timeout_secs: u64,
) -> Result<String, TutorError> {
    let url = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));
    debug!(url = %url, "sending chat completion");

    let response = http
        .post(&url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .map_err(|e| {
            if e.is_timeout() {
                TutorError::Timeout(timeout_secs)
            } else {
                TutorError::Http(e.to_string())
            }
        })?;

    let status = response.status();
    // Error bodies are best effort; a non-JSON body still maps by status.
    let payload: Value = response.json().unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(classify_failure(status.as_u16(), &payload));
    }
    extract_reply(&payload)
}

pub fn classify_failure(status: u16, payload: &Value) -> TutorError {
    let error = payload.get("error");
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match (status, code) {
        (_, "insufficient_quota") => TutorError::QuotaExceeded,
        (_, "invalid_api_key") | (401, _) => TutorError::InvalidApiKey,
        _ => {
            let message = error
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("sin detalles");
            TutorError::Http(format!("{}: {}", status, message))
        }
    }
}

pub fn extract_reply(payload: &Value) -> Result<String, TutorError> {
    let choices = payload
        .get("choices")
        .ok_or_else(|| TutorError::InvalidResponse("sin 'choices'".to_string()))?;

    let text = choices
        .get(0)
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TutorError::EmptyResponse);
    }
    Ok(text.to_string())
}
