//! OpenAI-compatible chat completions client
//!
//! Works against any endpoint speaking the Chat Completions protocol; the
//! default configuration points at Gemini's OpenAI-compatible API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a client from configuration, reading the API key from the environment
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "OpenAIClient::from_config: called");
        let api_key =
            std::env::var(&config.api_key_env).map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for the chat completions API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];
        messages.extend(request.messages.iter().map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        }));

        let max_tokens = request.max_tokens.min(self.max_tokens);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
        });

        if request.json_mode {
            debug!("build_request_body: json mode");
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    fn parse_response(&self, api_response: OpenAIResponse) -> CompletionResponse {
        debug!(choices = api_response.choices.len(), "parse_response: called");
        let (content, stop_reason) = match api_response.choices.into_iter().next() {
            Some(c) => {
                let stop_reason = match c.finish_reason.as_deref() {
                    Some("length") => StopReason::MaxTokens,
                    Some("content_filter") => StopReason::ContentFilter,
                    _ => StopReason::EndTurn,
                };
                (c.message.content, stop_reason)
            }
            None => (None, StopReason::EndTurn),
        };

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        CompletionResponse {
            content,
            stop_reason,
            usage,
        }
    }
}

/// What to do after one HTTP attempt
enum Attempt {
    Done(CompletionResponse),
    /// Transient failure; worth another try after backoff
    Retry(LlmError),
    Fail(LlmError),
}

/// Short server-requested waits are honoured inline; longer ones are returned
const MAX_INLINE_RETRY_AFTER: Duration = Duration::from_secs(5);

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(INITIAL_BACKOFF_MS << attempt.saturating_sub(1).min(6))
}

impl OpenAIClient {
    async fn attempt(&self, url: &str, body: &serde_json::Value) -> Attempt {
        let sent = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Attempt::Retry(LlmError::Timeout(self.timeout)),
            Err(e) => return Attempt::Retry(LlmError::Network(e)),
        };

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map_or(Duration::from_secs(60), Duration::from_secs);
            debug!(?retry_after, "OpenAIClient::attempt: rate limited");
            let err = LlmError::RateLimited { retry_after };
            return if retry_after <= MAX_INLINE_RETRY_AFTER {
                Attempt::Retry(err)
            } else {
                Attempt::Fail(err)
            };
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "OpenAIClient::attempt: api error");
            let err = LlmError::ApiError { status, message };
            return if is_retryable_status(status) {
                Attempt::Retry(err)
            } else {
                Attempt::Fail(err)
            };
        }

        match response.json::<OpenAIResponse>().await {
            Ok(api_response) => Attempt::Done(self.parse_response(api_response)),
            Err(e) => Attempt::Fail(LlmError::InvalidResponse(format!("undecodable completion: {}", e))),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, json_mode = request.json_mode, "OpenAIClient::complete: called");
        let url = self.endpoint();
        let body = self.build_request_body(&request);

        let mut attempt = 0;
        loop {
            match self.attempt(&url, &body).await {
                Attempt::Done(response) => {
                    debug!(attempt, tokens = response.usage.total(), "OpenAIClient::complete: success");
                    return Ok(response);
                }
                Attempt::Fail(err) => return Err(err),
                Attempt::Retry(err) if attempt >= MAX_RETRIES => {
                    warn!(error = %err, "OpenAIClient::complete: giving up after retries");
                    return Err(err);
                }
                Attempt::Retry(err) => {
                    attempt += 1;
                    let delay = err.retry_after().unwrap_or_else(|| backoff(attempt));
                    warn!(attempt, error = %err, delay_ms = delay.as_millis() as u64, "OpenAIClient::complete: retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

// Chat completions response types

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn client(max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: "gemini-2.0-flash".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            http: Client::new(),
            max_tokens,
            temperature: 0.3,
            timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest {
            system_prompt: "You are a travel planner".to_string(),
            messages: vec![Message::user("Plan Tokyo")],
            max_tokens: 1000,
            json_mode: false,
        };

        let body = client(4000).build_request_body(&request);

        assert_eq!(body["model"], "gemini-2.0-flash");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a travel planner");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_max_tokens_capped_and_json_mode() {
        let request = CompletionRequest::single("Test", "hi", 5000).with_json_mode();
        let body = client(1000).build_request_body(&request);
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client(1000).endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(1000));
        assert_eq!(backoff(2), Duration::from_millis(2000));
        assert_eq!(backoff(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_parse_response() {
        let api: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "{\"days\": []}"}, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        }))
        .unwrap();

        let response = client(1000).parse_response(api);
        assert_eq!(response.content.as_deref(), Some("{\"days\": []}"));
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
        assert_eq!(response.usage.total(), 16);
    }
}
