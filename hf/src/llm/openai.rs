//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// OpenAI API client
pub struct OpenAIClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(provider = %config.provider, model = %config.model, "from_config: called");
        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Build the request body for the OpenAI API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, message_count = %request.messages.len(), "build_request_body: called");
        let max_tokens = request.max_tokens.unwrap_or(self.max_tokens);

        // GPT-5.x and o1/o3 models use max_completion_tokens instead of max_tokens
        let uses_completion_tokens =
            self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3");

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });

        if uses_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        } else {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    /// Parse the OpenAI API response
    fn parse_response(&self, api_response: OpenAIResponse) -> Result<CompletionResponse, LlmError> {
        debug!(choice_count = %api_response.choices.len(), "parse_response: called");
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content,
            stop_reason: StopReason::from_openai(choice.finish_reason.as_deref()),
            usage,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else if e.is_decode() {
            LlmError::InvalidResponse(format!("undecodable response body: {e}"))
        } else {
            LlmError::Network(e)
        }
    }

    /// One HTTP round trip, no retries
    async fn send_once(&self, url: &str, body: &serde_json::Value) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();

        if status == 429 {
            debug!("send_once: rate limited (429)");
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "send_once: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let api_response: OpenAIResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        self.parse_response(api_response)
    }
}

/// Whether a failed attempt gets another try
fn should_retry(error: &LlmError, attempt: u32) -> bool {
    attempt < MAX_RETRIES && error.is_retryable()
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, temperature = %request.temperature, "complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "complete: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match self.send_once(&url, &body).await {
                Ok(parsed) => {
                    if parsed.stop_reason != StopReason::EndTurn {
                        info!(stop_reason = ?parsed.stop_reason, "complete: reply cut short");
                    }
                    debug!(
                        input_tokens = parsed.usage.input_tokens,
                        output_tokens = parsed.usage.output_tokens,
                        "complete: success"
                    );
                    return Ok(parsed);
                }
                Err(e) if should_retry(&e, attempt) => {
                    debug!(attempt, error = %e, "complete: transient failure");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// OpenAI API response types

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

    fn client(model: &str, max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: model.to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            max_tokens,
            timeout: Duration::from_secs(60),
        }
    }

    fn client_with_limit(max_tokens: u32) -> OpenAIClient {
        client("gpt-4o-mini", max_tokens)
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = client("gpt-4o-mini", 1024);
        let request = CompletionRequest::conversational(
            vec![Message::system("You are a travel guide"), Message::user("Hello")],
            0.7,
        );

        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a travel guide");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_max_tokens_follow_config() {
        let client = client("gpt-4o-mini", 256);
        let body = client.build_request_body(&CompletionRequest::deterministic(vec![]));
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["temperature"], 0.0);

        let client = client_with_limit(4096);
        let body = client.build_request_body(&CompletionRequest::conversational(vec![Message::user("Hi")], 0.7));
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_request_limit_overrides_config() {
        let client = client_with_limit(4096);
        let mut request = CompletionRequest::deterministic(vec![]);
        request.max_tokens = Some(64);
        assert_eq!(client.build_request_body(&request)["max_tokens"], 64);
    }

    #[test]
    fn test_should_retry() {
        let unavailable = LlmError::ApiError {
            status: 503,
            message: String::new(),
        };
        assert!(should_retry(&unavailable, 0));
        assert!(should_retry(&unavailable, MAX_RETRIES - 1));
        assert!(!should_retry(&unavailable, MAX_RETRIES));

        let limited = LlmError::RateLimited {
            retry_after: Duration::from_secs(60),
        };
        assert!(!should_retry(&limited, 0));
        assert!(!should_retry(&LlmError::InvalidResponse("no choices".to_string()), 0));
    }

    #[test]
    fn test_completion_tokens_for_reasoning_models() {
        let client = client("o3-mini", 1024);
        let body = client.build_request_body(&CompletionRequest::deterministic(vec![]));
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["max_completion_tokens"], 1024);
    }

    #[test]
    fn test_parse_response() {
        let client = client("gpt-4o-mini", 1024);
        let api: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Seaside Cottage"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }))
        .unwrap();

        let resp = client.parse_response(api).unwrap();
        assert_eq!(resp.content.as_deref(), Some("Seaside Cottage"));
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.output_tokens, 3);
    }

    #[test]
    fn test_parse_response_without_choices_is_invalid() {
        let client = client("gpt-4o-mini", 1024);
        let api: OpenAIResponse = serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(client.parse_response(api), Err(LlmError::InvalidResponse(_))));
    }
}
