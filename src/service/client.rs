//! Chat-completions client for the generation service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GenerationMode;
use crate::utils::error::{TutorError, TutorResult};

#[cfg(not(target_arch = "wasm32"))]
use {
    super::{prompts, TextGenerator},
    crate::config::ServiceConfig,
    std::time::Duration,
    tracing::{info, warn},
};

/// Chat API request
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Chat API response
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Turn a raw HTTP status and body into generated text.
///
/// A non-success status yields `API Error: {status} - {message}`, where the
/// message comes from the body's `message` or `error.message` field.
pub fn parse_chat_response(status: u16, body: &str) -> TutorResult<String> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error").and_then(|e| e.get("message")))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(TutorError::service(format!(
            "API Error: {} - {}",
            status, message
        )));
    }

    let response: ChatResponse =
        serde_json::from_str(body).map_err(|_| TutorError::InvalidResponse)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(TutorError::InvalidResponse)
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    api_key: String,
    config: ServiceConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl ChatClient {
    /// # Errors
    /// Returns a config error when no API key is configured, or when the
    /// HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> TutorResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TutorError::config(format!(
                "no API key for the generation service (set {})",
                crate::config::ENV_API_KEY
            ))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TutorError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            config: config.clone(),
        })
    }

    fn build_request(&self, problem: &str, mode: GenerationMode) -> ChatRequest {
        let max_tokens = match mode {
            GenerationMode::Hint => self.config.hint_max_tokens,
            GenerationMode::Solution => self.config.solution_max_tokens,
        };
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompts::system_prompt(mode).to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompts::user_prompt(mode, problem),
                },
            ],
            max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Send one chat completion request.
    pub async fn complete(&self, problem: &str, mode: GenerationMode) -> TutorResult<String> {
        let request = self.build_request(problem, mode);
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        info!(%mode, model = %self.config.model, "requesting generation");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TutorError::service(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TutorError::service(e.to_string()))?;

        parse_chat_response(status, &body)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TextGenerator for ChatClient {
    async fn generate(&self, problem: &str, mode: GenerationMode) -> TutorResult<String> {
        self.complete(problem, mode).await.map_err(|err| {
            warn!(%mode, error = %err, "generation failed");
            err.in_action(&mode.action())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_returns_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Try $u$-substitution."}}]}"#;
        assert_eq!(
            parse_chat_response(200, body).expect("ok"),
            "Try $u$-substitution."
        );
    }

    #[test]
    fn test_status_error_uses_body_message() {
        let err = parse_chat_response(429, r#"{"message":"rate limited"}"#).unwrap_err();
        assert_eq!(err.to_string(), "API Error: 429 - rate limited");

        let err = parse_chat_response(401, r#"{"error":{"message":"bad key"}}"#).unwrap_err();
        assert_eq!(err.to_string(), "API Error: 401 - bad key");
    }

    #[test]
    fn test_status_error_without_body() {
        let err = parse_chat_response(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), "API Error: 502 - Unknown error");
    }

    #[test]
    fn test_missing_choices_is_invalid() {
        for body in [r#"{}"#, r#"{"choices":[]}"#, r#"{"choices":[{}]}"#, "not json"] {
            let err = parse_chat_response(200, body).unwrap_err();
            assert!(matches!(err, TutorError::InvalidResponse), "body: {}", body);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_client_requires_api_key() {
        let err = ChatClient::new(&ServiceConfig::default()).unwrap_err();
        assert!(matches!(err, TutorError::Config { .. }));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_request_uses_mode_token_budget() {
        let config = ServiceConfig {
            api_key: Some("k".into()),
            ..ServiceConfig::default()
        };
        let client = ChatClient::new(&config).expect("client");
        let hint = client.build_request("p", GenerationMode::Hint);
        let solution = client.build_request("p", GenerationMode::Solution);
        assert_eq!(hint.max_tokens, 200);
        assert_eq!(solution.max_tokens, 1000);
        assert_eq!(hint.messages.len(), 2);
        assert_eq!(hint.messages[0].role, "system");
    }
}
