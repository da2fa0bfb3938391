use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vendy_core::config::LlmConfig;
use vendy_core::domain::message::ChatTurn;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion service returned status {0}")]
    Status(u16),
    #[error("completion response carried no choices")]
    EmptyChoices,
}

/// One request/response round trip against the completion service.
///
/// Implementations make exactly one attempt; retry policy is deliberately
/// the caller's problem (and the caller's policy is "no retries").
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, CompletionError>;
}

/// Chat-completions client for any OpenAI-compatible endpoint; DeepSeek in
/// the production configuration.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpCompletionClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyChoices)
    }
}

#[cfg(test)]
mod tests {
    use vendy_core::config::LlmConfig;
    use vendy_core::domain::message::ChatTurn;

    use super::{ChatCompletionRequest, ChatCompletionResponse, HttpCompletionClient};

    fn config_fixture() -> LlmConfig {
        LlmConfig {
            base_url: "https://api.deepseek.com/".to_string(),
            api_key: "sk-test".to_string().into(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 30,
        }
    }

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let client = HttpCompletionClient::from_config(&config_fixture()).expect("build client");
        assert_eq!(client.endpoint(), "https://api.deepseek.com/v1/chat/completions");
    }

    #[test]
    fn request_payload_matches_the_chat_completions_wire_format() {
        let turns = vec![ChatTurn::system("instrução"), ChatTurn::user("oi")];
        let payload = ChatCompletionRequest {
            model: "deepseek-chat",
            messages: &turns,
            temperature: 0.7,
            max_tokens: 1000,
        };

        let json = serde_json::to_value(&payload).expect("serialize payload");

        assert_eq!(json["model"], "deepseek-chat");
        let temperature = json["temperature"].as_f64().unwrap_or_default();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "oi");
    }

    #[test]
    fn response_body_decodes_down_to_the_first_choice_content() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"olá!"},"finish_reason":"stop"}]}"#,
        )
        .expect("decode response");

        assert_eq!(body.choices[0].message.content, "olá!");
    }
}
