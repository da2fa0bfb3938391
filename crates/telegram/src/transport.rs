use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{SendMessagePayload, Update};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("telegram api rejected the call: {0}")]
    Api(String),
}

/// The Bot API surface the runner needs. Delivery acknowledgment and
/// transport-level retries are Telegram's side of the contract, not ours.
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError>;

    async fn send_message(&self, payload: &SendMessagePayload) -> Result<(), TransportError>;

    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), TransportError>;
}

pub struct HttpBotTransport {
    http: reqwest::Client,
    base_url: String,
    bot_token: SecretString,
}

impl HttpBotTransport {
    pub fn new(bot_token: SecretString) -> Result<Self, TransportError> {
        Self::with_base_url(bot_token, TELEGRAM_API_BASE)
    }

    pub fn with_base_url(
        bot_token: SecretString,
        base_url: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.bot_token.expose_secret())
    }

    async fn call<R, P>(&self, method: &str, payload: &P) -> Result<R, TransportError>
    where
        R: for<'de> Deserialize<'de> + Default,
        P: Serialize + Sync,
    {
        let response = self.http.post(self.method_url(method)).json(payload).send().await?;
        let envelope: ApiEnvelope<R> = response.json().await?;

        if !envelope.ok {
            return Err(TransportError::Api(
                envelope.description.unwrap_or_else(|| format!("{method} returned ok=false")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Api(format!("{method} returned no result")))
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackPayload<'a> {
    callback_query_id: &'a str,
}

#[async_trait]
impl BotTransport for HttpBotTransport {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call("getUpdates", &GetUpdatesPayload { offset, timeout: timeout_secs }).await
    }

    async fn send_message(&self, payload: &SendMessagePayload) -> Result<(), TransportError> {
        self.call::<serde_json::Value, _>("sendMessage", payload).await.map(|_| ())
    }

    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), TransportError> {
        self.call::<serde_json::Value, _>(
            "answerCallbackQuery",
            &AnswerCallbackPayload { callback_query_id },
        )
        .await
        .map(|_| ())
    }
}

/// Transport that accepts everything and receives nothing; used as a
/// scaffold target and in tests that never reach the network.
#[derive(Default)]
pub struct NoopBotTransport;

#[async_trait]
impl BotTransport for NoopBotTransport {
    async fn get_updates(
        &self,
        _offset: Option<i64>,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        Ok(Vec::new())
    }

    async fn send_message(&self, _payload: &SendMessagePayload) -> Result<(), TransportError> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_query_id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}
