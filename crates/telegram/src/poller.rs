use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{SendMessagePayload, Update};
use crate::transport::{BotTransport, TransportError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("update handler failure: {0}")]
    Failed(String),
}

/// Produces the outbound replies for one inbound update. Implementations
/// decide content and rendering mode; the runner owns delivery and
/// callback acknowledgment.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: &Update) -> Result<Vec<SendMessagePayload>, HandlerError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// `getUpdates` long-poll loop.
///
/// Tracks the update offset, hands each update to the handler, sends the
/// produced payloads, and acknowledges callback queries. Consecutive
/// transport failures back off exponentially and give up after
/// `max_retries`; any successful poll resets the counter.
pub struct LongPollRunner {
    transport: Arc<dyn BotTransport>,
    handler: Arc<dyn UpdateHandler>,
    reconnect_policy: ReconnectPolicy,
    poll_timeout_secs: u64,
}

impl LongPollRunner {
    pub fn new(
        transport: Arc<dyn BotTransport>,
        handler: Arc<dyn UpdateHandler>,
        reconnect_policy: ReconnectPolicy,
        poll_timeout_secs: u64,
    ) -> Self {
        Self { transport, handler, reconnect_policy, poll_timeout_secs }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), TransportError> {
        let mut offset: Option<i64> = None;
        let mut failed_attempts: u32 = 0;

        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let updates = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                    continue;
                }
                polled = self.transport.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match updates {
                Ok(updates) => {
                    failed_attempts = 0;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.process(&update).await;
                    }
                }
                Err(error) => {
                    failed_attempts += 1;
                    if failed_attempts > self.reconnect_policy.max_retries {
                        warn!(
                            attempts = failed_attempts,
                            error = %error,
                            "update polling failed too many times in a row; giving up"
                        );
                        return Err(error);
                    }
                    let delay = self.reconnect_policy.backoff(failed_attempts - 1);
                    warn!(
                        attempt = failed_attempts,
                        max_retries = self.reconnect_policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "update polling failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn process(&self, update: &Update) {
        if let Some(callback) = &update.callback_query {
            if let Err(error) = self.transport.answer_callback(&callback.id).await {
                warn!(callback_id = %callback.id, error = %error, "failed to acknowledge callback");
            }
        }

        let payloads = match self.handler.handle(update).await {
            Ok(payloads) => payloads,
            Err(error) => {
                warn!(update_id = update.update_id, error = %error, "update handler failed");
                return;
            }
        };

        for payload in payloads {
            debug!(chat_id = payload.chat_id, styled = payload.parse_mode.is_some(), "sending reply");
            if let Err(error) = self.transport.send_message(&payload).await {
                warn!(chat_id = payload.chat_id, error = %error, "failed to send reply");
            }
        }
    }
}
