//! Telegram Integration - long-polling bot interface
//!
//! This crate provides the Telegram interface for vendy:
//! - **Wire Types** (`api`) - updates, messages, send payloads, inline keyboards
//! - **Transport** (`transport`) - Bot API HTTP client behind a trait seam
//! - **Long Polling** (`poller`) - `getUpdates` loop with reconnection logic
//! - **Commands** (`commands`) - `/start`, `/produtos`, callback buttons
//!
//! # Getting Started
//!
//! 1. Create a bot with @BotFather and copy the token
//! 2. Set `VENDY_TELEGRAM_BOT_TOKEN` (or legacy `TELEGRAM_TOKEN`)
//! 3. Run `vendy-server`; no public URL is needed, updates are polled
//!
//! # Architecture
//!
//! ```text
//! Telegram Updates → LongPollRunner → UpdateHandler → Dialogue Router
//!                         ↓
//!                  SendMessagePayload ← Reply (styled or plain)
//! ```

pub mod api;
pub mod commands;
pub mod poller;
pub mod transport;

pub use api::{
    Chat, InlineKeyboardButton, InlineKeyboardMarkup, IncomingMessage, ParseMode,
    SendMessagePayload, TelegramUser, Update,
};
pub use poller::{HandlerError, LongPollRunner, ReconnectPolicy, UpdateHandler};
pub use transport::{BotTransport, HttpBotTransport, NoopBotTransport, TransportError};
