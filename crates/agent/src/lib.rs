//! Dialogue Brain - catalog-first routing with a completion-service fallback
//!
//! This crate decides what the bot says:
//! - **Intent Classification** (`intent`) - currency inquiry vs. generic catalog query
//! - **Dialogue Router** (`runtime`) - lookup, format, persist, fall back to the LLM
//! - **Completion Client** (`llm`) - OpenAI-compatible chat-completions call
//! - **Prompts** (`prompt`) - the fixed sales-assistant instruction and canned replies
//!
//! # Routing Principle
//!
//! The completion service is strictly a fallback. Whenever the catalog
//! answers a question, the reply is assembled deterministically from store
//! rows and the LLM is never invoked.

pub mod intent;
pub mod llm;
pub mod prompt;
pub mod runtime;

pub use intent::{classify, MessageIntent};
pub use llm::{CompletionClient, CompletionError, HttpCompletionClient};
pub use runtime::{DialogueRouter, ReplySource, RoutedReply};
