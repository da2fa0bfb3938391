use async_trait::async_trait;
use thiserror::Error;

use vendy_core::domain::message::{ChatTurn, MessageRole};
use vendy_core::domain::product::{CurrencyMode, Product};
use vendy_core::domain::user::ChatUser;

pub mod catalog;
pub mod conversation;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use conversation::SqlConversationRepository;
pub use memory::{InMemoryCatalogRepository, InMemoryConversationRepository};

/// Hard cap on catalog search results, matching the reply template.
pub const SEARCH_RESULT_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only lookup against the product catalog.
///
/// Matching is a case-insensitive substring search over the product name;
/// multi-currency mode also searches SKUs. At most
/// [`SEARCH_RESULT_LIMIT`] rows come back, ordered by product name
/// ascending. An empty result and a failed store are distinct here; the
/// dialogue layer decides how much of that distinction users see.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn search(
        &self,
        text: &str,
        mode: CurrencyMode,
    ) -> Result<Vec<Product>, RepositoryError>;
}

/// Append-only message log plus the per-user profile it hangs off.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Upserts the user row (refreshing `last_interaction`, filling name and
    /// handle only when previously null) and appends one message, in a
    /// single transaction: both writes commit together or neither does.
    async fn append(
        &self,
        user: &ChatUser,
        role: MessageRole,
        content: &str,
        produto_id: Option<i64>,
    ) -> Result<(), RepositoryError>;

    /// Returns up to `limit` most recent turns for the user, oldest first,
    /// reduced to `{role, content}` for use as conversational context.
    async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<ChatTurn>, RepositoryError>;
}
