use std::collections::HashMap;

use tokio::sync::RwLock;

use vendy_core::domain::message::{ChatTurn, MessageRole};
use vendy_core::domain::product::{CurrencyMode, Product};
use vendy_core::domain::user::ChatUser;

use super::{
    CatalogRepository, ConversationRepository, RepositoryError, SEARCH_RESULT_LIMIT,
};

/// Catalog backed by a plain vector; mirrors the SQL matching semantics so
/// router tests exercise the same behavior the store exhibits.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalogRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }

    pub async fn insert(&self, product: Product) {
        self.products.write().await.push(product);
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn search(
        &self,
        text: &str,
        mode: CurrencyMode,
    ) -> Result<Vec<Product>, RepositoryError> {
        let needle = text.trim().to_lowercase();
        let products = self.products.read().await;

        let mut hits = products
            .iter()
            .filter(|product| {
                let name_match = product.name.to_lowercase().contains(&needle);
                match mode {
                    CurrencyMode::Plain => name_match,
                    CurrencyMode::MultiCurrency => {
                        name_match || product.sku.to_lowercase().contains(&needle)
                    }
                }
            })
            .cloned()
            .collect::<Vec<_>>();

        hits.sort_by(|left, right| left.name.cmp(&right.name));
        hits.truncate(SEARCH_RESULT_LIMIT);
        Ok(hits)
    }
}

/// Message log and user profiles held in process memory.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    users: RwLock<HashMap<i64, ChatUser>>,
    messages: RwLock<Vec<StoredTurn>>,
}

#[derive(Clone, Debug)]
struct StoredTurn {
    user_id: i64,
    turn: ChatTurn,
    produto_id: Option<i64>,
}

impl InMemoryConversationRepository {
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn last_related_product(&self) -> Option<i64> {
        self.messages.read().await.last().and_then(|stored| stored.produto_id)
    }
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn append(
        &self,
        user: &ChatUser,
        role: MessageRole,
        content: &str,
        produto_id: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        users
            .entry(user.id)
            .and_modify(|existing| {
                if existing.first_name.is_none() {
                    existing.first_name = user.first_name.clone();
                }
                if existing.username.is_none() {
                    existing.username = user.username.clone();
                }
            })
            .or_insert_with(|| user.clone());

        self.messages.write().await.push(StoredTurn {
            user_id: user.id,
            turn: ChatTurn::new(role, content),
            produto_id,
        });
        Ok(())
    }

    async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<ChatTurn>, RepositoryError> {
        let messages = self.messages.read().await;
        let for_user = messages
            .iter()
            .filter(|stored| stored.user_id == user_id)
            .map(|stored| stored.turn.clone())
            .collect::<Vec<_>>();

        let keep = usize::try_from(limit.max(0)).unwrap_or(0);
        let skip = for_user.len().saturating_sub(keep);
        Ok(for_user.into_iter().skip(skip).collect())
    }
}
