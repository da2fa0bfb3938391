use std::sync::Arc;

use tracing::warn;

use vendy_core::domain::message::{ChatTurn, MessageRole};
use vendy_core::domain::product::{CurrencyMode, PricedProduct};
use vendy_core::domain::user::ChatUser;
use vendy_core::format::{markup_is_balanced, results_reply, tidy_completion};
use vendy_db::repositories::{CatalogRepository, ConversationRepository};

use crate::intent::{classify, MessageIntent};
use crate::llm::CompletionClient;
use crate::prompt::{FALLBACK_APOLOGY, PRODUCT_NOT_FOUND, SYSTEM_PROMPT};

/// How many stored turns are replayed as context for the completion call.
pub const CONTEXT_WINDOW: i64 = 6;

/// Where the reply text came from; lets transports and tests distinguish
/// catalog answers from generated ones and from canned fallbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Catalog,
    Completion,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedReply {
    pub text: String,
    /// Whether the transport may render with styled markup. False whenever
    /// emphasis delimiters do not pair up.
    pub styled: bool,
    pub source: ReplySource,
}

/// Catalog lookup collapsed to what routing needs. `Unavailable` keeps the
/// store-down case distinguishable from a true miss, even though the
/// user-visible default treats them identically.
enum CatalogOutcome {
    Hits(Vec<PricedProduct>),
    Empty,
    Unavailable,
}

pub struct DialogueRouter {
    catalog: Arc<dyn CatalogRepository>,
    conversations: Arc<dyn ConversationRepository>,
    completions: Arc<dyn CompletionClient>,
    system_prompt: String,
    context_limit: i64,
}

impl DialogueRouter {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        conversations: Arc<dyn ConversationRepository>,
        completions: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            catalog,
            conversations,
            completions,
            system_prompt: SYSTEM_PROMPT.to_string(),
            context_limit: CONTEXT_WINDOW,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Routes one inbound text message and returns the outbound reply.
    ///
    /// Never fails: every error path degrades to a canned reply so the
    /// conversation continues.
    pub async fn respond(&self, user: &ChatUser, text: &str) -> RoutedReply {
        match classify(text) {
            MessageIntent::CurrencyInquiry { search_term } => {
                match self.lookup(&search_term, CurrencyMode::MultiCurrency).await {
                    CatalogOutcome::Hits(products) => {
                        self.catalog_reply(user, &products, CurrencyMode::MultiCurrency).await
                    }
                    CatalogOutcome::Empty | CatalogOutcome::Unavailable => RoutedReply {
                        text: PRODUCT_NOT_FOUND.to_string(),
                        styled: false,
                        source: ReplySource::Fallback,
                    },
                }
            }
            MessageIntent::CatalogQuery => {
                match self.lookup(text, CurrencyMode::Plain).await {
                    CatalogOutcome::Hits(products) => {
                        self.catalog_reply(user, &products, CurrencyMode::Plain).await
                    }
                    CatalogOutcome::Empty | CatalogOutcome::Unavailable => {
                        self.completion_reply(user, text).await
                    }
                }
            }
        }
    }

    async fn lookup(&self, term: &str, mode: CurrencyMode) -> CatalogOutcome {
        match self.catalog.search(term, mode).await {
            Ok(products) if products.is_empty() => CatalogOutcome::Empty,
            Ok(products) => CatalogOutcome::Hits(
                products.into_iter().map(PricedProduct::from_product).collect(),
            ),
            Err(error) => {
                warn!(error = %error, term, "catalog lookup failed; treating as no results");
                CatalogOutcome::Unavailable
            }
        }
    }

    async fn catalog_reply(
        &self,
        user: &ChatUser,
        products: &[PricedProduct],
        mode: CurrencyMode,
    ) -> RoutedReply {
        let text = results_reply(products, mode);
        let related_product = products.first().map(|priced| priced.product.id);
        self.record(user, MessageRole::Assistant, &text, related_product).await;

        RoutedReply { styled: markup_is_balanced(&text), text, source: ReplySource::Catalog }
    }

    async fn completion_reply(&self, user: &ChatUser, text: &str) -> RoutedReply {
        self.record(user, MessageRole::User, text, None).await;

        let context = match self.conversations.recent(user.id, self.context_limit).await {
            Ok(turns) => turns,
            Err(error) => {
                warn!(user_id = user.id, error = %error, "context fetch failed; continuing without history");
                Vec::new()
            }
        };

        let mut turns = Vec::with_capacity(context.len() + 2);
        turns.push(ChatTurn::system(self.system_prompt.clone()));
        turns.extend(context);
        // The just-recorded user message is normally the newest context turn;
        // when the store is down it never landed, so put it back explicitly.
        if turns.last().map(|turn| turn.content.as_str()) != Some(text) {
            turns.push(ChatTurn::user(text));
        }

        match self.completions.complete(&turns).await {
            Ok(raw) => {
                let text = tidy_completion(&raw);
                self.record(user, MessageRole::Assistant, &text, None).await;
                RoutedReply {
                    styled: markup_is_balanced(&text),
                    text,
                    source: ReplySource::Completion,
                }
            }
            Err(error) => {
                warn!(user_id = user.id, error = %error, "completion call failed; replying with fixed apology");
                let text = FALLBACK_APOLOGY.to_string();
                self.record(user, MessageRole::Assistant, &text, None).await;
                RoutedReply { text, styled: false, source: ReplySource::Fallback }
            }
        }
    }

    async fn record(
        &self,
        user: &ChatUser,
        role: MessageRole,
        content: &str,
        produto_id: Option<i64>,
    ) {
        if let Err(error) = self.conversations.append(user, role, content, produto_id).await {
            warn!(user_id = user.id, error = %error, "failed to persist message; continuing");
        }
    }
}
