use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use vendy_agent::runtime::{DialogueRouter, RoutedReply};
use vendy_core::domain::product::{CurrencyMode, PricedProduct};
use vendy_core::domain::user::ChatUser;
use vendy_core::format::{markup_is_balanced, results_reply};
use vendy_db::repositories::CatalogRepository;
use vendy_telegram::api::{SendMessagePayload, Update};
use vendy_telegram::commands::{
    greeting_message, parse_command, BotCommand, CALLBACK_LIST_PRODUCTS, CALLBACK_PROMOTIONS,
};
use vendy_telegram::poller::{HandlerError, UpdateHandler};

const EMPTY_CATALOG: &str = "O catálogo está vazio no momento. Tente novamente mais tarde.";

/// Bridges Telegram updates to the dialogue router: commands and callback
/// buttons are answered directly, everything else goes through routing.
pub struct BotUpdateHandler {
    router: Arc<DialogueRouter>,
    catalog: Arc<dyn CatalogRepository>,
}

impl BotUpdateHandler {
    pub fn new(router: Arc<DialogueRouter>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { router, catalog }
    }

    /// Full-catalog listing used by `/produtos` and the menu buttons. An
    /// empty search term matches every row, so the store's own name
    /// ordering and result cap apply.
    async fn catalog_listing(&self, chat_id: i64, mode: CurrencyMode) -> SendMessagePayload {
        match self.catalog.search("", mode).await {
            Ok(products) if !products.is_empty() => {
                let priced =
                    products.into_iter().map(PricedProduct::from_product).collect::<Vec<_>>();
                let text = results_reply(&priced, mode);
                if markup_is_balanced(&text) {
                    SendMessagePayload::styled(chat_id, text)
                } else {
                    SendMessagePayload::plain(chat_id, text)
                }
            }
            Ok(_) => SendMessagePayload::plain(chat_id, EMPTY_CATALOG),
            Err(error) => {
                warn!(error = %error, "catalog listing failed");
                SendMessagePayload::plain(chat_id, EMPTY_CATALOG)
            }
        }
    }
}

fn reply_payload(chat_id: i64, reply: RoutedReply) -> SendMessagePayload {
    if reply.styled {
        SendMessagePayload::styled(chat_id, reply.text)
    } else {
        SendMessagePayload::plain(chat_id, reply.text)
    }
}

#[async_trait]
impl UpdateHandler for BotUpdateHandler {
    async fn handle(&self, update: &Update) -> Result<Vec<SendMessagePayload>, HandlerError> {
        if let Some(callback) = &update.callback_query {
            let chat_id =
                callback.message.as_ref().map(|message| message.chat.id).unwrap_or(callback.from.id);
            let payload = match callback.data.as_deref() {
                Some(CALLBACK_LIST_PRODUCTS) => {
                    Some(self.catalog_listing(chat_id, CurrencyMode::Plain).await)
                }
                Some(CALLBACK_PROMOTIONS) => {
                    Some(self.catalog_listing(chat_id, CurrencyMode::MultiCurrency).await)
                }
                _ => None,
            };
            return Ok(payload.into_iter().collect());
        }

        let Some(message) = &update.message else {
            return Ok(Vec::new());
        };
        let Some(text) = message.text.as_deref() else {
            return Ok(Vec::new());
        };

        match parse_command(text) {
            Some(BotCommand::Start) => Ok(vec![greeting_message(message.chat.id)]),
            Some(BotCommand::Produtos) => {
                Ok(vec![self.catalog_listing(message.chat.id, CurrencyMode::Plain).await])
            }
            None => {
                let Some(from) = &message.from else {
                    return Ok(Vec::new());
                };
                let user = ChatUser::from(from);
                let reply = self.router.respond(&user, text).await;
                Ok(vec![reply_payload(message.chat.id, reply)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use vendy_agent::llm::{CompletionClient, CompletionError};
    use vendy_agent::runtime::DialogueRouter;
    use vendy_core::domain::message::ChatTurn;
    use vendy_core::domain::product::Product;
    use vendy_db::repositories::{
        InMemoryCatalogRepository, InMemoryConversationRepository,
    };
    use vendy_telegram::api::{ParseMode, Update};
    use vendy_telegram::poller::UpdateHandler;

    use super::BotUpdateHandler;

    struct UnreachableCompletion;

    #[async_trait::async_trait]
    impl CompletionClient for UnreachableCompletion {
        async fn complete(&self, _turns: &[ChatTurn]) -> Result<String, CompletionError> {
            Err(CompletionError::Status(503))
        }
    }

    fn acai_product() -> Product {
        Product {
            id: 1,
            sku: "ACAI-1KG".to_string(),
            name: "Açaí Premium 1KG".to_string(),
            capacity: "1KG".to_string(),
            base_price: Decimal::new(4990, 2),
            discount_max: Decimal::new(15, 0),
            usd_price: Some(Decimal::new(1000, 2)),
            eur_price: Some(Decimal::new(920, 2)),
        }
    }

    fn handler_with_products(products: Vec<Product>) -> BotUpdateHandler {
        let catalog = Arc::new(InMemoryCatalogRepository::with_products(products));
        let router = Arc::new(DialogueRouter::new(
            catalog.clone(),
            Arc::new(InMemoryConversationRepository::default()),
            Arc::new(UnreachableCompletion),
        ));
        BotUpdateHandler::new(router, catalog)
    }

    fn text_update(text: &str) -> Update {
        serde_json::from_str(&format!(
            r#"{{
                "update_id": 1,
                "message": {{
                    "message_id": 1,
                    "from": {{"id": 42, "first_name": "Ana", "username": "ana_v"}},
                    "chat": {{"id": 42}},
                    "text": "{text}"
                }}
            }}"#,
        ))
        .expect("build update")
    }

    fn callback_update(data: &str) -> Update {
        serde_json::from_str(&format!(
            r#"{{
                "update_id": 2,
                "callback_query": {{
                    "id": "cb-1",
                    "from": {{"id": 42, "first_name": "Ana"}},
                    "message": {{"message_id": 9, "chat": {{"id": 42}}}},
                    "data": "{data}"
                }}
            }}"#,
        ))
        .expect("build update")
    }

    #[tokio::test]
    async fn start_command_gets_the_greeting_with_menu() {
        let handler = handler_with_products(vec![acai_product()]);

        let payloads = handler.handle(&text_update("/start")).await.expect("handle");

        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].text.contains("assistente da CD Company"));
        assert!(payloads[0].reply_markup.is_some());
    }

    #[tokio::test]
    async fn product_text_is_answered_with_a_styled_catalog_reply() {
        let handler = handler_with_products(vec![acai_product()]);

        let payloads = handler.handle(&text_update("açaí")).await.expect("handle");

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].parse_mode, Some(ParseMode::Markdown));
        assert!(payloads[0].text.contains("*🔍 Produtos encontrados:*"));
        assert!(payloads[0].text.contains("R$ 42.42"), "15% off 49.90 is 42.42");
    }

    #[tokio::test]
    async fn produtos_command_lists_the_catalog() {
        let handler = handler_with_products(vec![acai_product()]);

        let payloads = handler.handle(&text_update("/produtos")).await.expect("handle");

        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].text.contains("Açaí Premium 1KG"));
    }

    #[tokio::test]
    async fn produtos_command_with_an_empty_catalog_degrades_to_plain_notice() {
        let handler = handler_with_products(Vec::new());

        let payloads = handler.handle(&text_update("/produtos")).await.expect("handle");

        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].parse_mode.is_none());
        assert!(payloads[0].text.contains("catálogo está vazio"));
    }

    #[tokio::test]
    async fn menu_callbacks_route_to_the_listing() {
        let handler = handler_with_products(vec![acai_product()]);

        let listing =
            handler.handle(&callback_update("listar_produtos")).await.expect("handle");
        let promotions = handler.handle(&callback_update("promocoes")).await.expect("handle");

        assert_eq!(listing.len(), 1);
        assert!(listing[0].text.contains("*🔍 Produtos encontrados:*"));
        assert_eq!(promotions.len(), 1);
        assert!(promotions[0].text.contains("*🔍 Resultados:*"));
        assert!(promotions[0].text.contains("SKU: ACAI-1KG"));
    }

    #[tokio::test]
    async fn unknown_callback_data_is_ignored() {
        let handler = handler_with_products(vec![acai_product()]);

        let payloads = handler.handle(&callback_update("algo_antigo")).await.expect("handle");

        assert!(payloads.is_empty());
    }

    #[tokio::test]
    async fn non_text_updates_produce_no_replies() {
        let handler = handler_with_products(vec![acai_product()]);
        let update: Update =
            serde_json::from_str(r#"{"update_id": 3}"#).expect("build update");

        let payloads = handler.handle(&update).await.expect("handle");

        assert!(payloads.is_empty());
    }
}
