use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup, SendMessagePayload};

pub const CALLBACK_LIST_PRODUCTS: &str = "listar_produtos";
pub const CALLBACK_PROMOTIONS: &str = "promocoes";

const GREETING: &str = "*👋 Olá, eu sou o assistente da CD Company!*\n\n\
Posso te ajudar com:\n\
- Consulta de produtos e preços\n\
- Cálculo de descontos\n\
- Informações sobre pedidos";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Produtos,
}

/// Parses a slash command, tolerating the `@BotName` suffix Telegram adds
/// in group chats. Anything that is not a known command returns `None` and
/// flows to the dialogue router as ordinary text.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first_word = text.trim().split_whitespace().next()?;
    if !first_word.starts_with('/') {
        return None;
    }

    let command = first_word.split('@').next().unwrap_or(first_word);
    match command {
        "/start" => Some(BotCommand::Start),
        "/produtos" => Some(BotCommand::Produtos),
        _ => None,
    }
}

pub fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::from_rows(vec![
        InlineKeyboardButton::new("📦 Ver Produtos", CALLBACK_LIST_PRODUCTS),
        InlineKeyboardButton::new("💵 Promoções", CALLBACK_PROMOTIONS),
    ])
}

pub fn greeting_message(chat_id: i64) -> SendMessagePayload {
    SendMessagePayload::styled(chat_id, GREETING).with_keyboard(start_keyboard())
}
