/// Currency keywords that flip a message into a multi-currency inquiry.
const CURRENCY_KEYWORDS: [&str; 5] = ["dólar", "dolar", "euro", "usd", "eur"];

/// Connectives and question filler that never belong in a search term.
const QUERY_FILLER: [&str; 16] = [
    "quanto", "custa", "custam", "qual", "quais", "preço", "preco", "valor", "em", "no", "na",
    "o", "a", "os", "as", "um",
];

/// Prepositions that introduce the product being asked about.
const TERM_PREPOSITIONS: [&str; 3] = ["do", "da", "de"];

/// How an inbound message should be routed. The third routing outcome
/// (completion fallback) depends on lookup results, so it lives on the
/// router's reply type rather than here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageIntent {
    /// The message mentions a currency; look up in multi-currency mode
    /// using the extracted term.
    CurrencyInquiry { search_term: String },
    /// Anything else: try the catalog with the full text first.
    CatalogQuery,
}

pub fn classify(text: &str) -> MessageIntent {
    let normalized = text.to_lowercase();
    let mentions_currency =
        CURRENCY_KEYWORDS.iter().any(|keyword| normalized.contains(keyword));

    if mentions_currency {
        MessageIntent::CurrencyInquiry { search_term: extract_search_term(&normalized) }
    } else {
        MessageIntent::CatalogQuery
    }
}

/// Pulls the product term out of a currency question.
///
/// The phrase after the first "do|da|de" preposition wins; without one the
/// whole question is considered. Currency words and question filler are
/// dropped either way, and everything past a `?` is ignored. Falls back to
/// the full (truncated) text when nothing survives filtering.
fn extract_search_term(normalized: &str) -> String {
    let before_question = normalized.split('?').next().unwrap_or(normalized).trim();
    let tokens: Vec<&str> = before_question.split_whitespace().collect();

    let start = tokens
        .iter()
        .position(|token| TERM_PREPOSITIONS.contains(token))
        .map(|index| index + 1)
        .unwrap_or(0);

    let term = tokens[start..]
        .iter()
        .copied()
        .filter(|&token| !is_currency_keyword(token) && !QUERY_FILLER.contains(&token))
        .collect::<Vec<_>>()
        .join(" ");

    if term.is_empty() {
        before_question.to_string()
    } else {
        term
    }
}

fn is_currency_keyword(token: &str) -> bool {
    CURRENCY_KEYWORDS.contains(&token)
}
