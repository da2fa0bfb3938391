use rust_decimal::Decimal;

use crate::domain::product::{CurrencyMode, PricedProduct};

const KEYCAP_DIGITS: [&str; 9] =
    ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣"];

/// Renders one catalog row as the fixed reply template.
///
/// Labels are bold (`*…*`) with emoji markers; multi-currency mode adds the
/// USD/EUR list prices and their discounted equivalents. USD/EUR lines are
/// omitted entirely when the catalog has no price for that currency.
pub fn product_block(priced: &PricedProduct, mode: CurrencyMode) -> String {
    let product = &priced.product;
    let discount = product.discount_max.normalize();

    match mode {
        CurrencyMode::Plain => [
            format!("*📦 {}* ({})", product.name, product.capacity),
            format!("*💰 Preço base:* R$ {}", money(product.base_price)),
            format!("*🔻 Desconto máximo:* {discount}%"),
            format!("*💵 Preço final:* R$ {}", money(priced.final_brl)),
        ]
        .join("\n"),
        CurrencyMode::MultiCurrency => {
            let mut lines = vec![
                format!("*📦 {}* ({}) - SKU: {}", product.name, product.capacity, product.sku),
                format!("*💵 Preço BRL:* R$ {}", money(product.base_price)),
            ];
            if let Some(usd) = product.usd_price {
                lines.push(format!("*💰 Preço USD:* $ {}", money(usd)));
            }
            if let Some(eur) = product.eur_price {
                lines.push(format!("*💶 Preço EUR:* € {}", money(eur)));
            }
            lines.push(format!("*🔻 Desconto máximo:* {discount}%"));
            lines.push("*🎯 Preço final:*".to_string());
            lines.push(format!("- BRL: R$ {}", money(priced.final_brl)));
            if let Some(usd) = priced.final_usd {
                lines.push(format!("- USD: $ {}", money(usd)));
            }
            if let Some(eur) = priced.final_eur {
                lines.push(format!("- EUR: € {}", money(eur)));
            }
            lines.join("\n")
        }
    }
}

/// Assembles the full search reply: a header line followed by one block per
/// matched product.
pub fn results_reply(products: &[PricedProduct], mode: CurrencyMode) -> String {
    let header = match mode {
        CurrencyMode::Plain => "*🔍 Produtos encontrados:*",
        CurrencyMode::MultiCurrency => "*🔍 Resultados:*",
    };

    let blocks =
        products.iter().map(|priced| product_block(priced, mode)).collect::<Vec<_>>();
    format!("{header}\n\n{}", blocks.join("\n\n"))
}

/// Checks that emphasis delimiters pair up across the whole reply.
///
/// The transport renders `*`/`_` as styling; an odd count would make it
/// reject the message, so callers downgrade to plain text instead.
pub fn markup_is_balanced(text: &str) -> bool {
    let asterisks = text.chars().filter(|ch| *ch == '*').count();
    let underscores = text.chars().filter(|ch| *ch == '_').count();
    asterisks % 2 == 0 && underscores % 2 == 0
}

/// Normalizes completion-service output for chat rendering.
///
/// `##`/`###` headings become `🎯 *…*`, numbered list markers become keycap
/// emoji, runs of blank lines collapse to a single blank line, and the
/// result is trimmed. Running it twice yields the same text.
pub fn tidy_completion(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = rewrite_list_marker(&rewrite_heading(line));
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push(String::new());
        } else {
            blank_run = 0;
            lines.push(line);
        }
    }

    lines.join("\n").trim().to_string()
}

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

fn rewrite_heading(line: &str) -> String {
    match line.strip_prefix("###").or_else(|| line.strip_prefix("##")) {
        Some(rest) => format!("🎯 *{}*", rest.trim_start()),
        None => line.to_string(),
    }
}

fn rewrite_list_marker(line: &str) -> String {
    for (index, keycap) in KEYCAP_DIGITS.iter().enumerate() {
        let marker = format!("{}. ", index + 1);
        if let Some(rest) = line.strip_prefix(&marker) {
            return format!("{keycap} {rest}");
        }
    }
    line.to_string()
}
