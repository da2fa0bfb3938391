use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::discounted_price;

/// Whether a lookup/reply covers the BRL price only or the full
/// BRL/USD/EUR set. Multi-currency mode also widens the search to SKUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrencyMode {
    Plain,
    MultiCurrency,
}

/// One catalog row. The catalog is owned by an external process; this
/// system only ever reads it. Prices are list prices before discount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub capacity: String,
    pub base_price: Decimal,
    pub discount_max: Decimal,
    pub usd_price: Option<Decimal>,
    pub eur_price: Option<Decimal>,
}

/// A catalog row with its derived final prices. Final prices are never
/// stored; the same discount ratio applies to every currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedProduct {
    pub product: Product,
    pub final_brl: Decimal,
    pub final_usd: Option<Decimal>,
    pub final_eur: Option<Decimal>,
}

impl PricedProduct {
    pub fn from_product(product: Product) -> Self {
        let final_brl = discounted_price(product.base_price, product.discount_max);
        let final_usd =
            product.usd_price.map(|price| discounted_price(price, product.discount_max));
        let final_eur =
            product.eur_price.map(|price| discounted_price(price, product.discount_max));
        Self { product, final_brl, final_usd, final_eur }
    }
}

impl From<Product> for PricedProduct {
    fn from(product: Product) -> Self {
        Self::from_product(product)
    }
}
