use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use vendy_core::domain::product::{CurrencyMode, Product};

use super::{CatalogRepository, RepositoryError, SEARCH_RESULT_LIMIT};
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn search(
        &self,
        text: &str,
        mode: CurrencyMode,
    ) -> Result<Vec<Product>, RepositoryError> {
        let needle = format!("%{}%", text.trim().to_lowercase());

        let rows = match mode {
            CurrencyMode::Plain => {
                sqlx::query(
                    r#"
                    SELECT id, sku, produto, capacidade, preco_base, desconto_max,
                           preco_dolar, preco_euro
                    FROM produtos
                    WHERE LOWER(produto) LIKE ?
                    ORDER BY produto ASC
                    LIMIT ?
                    "#,
                )
                .bind(&needle)
                .bind(SEARCH_RESULT_LIMIT as i64)
                .fetch_all(&self.pool)
                .await?
            }
            CurrencyMode::MultiCurrency => {
                sqlx::query(
                    r#"
                    SELECT id, sku, produto, capacidade, preco_base, desconto_max,
                           preco_dolar, preco_euro
                    FROM produtos
                    WHERE LOWER(produto) LIKE ? OR LOWER(sku) LIKE ?
                    ORDER BY produto ASC
                    LIMIT ?
                    "#,
                )
                .bind(&needle)
                .bind(&needle)
                .bind(SEARCH_RESULT_LIMIT as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(decode_product).collect()
    }
}

fn decode_product(row: SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: row.try_get("id")?,
        sku: row.try_get("sku")?,
        name: row.try_get("produto")?,
        capacity: row.try_get("capacidade")?,
        base_price: decode_decimal(&row, "preco_base")?,
        discount_max: decode_decimal(&row, "desconto_max")?,
        usd_price: decode_optional_decimal(&row, "preco_dolar")?,
        eur_price: decode_optional_decimal(&row, "preco_euro")?,
    })
}

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(raw.trim())
        .map_err(|err| RepositoryError::Decode(format!("column `{column}`: {err}")))
}

fn decode_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw: Option<String> = row.try_get(column)?;
    match raw {
        Some(value) => Decimal::from_str(value.trim())
            .map(Some)
            .map_err(|err| RepositoryError::Decode(format!("column `{column}`: {err}"))),
        None => Ok(None),
    }
}
