use crate::repositories::RepositoryError;
use crate::DbPool;

/// Deterministic demo catalog for local runs and smoke checks.
///
/// Mirrors the export price list the catalog team ships: BRL base price,
/// maximum discount, and USD/EUR list prices where the product is exported.
const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        sku: "ACAI-500",
        name: "Açaí 500g",
        capacity: "500g",
        base_price: "24.90",
        discount_max: "10",
        usd_price: Some("5.00"),
        eur_price: Some("4.50"),
    },
    DemoProduct {
        sku: "ACAI-1KG",
        name: "Açaí Premium 1KG",
        capacity: "1KG",
        base_price: "49.90",
        discount_max: "15",
        usd_price: Some("10.00"),
        eur_price: Some("9.20"),
    },
    DemoProduct {
        sku: "ACAI-BALDE",
        name: "Açaí Balde 5KG",
        capacity: "5KG",
        base_price: "189.00",
        discount_max: "20",
        usd_price: Some("38.00"),
        eur_price: Some("35.00"),
    },
    DemoProduct {
        sku: "POLPA-CUPU",
        name: "Polpa de Cupuaçu 900g",
        capacity: "900g",
        base_price: "32.50",
        discount_max: "12",
        usd_price: Some("6.50"),
        eur_price: Some("6.00"),
    },
    DemoProduct {
        sku: "POLPA-MANGA",
        name: "Polpa de Manga 900g",
        capacity: "900g",
        base_price: "27.00",
        discount_max: "10",
        usd_price: None,
        eur_price: None,
    },
    DemoProduct {
        sku: "GUARANA-XPE",
        name: "Xarope de Guaraná 2L",
        capacity: "2L",
        base_price: "58.00",
        discount_max: "8",
        usd_price: Some("11.60"),
        eur_price: Some("10.70"),
    },
];

struct DemoProduct {
    sku: &'static str,
    name: &'static str,
    capacity: &'static str,
    base_price: &'static str,
    discount_max: &'static str,
    usd_price: Option<&'static str>,
    eur_price: Option<&'static str>,
}

pub struct DemoCatalog;

impl DemoCatalog {
    /// Inserts the demo products, skipping SKUs that already exist.
    /// Returns how many rows were actually inserted.
    pub async fn load(pool: &DbPool) -> Result<u64, RepositoryError> {
        let mut inserted = 0u64;
        for product in DEMO_PRODUCTS {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO produtos \
                 (sku, produto, capacidade, preco_base, desconto_max, preco_dolar, preco_euro) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(product.sku)
            .bind(product.name)
            .bind(product.capacity)
            .bind(product.base_price)
            .bind(product.discount_max)
            .bind(product.usd_price)
            .bind(product.eur_price)
            .execute(pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// Counts demo SKUs present in the catalog table.
    pub async fn verify(pool: &DbPool) -> Result<i64, RepositoryError> {
        let skus = DEMO_PRODUCTS.iter().map(|product| product.sku).collect::<Vec<_>>();
        let placeholders = vec!["?"; skus.len()].join(", ");
        let query =
            format!("SELECT COUNT(*) AS count FROM produtos WHERE sku IN ({placeholders})");

        let mut count_query = sqlx::query_scalar::<_, i64>(&query);
        for sku in skus {
            count_query = count_query.bind(sku);
        }
        Ok(count_query.fetch_one(pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use vendy_core::domain::product::CurrencyMode;

    use crate::fixtures::DemoCatalog;
    use crate::repositories::{CatalogRepository, SqlCatalogRepository};
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn demo_catalog_loads_once_and_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let first = DemoCatalog::load(&pool).await.expect("load");
        let second = DemoCatalog::load(&pool).await.expect("reload");

        assert!(first > 0);
        assert_eq!(second, 0, "existing SKUs should be skipped");
        assert_eq!(DemoCatalog::verify(&pool).await.expect("verify"), first as i64);
    }

    #[tokio::test]
    async fn demo_catalog_is_searchable_after_load() {
        let pool = connect_with_settings("sqlite::memory:", 1, 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        DemoCatalog::load(&pool).await.expect("load");

        let repo = SqlCatalogRepository::new(pool);
        let hits = repo.search("açaí", CurrencyMode::MultiCurrency).await.expect("search");

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].name, "Açaí 500g");
    }
}
