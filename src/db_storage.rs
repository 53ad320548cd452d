use crate::errors::{AppError, ResultExt};
use crate::models::ShareholderMapping;
use crate::ubo::ShareholderMappingStore;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL storage for shop/slot → shareholder code mappings.
#[derive(Clone)]
pub struct ShareholderMappingStorage {
    pool: PgPool,
}

impl ShareholderMappingStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the mapping table when missing.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shareholder_mapping (
                id UUID PRIMARY KEY,
                mirakl_shop_id TEXT NOT NULL,
                mirakl_ubo_number INTEGER NOT NULL,
                adyen_shareholder_code TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (mirakl_shop_id, mirakl_ubo_number)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Creating shareholder_mapping table")?;

        Ok(())
    }

    /// All mappings of a shop, ordered by UBO number.
    pub async fn find_by_shop(&self, shop_id: &str) -> Result<Vec<ShareholderMapping>, AppError> {
        let mappings = sqlx::query_as::<_, ShareholderMapping>(
            r#"
            SELECT id, mirakl_shop_id, mirakl_ubo_number, adyen_shareholder_code, created_at
            FROM shareholder_mapping
            WHERE mirakl_shop_id = $1
            ORDER BY mirakl_ubo_number ASC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Loading shareholder mappings of shop {}", shop_id))?;

        Ok(mappings)
    }
}

#[async_trait]
impl ShareholderMappingStore for ShareholderMappingStorage {
    async fn find_one(
        &self,
        shop_id: &str,
        ubo_number: u32,
    ) -> Result<Option<ShareholderMapping>, AppError> {
        let mapping = sqlx::query_as::<_, ShareholderMapping>(
            r#"
            SELECT id, mirakl_shop_id, mirakl_ubo_number, adyen_shareholder_code, created_at
            FROM shareholder_mapping
            WHERE mirakl_shop_id = $1 AND mirakl_ubo_number = $2
            LIMIT 1
            "#,
        )
        .bind(shop_id)
        .bind(ubo_number as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "Database error looking up UBO {} of shop {}: {:?}",
                ubo_number,
                shop_id,
                e
            );
            AppError::DatabaseError(e)
        })?;

        Ok(mapping)
    }

    /// Plain insert; an existing mapping for the same shop/slot is never
    /// overwritten and makes the insert fail on the unique constraint.
    async fn save(&self, mapping: &ShareholderMapping) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO shareholder_mapping
                (id, mirakl_shop_id, mirakl_ubo_number, adyen_shareholder_code, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(mapping.id)
        .bind(&mapping.mirakl_shop_id)
        .bind(mapping.mirakl_ubo_number)
        .bind(&mapping.adyen_shareholder_code)
        .bind(mapping.created_at)
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Saving shareholder mapping for UBO {} of shop {}",
                mapping.mirakl_ubo_number, mapping.mirakl_shop_id
            )
        })?;

        tracing::debug!(
            "Stored shareholder mapping {} -> {} (shop {})",
            mapping.mirakl_ubo_number,
            mapping.adyen_shareholder_code,
            mapping.mirakl_shop_id
        );
        Ok(())
    }
}
