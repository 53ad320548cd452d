use std::env;
use uuid::Uuid;

use ubo_sync::data::db::Database;
use ubo_sync::data::db_storage::ShareholderMappingStorage;
use ubo_sync::models::ShareholderMapping;
use ubo_sync::ubo::ShareholderMappingStore;

/// Integration smoke test for the shareholder mapping table.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn shareholder_mapping_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    let storage = ShareholderMappingStorage::new(db.pool.clone());
    storage.ensure_schema().await?;

    // Use a unique shop id to avoid conflicts on repeated runs.
    let shop_id = format!("test-shop-{}", Uuid::new_v4());

    assert!(storage.find_one(&shop_id, 1).await?.is_none());

    let mapping = ShareholderMapping::new(&shop_id, 1, "SH-SMOKE");
    storage.save(&mapping).await?;

    let stored = storage
        .find_one(&shop_id, 1)
        .await?
        .ok_or_else(|| anyhow::anyhow!("mapping not found after save"))?;
    assert_eq!(stored.adyen_shareholder_code, "SH-SMOKE");
    assert_eq!(stored.mirakl_ubo_number, 1);

    // A second mapping for the same slot violates the unique constraint.
    let duplicate = ShareholderMapping::new(&shop_id, 1, "SH-OTHER");
    assert!(storage.save(&duplicate).await.is_err());

    let all = storage.find_by_shop(&shop_id).await?;
    assert_eq!(all.len(), 1);
    Ok(())
}
