//! Utility to print the stored shareholder mappings of a shop.

use dotenvy::dotenv;
use std::env;
use ubo_sync::db::Database;
use ubo_sync::db_storage::ShareholderMappingStorage;

/// Main entry point for the mapping inspection utility.
///
/// Usage: `shareholder_mappings <shop_id>`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let shop_id = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: shareholder_mappings <shop_id>"))?;
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let db = Database::new(&database_url).await?;
    let storage = ShareholderMappingStorage::new(db.pool.clone());

    let mappings = storage.find_by_shop(&shop_id).await?;

    if mappings.is_empty() {
        println!("No shareholder mappings for shop {}", shop_id);
        return Ok(());
    }

    println!("Shareholder mappings for shop {}:", shop_id);
    for mapping in mappings {
        println!(
            "- UBO {}: {} (since {})",
            mapping.mirakl_ubo_number,
            mapping.adyen_shareholder_code,
            mapping.created_at.to_rfc3339()
        );
    }

    Ok(())
}
