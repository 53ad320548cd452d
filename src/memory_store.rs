use crate::errors::AppError;
use crate::models::ShareholderMapping;
use crate::ubo::ShareholderMappingStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process mapping store for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryShareholderMappings {
    mappings: Mutex<HashMap<(String, u32), ShareholderMapping>>,
}

impl InMemoryShareholderMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shareholder code stored for a shop/slot, if any.
    pub fn shareholder_code(&self, shop_id: &str, ubo_number: u32) -> Option<String> {
        self.lock().ok().and_then(|m| {
            m.get(&(shop_id.to_string(), ubo_number))
                .map(|mapping| mapping.adyen_shareholder_code.clone())
        })
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, u32), ShareholderMapping>>, AppError>
    {
        self.mappings
            .lock()
            .map_err(|_| AppError::InternalError("shareholder mapping store poisoned".to_string()))
    }
}

#[async_trait]
impl ShareholderMappingStore for InMemoryShareholderMappings {
    async fn find_one(
        &self,
        shop_id: &str,
        ubo_number: u32,
    ) -> Result<Option<ShareholderMapping>, AppError> {
        Ok(self
            .lock()?
            .get(&(shop_id.to_string(), ubo_number))
            .cloned())
    }

    async fn save(&self, mapping: &ShareholderMapping) -> Result<(), AppError> {
        let key = (
            mapping.mirakl_shop_id.clone(),
            mapping.mirakl_ubo_number as u32,
        );
        let mut mappings = self.lock()?;
        if mappings.contains_key(&key) {
            return Err(AppError::BadRequest(format!(
                "shareholder mapping for UBO {} of shop {} already exists",
                key.1, key.0
            )));
        }
        mappings.insert(key, mapping.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_find() {
        let store = InMemoryShareholderMappings::new();
        assert!(store.find_one("2000", 1).await.unwrap().is_none());

        store
            .save(&ShareholderMapping::new("2000", 1, "SH123"))
            .await
            .unwrap();

        let found = store.find_one("2000", 1).await.unwrap().unwrap();
        assert_eq!(found.adyen_shareholder_code, "SH123");
        assert!(store.find_one("2000", 2).await.unwrap().is_none());
        assert!(store.find_one("2001", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_existing_mapping_is_not_overwritten() {
        let store = InMemoryShareholderMappings::new();
        store
            .save(&ShareholderMapping::new("2000", 1, "SH123"))
            .await
            .unwrap();

        let result = store.save(&ShareholderMapping::new("2000", 1, "OTHER")).await;
        assert!(result.is_err());
        assert_eq!(store.shareholder_code("2000", 1).as_deref(), Some("SH123"));
        assert_eq!(store.len(), 1);
    }
}
