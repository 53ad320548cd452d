use crate::errors::AppError;
use crate::models::{MiraklShopDocuments, MiraklShops, Shop, ShopDocument};
use crate::ubo::ShopLookup;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the marketplace operator API.
#[derive(Clone)]
pub struct MiraklClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MiraklClient {
    /// Creates a new `MiraklClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the marketplace, without the `/api` suffix.
    /// * `api_key` - Operator API key, sent as the `Authorization` header.
    pub fn new(base_url: String, api_key: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Mirakl client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Fetches a single shop by id.
    ///
    /// # Returns
    ///
    /// * `Result<Option<Shop>, AppError>` - The shop, or `None` when the marketplace returns no match.
    pub async fn get_shop(&self, shop_id: &str) -> Result<Option<Shop>, AppError> {
        let url = format!("{}/api/shops", self.base_url);
        tracing::info!("Fetching shop {} from Mirakl", shop_id);

        let shops: MiraklShops = self.get_json(&url, &[("shop_ids", shop_id)]).await?;
        Ok(shops.shops.into_iter().next())
    }

    /// Fetches the documents uploaded by a shop.
    ///
    /// Only the first page is read.
    pub async fn get_shop_documents(&self, shop_id: &str) -> Result<Vec<ShopDocument>, AppError> {
        let url = format!("{}/api/shops/documents", self.base_url);
        tracing::info!("Fetching documents of shop {} from Mirakl", shop_id);

        let documents: MiraklShopDocuments =
            self.get_json(&url, &[("shop_ids", shop_id)]).await?;
        tracing::debug!(
            "Shop {} has {} document(s)",
            shop_id,
            documents.documents.len()
        );
        Ok(documents.documents)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Mirakl request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Mirakl returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Mirakl returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Mirakl response: {}", e))
        })
    }
}

#[async_trait]
impl ShopLookup for MiraklClient {
    async fn find_shop(&self, shop_id: &str) -> Result<Option<Shop>, AppError> {
        self.get_shop(shop_id).await
    }
}
