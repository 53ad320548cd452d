use crate::config::Config;
use crate::db_storage::ShareholderMappingStorage;
use crate::errors::{AppError, ResultExt};
use crate::mirakl_client::MiraklClient;
use crate::models::{DocumentType, GetAccountHolderResponse, ShareholderContact, ShopDocument};
use crate::ubo::UboService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// UBO extraction and document classification.
    pub ubo_service: UboService,
    /// Durable shareholder code mappings.
    pub mapping_store: ShareholderMappingStorage,
    /// Marketplace operator client.
    pub mirakl_client: MiraklClient,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "ubo-sync",
            "version": env!("CARGO_PKG_VERSION"),
            "max_ubos": state.config.max_ubos,
        })),
    )
}

/// Body of the UBO extraction request.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractUbosRequest {
    /// Account holder as last read from the payment platform, if it exists.
    #[serde(default)]
    pub existing_account_holder: Option<GetAccountHolderResponse>,
}

/// POST /api/v1/shops/:shop_id/ubos
///
/// Fetches the shop from the marketplace and returns its shareholder
/// contacts, resolving shareholder codes against the mapping store.
pub async fn extract_shop_ubos(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
    Json(request): Json<ExtractUbosRequest>,
) -> Result<Json<Vec<ShareholderContact>>, AppError> {
    tracing::info!("POST /shops/{}/ubos", shop_id);

    let shop = state
        .mirakl_client
        .get_shop(&shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shop {} not found", shop_id)))?;

    let contacts = state
        .ubo_service
        .extract_ubos(
            &shop,
            request.existing_account_holder.as_ref(),
            &state.mapping_store,
        )
        .await?;

    Ok(Json(contacts))
}

/// One classified photo id upload.
#[derive(Debug, Serialize)]
pub struct ClassifiedDocument {
    pub document: ShopDocument,
    pub document_type: DocumentType,
}

/// GET /api/v1/shops/:shop_id/ubo-documents
///
/// Classifies the shop's photo id uploads by UBO slot.
pub async fn classify_shop_documents(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<Vec<ClassifiedDocument>>, AppError> {
    tracing::info!("GET /shops/{}/ubo-documents", shop_id);

    let documents = state
        .mirakl_client
        .get_shop_documents(&shop_id)
        .await
        .with_context(|| format!("Listing documents of shop {}", shop_id))?;

    let classified = state
        .ubo_service
        .extract_ubo_documents(&documents, &state.mirakl_client)
        .await?;

    // Keep the marketplace listing order in the response.
    let response = documents
        .into_iter()
        .filter_map(|document| {
            let document_type = classified.get(&document).copied()?;
            Some(ClassifiedDocument {
                document,
                document_type,
            })
        })
        .collect();

    Ok(Json(response))
}
