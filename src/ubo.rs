//! UBO extraction and identity document classification.
//!
//! Turns a shop's additional fields into shareholder contacts for the payment
//! platform, keeping the shop/slot → shareholder code mapping consistent
//! across synchronisation runs, and classifies uploaded photo ids per slot.
//!
//! Mapping store access is a plain read followed by a conditional write.
//! Callers running extractions concurrently must serialise them per shop id,
//! otherwise two runs can persist different codes for the same slot.

use crate::errors::{AppError, ResultExt};
use crate::models::{
    Address, DocumentType, Gender, GetAccountHolderResponse, Name, PersonalData, PhoneNumber,
    PhoneType, ShareholderContact, ShareholderMapping, Shop, ShopDocument,
};
use crate::ubo_keys::{
    generate_ubo_keys, photo_id_front_code, photo_id_rear_code, photo_id_type_code, KeySchema,
    UboField,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Durable shop/slot → shareholder code association.
#[async_trait]
pub trait ShareholderMappingStore: Send + Sync {
    async fn find_one(
        &self,
        shop_id: &str,
        ubo_number: u32,
    ) -> Result<Option<ShareholderMapping>, AppError>;

    async fn save(&self, mapping: &ShareholderMapping) -> Result<(), AppError>;
}

/// Remote shop lookup used to read a slot's photo id type.
#[async_trait]
pub trait ShopLookup: Send + Sync {
    /// `Ok(None)` when the marketplace has no such shop.
    async fn find_shop(&self, shop_id: &str) -> Result<Option<Shop>, AppError>;
}

/// Flat field code → value bag built from a shop's single-value fields.
pub fn single_value_fields(shop: &Shop) -> HashMap<String, String> {
    shop.additional_field_values
        .iter()
        .filter_map(|field| field.single_value_field())
        .map(|field| (field.code.clone(), field.value.clone()))
        .collect()
}

/// The 15 resolved values of one UBO slot.
struct UboValues<'a> {
    ubo_number: u32,
    values: HashMap<UboField, &'a str>,
}

impl<'a> UboValues<'a> {
    fn resolve(
        ubo_number: u32,
        keys: &std::collections::BTreeMap<UboField, String>,
        fields: &'a HashMap<String, String>,
    ) -> Self {
        let values = keys
            .iter()
            .filter_map(|(field, code)| fields.get(code).map(|v| (*field, v.as_str())))
            .collect();
        Self { ubo_number, values }
    }

    fn get(&self, field: UboField) -> Option<&'a str> {
        self.values.get(&field).copied()
    }

    fn owned(&self, field: UboField) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    fn has_mandatory_fields(&self) -> bool {
        [
            UboField::Civility,
            UboField::FirstName,
            UboField::LastName,
            UboField::Email,
        ]
        .into_iter()
        .all(|field| self.get(field).is_some())
    }

    fn any_of(&self, fields: &[UboField]) -> bool {
        fields.iter().any(|field| self.get(*field).is_some())
    }

    /// Builds the contact without a shareholder code. `None` when the
    /// mandatory fields are incomplete.
    fn to_contact(&self) -> Result<Option<ShareholderContact>, AppError> {
        if !self.has_mandatory_fields() {
            return Ok(None);
        }

        let mut contact = ShareholderContact {
            name: Some(Name {
                first_name: self.owned(UboField::FirstName).unwrap_or_default(),
                last_name: self.owned(UboField::LastName).unwrap_or_default(),
                gender: Gender::from_civility(self.get(UboField::Civility)),
            }),
            email: self.owned(UboField::Email),
            ..Default::default()
        };

        if self.any_of(&[
            UboField::DateOfBirth,
            UboField::Nationality,
            UboField::IdNumber,
        ]) {
            contact.personal_data = Some(PersonalData {
                date_of_birth: self.owned(UboField::DateOfBirth),
                nationality: self.owned(UboField::Nationality),
                id_number: self.owned(UboField::IdNumber),
            });
        } else {
            tracing::warn!(
                "Unable to populate any personal data for share holder {}",
                self.ubo_number
            );
        }

        if self.any_of(&[
            UboField::HouseNumberOrName,
            UboField::Street,
            UboField::City,
            UboField::PostalCode,
            UboField::Country,
        ]) {
            contact.address = Some(Address {
                house_number_or_name: self.owned(UboField::HouseNumberOrName),
                street: self.owned(UboField::Street),
                city: self.owned(UboField::City),
                postal_code: self.owned(UboField::PostalCode),
                country: self.owned(UboField::Country),
            });
        } else {
            tracing::warn!(
                "Unable to populate any address data for share holder {}",
                self.ubo_number
            );
        }

        if self.any_of(&[
            UboField::PhoneCountryCode,
            UboField::PhoneType,
            UboField::PhoneNumber,
        ]) {
            let phone_type = self
                .get(UboField::PhoneType)
                .map(|token| token.parse::<PhoneType>())
                .transpose()
                .map_err(|e| {
                    AppError::Validation(format!("share holder {}: {}", self.ubo_number, e))
                })?;
            contact.phone_number = Some(PhoneNumber {
                phone_country_code: self.owned(UboField::PhoneCountryCode),
                phone_number: self.owned(UboField::PhoneNumber),
                phone_type,
            });
        } else {
            tracing::warn!(
                "Unable to populate any phone data for share holder {}",
                self.ubo_number
            );
        }

        Ok(Some(contact))
    }
}

/// Builds shareholder contacts from a field bag, without resolving
/// shareholder codes. Slots failing the mandatory-field gate are skipped.
pub fn build_ubo_contacts(
    fields: &HashMap<String, String>,
    schema: &KeySchema,
) -> Result<Vec<ShareholderContact>, AppError> {
    let mut contacts = Vec::new();
    for (ubo_number, keys) in schema.slots() {
        if let Some(contact) = UboValues::resolve(ubo_number, keys, fields).to_contact()? {
            contacts.push(contact);
        }
    }
    Ok(contacts)
}

/// Shareholder code held by the existing account holder at the slot's
/// position: slot 1 pairs with the first shareholder, slot 2 with the second.
///
/// This relies on the remote list keeping its order. A reordered list would
/// pair slots with the wrong shareholders.
pub fn shareholder_code_at_position(
    existing: &GetAccountHolderResponse,
    ubo_number: u32,
) -> Option<&str> {
    let index = usize::try_from(ubo_number).ok()?.checked_sub(1)?;
    existing
        .shareholders()
        .get(index)
        .and_then(|shareholder| shareholder.shareholder_code.as_deref())
}

/// Extracts UBOs from shops and classifies their identity documents.
#[derive(Debug, Clone)]
pub struct UboService {
    schema: KeySchema,
}

impl UboService {
    /// Fails with [`AppError::Configuration`] when `max_ubos < 1`.
    pub fn new(max_ubos: u32) -> Result<Self, AppError> {
        Ok(Self {
            schema: generate_ubo_keys(max_ubos)?,
        })
    }

    /// Regenerates the key schema for a new slot count.
    pub fn set_max_ubos(&mut self, max_ubos: u32) -> Result<(), AppError> {
        self.schema = generate_ubo_keys(max_ubos)?;
        Ok(())
    }

    pub fn max_ubos(&self) -> u32 {
        self.schema.max_ubos()
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Extract shareholder contacts in the payment platform format from a shop.
    ///
    /// For every slot passing the mandatory-field gate the shareholder code is
    /// resolved from the mapping store first, then from `existing` by list
    /// position (persisting a new mapping), and is otherwise left unset so the
    /// payment platform allocates one.
    ///
    /// An unrecognised phone type aborts the whole call with
    /// [`AppError::Validation`]; mappings persisted for earlier slots stay.
    pub async fn extract_ubos(
        &self,
        shop: &Shop,
        existing: Option<&GetAccountHolderResponse>,
        store: &dyn ShareholderMappingStore,
    ) -> Result<Vec<ShareholderContact>, AppError> {
        let fields = single_value_fields(shop);
        let mut contacts = Vec::new();

        for (ubo_number, keys) in self.schema.slots() {
            let values = UboValues::resolve(ubo_number, keys, &fields);
            let Some(mut contact) = values
                .to_contact()
                .with_context(|| format!("Extracting UBOs for shop {}", shop.id))?
            else {
                tracing::debug!(
                    "Skipping UBO {} of shop {}: mandatory fields missing",
                    ubo_number,
                    shop.id
                );
                continue;
            };

            contact.shareholder_code = self
                .resolve_shareholder_code(&shop.id, ubo_number, existing, store)
                .await?;
            contacts.push(contact);
        }

        tracing::info!(
            "Extracted {} UBO(s) from shop {}",
            contacts.len(),
            shop.id
        );
        Ok(contacts)
    }

    pub async fn extract_ubos_without_snapshot(
        &self,
        shop: &Shop,
        store: &dyn ShareholderMappingStore,
    ) -> Result<Vec<ShareholderContact>, AppError> {
        self.extract_ubos(shop, None, store).await
    }

    async fn resolve_shareholder_code(
        &self,
        shop_id: &str,
        ubo_number: u32,
        existing: Option<&GetAccountHolderResponse>,
        store: &dyn ShareholderMappingStore,
    ) -> Result<Option<String>, AppError> {
        if let Some(mapping) = store.find_one(shop_id, ubo_number).await? {
            return Ok(Some(mapping.adyen_shareholder_code));
        }

        let Some(code) = existing.and_then(|e| shareholder_code_at_position(e, ubo_number)) else {
            return Ok(None);
        };

        let mapping = ShareholderMapping::new(shop_id, ubo_number, code);
        store.save(&mapping).await?;
        tracing::info!(
            "Mapped UBO {} of shop {} to shareholder {}",
            ubo_number,
            shop_id,
            code
        );
        Ok(Some(code.to_string()))
    }

    /// Classifies photo id uploads by UBO slot.
    ///
    /// Documents whose type code is `adyen-ubo<n>-photoid` or
    /// `adyen-ubo<n>-photoid-rear` (case-insensitive) get the document type
    /// held in the shop's `adyen-ubo<n>-photoidtype` value-list field.
    /// Anything that cannot be resolved is left out of the result.
    ///
    /// The shop is looked up at most once per (shop, slot) for the whole
    /// call; the memo does not outlive it.
    pub async fn extract_ubo_documents(
        &self,
        documents: &[ShopDocument],
        lookup: &dyn ShopLookup,
    ) -> Result<HashMap<ShopDocument, DocumentType>, AppError> {
        let mut memo: HashMap<(String, u32), Option<DocumentType>> = HashMap::new();
        let mut classified = HashMap::new();

        for document in documents {
            for ubo_number in 1..=self.max_ubos() {
                if !is_photo_id_for(document, ubo_number) {
                    continue;
                }

                let key = (document.shop_id.clone(), ubo_number);
                let document_type = match memo.get(&key) {
                    Some(resolved) => *resolved,
                    None => {
                        let resolved =
                            retrieve_photo_id_type(lookup, &document.shop_id, ubo_number).await?;
                        memo.insert(key, resolved);
                        resolved
                    }
                };

                match document_type {
                    Some(document_type) => {
                        classified.insert(document.clone(), document_type);
                    }
                    None => tracing::debug!(
                        "Document {} of shop {} left unclassified",
                        document.id,
                        document.shop_id
                    ),
                }
            }
        }

        Ok(classified)
    }
}

fn is_photo_id_for(document: &ShopDocument, ubo_number: u32) -> bool {
    document
        .type_code
        .eq_ignore_ascii_case(&photo_id_front_code(ubo_number))
        || document
            .type_code
            .eq_ignore_ascii_case(&photo_id_rear_code(ubo_number))
}

async fn retrieve_photo_id_type(
    lookup: &dyn ShopLookup,
    shop_id: &str,
    ubo_number: u32,
) -> Result<Option<DocumentType>, AppError> {
    let Some(shop) = lookup.find_shop(shop_id).await? else {
        tracing::warn!("Shop {} not found while classifying UBO documents", shop_id);
        return Ok(None);
    };

    let code = photo_id_type_code(ubo_number);
    let value = shop
        .additional_field_values
        .iter()
        .filter_map(|field| field.value_list_field())
        .find(|field| field.code.eq_ignore_ascii_case(&code))
        .map(|field| field.value.as_str())
        .filter(|value| !value.is_empty());

    let Some(value) = value else {
        return Ok(None);
    };

    match value.parse::<DocumentType>() {
        Ok(document_type) => Ok(Some(document_type)),
        Err(e) => {
            tracing::warn!("Shop {} field {}: {}", shop_id, code, e);
            Ok(None)
        }
    }
}
