use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============ Database Models ============

/// Association between a marketplace shop's UBO slot and the shareholder
/// code issued by the payment platform.
///
/// Written once per (shop, slot) and never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ShareholderMapping {
    /// Unique identifier of the row.
    pub id: Uuid,
    /// Marketplace shop id.
    pub mirakl_shop_id: String,
    /// UBO slot number (1-based).
    pub mirakl_ubo_number: i32,
    /// Shareholder code issued by the payment platform.
    pub adyen_shareholder_code: String,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

impl ShareholderMapping {
    /// Creates a new, not yet persisted, mapping.
    pub fn new(shop_id: &str, ubo_number: u32, shareholder_code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            mirakl_shop_id: shop_id.to_string(),
            mirakl_ubo_number: ubo_number as i32,
            adyen_shareholder_code: shareholder_code.to_string(),
            created_at: Utc::now(),
        }
    }
}

// ============ Marketplace (Mirakl) Models ============

/// Marketplace ids come back as JSON numbers from some endpoints and as
/// strings from others.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// A marketplace shop, reduced to what the UBO mapping needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    /// Shop identifier.
    #[serde(rename = "shop_id", deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name of the shop.
    #[serde(default)]
    pub shop_name: Option<String>,
    /// Operator-defined additional fields.
    #[serde(rename = "shop_additional_fields", default)]
    pub additional_field_values: Vec<AdditionalFieldValue>,
}

/// Additional field holding exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleValueField {
    pub code: String,
    pub value: String,
}

/// Additional field holding several values (multi-select).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiValueField {
    pub code: String,
    #[serde(default)]
    pub value: Vec<String>,
}

/// Typed additional field value as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdditionalFieldValue {
    String(SingleValueField),
    Textarea(SingleValueField),
    Boolean(SingleValueField),
    Numeric(SingleValueField),
    Decimal(SingleValueField),
    Date(SingleValueField),
    Link(SingleValueField),
    Regex(SingleValueField),
    Email(SingleValueField),
    /// Value picked from an operator-defined value list.
    List(SingleValueField),
    MultipleValuesList(MultiValueField),
}

impl AdditionalFieldValue {
    /// Field code, whatever the field type.
    pub fn code(&self) -> &str {
        match self {
            AdditionalFieldValue::MultipleValuesList(field) => &field.code,
            other => other
                .single_value_field()
                .map(|field| field.code.as_str())
                .unwrap_or_default(),
        }
    }

    /// The field when it carries exactly one value (everything but multi-select).
    pub fn single_value_field(&self) -> Option<&SingleValueField> {
        match self {
            AdditionalFieldValue::String(field)
            | AdditionalFieldValue::Textarea(field)
            | AdditionalFieldValue::Boolean(field)
            | AdditionalFieldValue::Numeric(field)
            | AdditionalFieldValue::Decimal(field)
            | AdditionalFieldValue::Date(field)
            | AdditionalFieldValue::Link(field)
            | AdditionalFieldValue::Regex(field)
            | AdditionalFieldValue::Email(field)
            | AdditionalFieldValue::List(field) => Some(field),
            AdditionalFieldValue::MultipleValuesList(_) => None,
        }
    }

    /// The field when it is a value-list field.
    pub fn value_list_field(&self) -> Option<&SingleValueField> {
        match self {
            AdditionalFieldValue::List(field) => Some(field),
            _ => None,
        }
    }
}

/// Paged shop listing returned by the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiraklShops {
    #[serde(default)]
    pub shops: Vec<Shop>,
    #[serde(default)]
    pub total_count: i64,
}

/// Descriptor of a document uploaded by a shop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopDocument {
    /// Document identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Owning shop.
    #[serde(deserialize_with = "deserialize_id")]
    pub shop_id: String,
    /// Document type code (e.g. `adyen-ubo1-photoid`).
    #[serde(rename = "type")]
    pub type_code: String,
    /// Uploaded file name.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Upload timestamp as sent by the marketplace.
    #[serde(default)]
    pub date_uploaded: Option<String>,
}

/// Document listing returned by the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiraklShopDocuments {
    #[serde(rename = "shop_documents", default)]
    pub documents: Vec<ShopDocument>,
}

// ============ Payment Platform (Adyen) Models ============

/// Gender as understood by the payment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Maps a marketplace civility to a gender. Exact, case-sensitive match;
    /// anything unrecognised is `Unknown`.
    pub fn from_civility(civility: Option<&str>) -> Self {
        match civility {
            Some("Mr") => Gender::Male,
            Some("Mrs") | Some("Miss") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number_or_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Phone type tokens accepted by the payment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneType {
    #[serde(rename = "Fax")]
    Fax,
    #[serde(rename = "Landline")]
    Landline,
    #[serde(rename = "Mobile")]
    Mobile,
    #[serde(rename = "SIP")]
    Sip,
}

/// Raised when a token does not name a known enumeration constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTokenError {
    pub kind: &'static str,
    pub token: String,
}

impl fmt::Display for UnknownTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised {} '{}'", self.kind, self.token)
    }
}

impl std::error::Error for UnknownTokenError {}

impl FromStr for PhoneType {
    type Err = UnknownTokenError;

    /// Parses the marketplace token (`FAX`, `LANDLINE`, `MOBILE`, `SIP`), case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAX" => Ok(PhoneType::Fax),
            "LANDLINE" => Ok(PhoneType::Landline),
            "MOBILE" => Ok(PhoneType::Mobile),
            "SIP" => Ok(PhoneType::Sip),
            other => Err(UnknownTokenError {
                kind: "phone type",
                token: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<PhoneType>,
}

/// Beneficial owner record sent to the payment platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shareholder_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_data: Option<PersonalData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
}

/// Identity document types accepted by the payment platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    BankStatement,
    Bsn,
    CompanyRegistrationScreening,
    DrivingLicence,
    DrivingLicenceBack,
    DrivingLicenceFront,
    IdCard,
    IdCardBack,
    IdCardFront,
    Passport,
    Ssn,
    SupportingDocuments,
}

impl FromStr for DocumentType {
    type Err = UnknownTokenError;

    /// Parses the exact constant name (e.g. `PASSPORT`, `ID_CARD`), case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document_type = match s {
            "BANK_STATEMENT" => DocumentType::BankStatement,
            "BSN" => DocumentType::Bsn,
            "COMPANY_REGISTRATION_SCREENING" => DocumentType::CompanyRegistrationScreening,
            "DRIVING_LICENCE" => DocumentType::DrivingLicence,
            "DRIVING_LICENCE_BACK" => DocumentType::DrivingLicenceBack,
            "DRIVING_LICENCE_FRONT" => DocumentType::DrivingLicenceFront,
            "ID_CARD" => DocumentType::IdCard,
            "ID_CARD_BACK" => DocumentType::IdCardBack,
            "ID_CARD_FRONT" => DocumentType::IdCardFront,
            "PASSPORT" => DocumentType::Passport,
            "SSN" => DocumentType::Ssn,
            "SUPPORTING_DOCUMENTS" => DocumentType::SupportingDocuments,
            other => {
                return Err(UnknownTokenError {
                    kind: "document type",
                    token: other.to_string(),
                })
            }
        };
        Ok(document_type)
    }
}

// ============ Account Holder Snapshot ============

/// Snapshot of an account holder as previously read from the payment platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAccountHolderResponse {
    #[serde(default)]
    pub account_holder_code: Option<String>,
    #[serde(default)]
    pub account_holder_details: Option<AccountHolderDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHolderDetails {
    #[serde(default)]
    pub business_details: Option<BusinessDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    #[serde(default)]
    pub shareholders: Vec<ShareholderContact>,
}

impl GetAccountHolderResponse {
    /// Shareholders in the order the payment platform returned them.
    pub fn shareholders(&self) -> &[ShareholderContact] {
        self.account_holder_details
            .as_ref()
            .and_then(|details| details.business_details.as_ref())
            .map(|business| business.shareholders.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_civility_to_gender() {
        assert_eq!(Gender::from_civility(Some("Mr")), Gender::Male);
        assert_eq!(Gender::from_civility(Some("Mrs")), Gender::Female);
        assert_eq!(Gender::from_civility(Some("Miss")), Gender::Female);
        assert_eq!(Gender::from_civility(Some("MR")), Gender::Unknown);
        assert_eq!(Gender::from_civility(Some("Dr")), Gender::Unknown);
        assert_eq!(Gender::from_civility(None), Gender::Unknown);
    }

    #[test]
    fn test_phone_type_tokens() {
        assert_eq!("MOBILE".parse::<PhoneType>(), Ok(PhoneType::Mobile));
        assert_eq!("SIP".parse::<PhoneType>(), Ok(PhoneType::Sip));
        assert!("Mobile".parse::<PhoneType>().is_err());
        assert!("CARRIER_PIGEON".parse::<PhoneType>().is_err());
    }

    #[test]
    fn test_document_type_tokens() {
        assert_eq!("PASSPORT".parse::<DocumentType>(), Ok(DocumentType::Passport));
        assert_eq!(
            "DRIVING_LICENCE_FRONT".parse::<DocumentType>(),
            Ok(DocumentType::DrivingLicenceFront)
        );
        assert!("passport".parse::<DocumentType>().is_err());
        assert!("".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_shop_deserialization() {
        let shop: Shop = serde_json::from_value(json!({
            "shop_id": 2000,
            "shop_name": "Acme",
            "shop_additional_fields": [
                {"code": "adyen-ubo1-civility", "type": "LIST", "value": "Mr"},
                {"code": "adyen-ubo1-firstname", "type": "STRING", "value": "John"},
                {"code": "tags", "type": "MULTIPLE_VALUES_LIST", "value": ["a", "b"]}
            ]
        }))
        .unwrap();

        assert_eq!(shop.id, "2000");
        assert_eq!(shop.additional_field_values.len(), 3);
        assert_eq!(shop.additional_field_values[0].code(), "adyen-ubo1-civility");
        assert!(shop.additional_field_values[0].value_list_field().is_some());
        assert!(shop.additional_field_values[1].value_list_field().is_none());
        assert!(shop.additional_field_values[2].single_value_field().is_none());
        assert_eq!(shop.additional_field_values[2].code(), "tags");
    }

    #[test]
    fn test_shareholder_contact_serializes_camel_case() {
        let contact = ShareholderContact {
            shareholder_code: Some("SH123".to_string()),
            name: Some(Name {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                gender: Gender::Female,
            }),
            email: Some("j@x.com".to_string()),
            phone_number: Some(PhoneNumber {
                phone_type: Some(PhoneType::Mobile),
                ..Default::default()
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&contact).unwrap();
        assert_eq!(value["shareholderCode"], "SH123");
        assert_eq!(value["name"]["firstName"], "Jane");
        assert_eq!(value["name"]["gender"], "FEMALE");
        assert_eq!(value["phoneNumber"]["phoneType"], "Mobile");
        assert!(value.get("address").is_none());
    }

    #[test]
    fn test_snapshot_shareholders() {
        let snapshot: GetAccountHolderResponse = serde_json::from_value(json!({
            "accountHolderCode": "2000",
            "accountHolderDetails": {
                "businessDetails": {
                    "shareholders": [{"shareholderCode": "SH1"}, {"shareholderCode": "SH2"}]
                }
            }
        }))
        .unwrap();

        let codes: Vec<_> = snapshot
            .shareholders()
            .iter()
            .map(|s| s.shareholder_code.as_deref())
            .collect();
        assert_eq!(codes, vec![Some("SH1"), Some("SH2")]);

        assert!(GetAccountHolderResponse::default().shareholders().is_empty());
    }
}
