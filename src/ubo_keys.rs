//! Marketplace field codes for UBO (ultimate beneficial owner) data.
//!
//! Every UBO slot `n` owns one field per [`UboField`], named
//! `adyen-ubo<n>-<suffix>`. The marketplace schema is configured with these
//! exact codes, so generation and parsing must stay symmetric.

use crate::errors::AppError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

const ADYEN_UBO: &str = "adyen-ubo";

/// Logical UBO fields, one marketplace field code per slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UboField {
    Civility,
    FirstName,
    LastName,
    Email,
    DateOfBirth,
    Nationality,
    IdNumber,
    HouseNumberOrName,
    Street,
    City,
    PostalCode,
    Country,
    PhoneCountryCode,
    PhoneType,
    PhoneNumber,
}

impl UboField {
    pub const ALL: [UboField; 15] = [
        UboField::Civility,
        UboField::FirstName,
        UboField::LastName,
        UboField::Email,
        UboField::DateOfBirth,
        UboField::Nationality,
        UboField::IdNumber,
        UboField::HouseNumberOrName,
        UboField::Street,
        UboField::City,
        UboField::PostalCode,
        UboField::Country,
        UboField::PhoneCountryCode,
        UboField::PhoneType,
        UboField::PhoneNumber,
    ];

    /// Suffix used in the marketplace field code.
    pub fn suffix(self) -> &'static str {
        match self {
            UboField::Civility => "civility",
            UboField::FirstName => "firstname",
            UboField::LastName => "lastname",
            UboField::Email => "email",
            UboField::DateOfBirth => "dob",
            UboField::Nationality => "nationality",
            UboField::IdNumber => "idnumber",
            UboField::HouseNumberOrName => "housenumber",
            UboField::Street => "streetname",
            UboField::City => "city",
            UboField::PostalCode => "zip",
            UboField::Country => "country",
            UboField::PhoneCountryCode => "phonecountry",
            UboField::PhoneType => "phonetype",
            UboField::PhoneNumber => "phonenumber",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        UboField::ALL.into_iter().find(|field| field.suffix() == suffix)
    }

    /// Field code for this field in the given slot.
    pub fn code_for(self, ubo_number: u32) -> String {
        format!("{}{}-{}", ADYEN_UBO, ubo_number, self.suffix())
    }
}

impl fmt::Display for UboField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Slot number → logical field → marketplace field code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    slots: BTreeMap<u32, BTreeMap<UboField, String>>,
}

impl KeySchema {
    /// Field code for `field` in slot `ubo_number`, if the slot exists.
    pub fn field_code(&self, ubo_number: u32, field: UboField) -> Option<&str> {
        self.slots
            .get(&ubo_number)
            .and_then(|keys| keys.get(&field))
            .map(String::as_str)
    }

    /// Slots in ascending order with their field codes.
    pub fn slots(&self) -> impl Iterator<Item = (u32, &BTreeMap<UboField, String>)> {
        self.slots.iter().map(|(number, keys)| (*number, keys))
    }

    pub fn max_ubos(&self) -> u32 {
        self.slots.len() as u32
    }
}

/// Generates the field codes for UBO slots `1..=max_ubos`.
///
/// Fails with [`AppError::Configuration`] when no slot would exist.
pub fn generate_ubo_keys(max_ubos: u32) -> Result<KeySchema, AppError> {
    if max_ubos < 1 {
        return Err(AppError::Configuration(format!(
            "UBOs must exist, number found: {}",
            max_ubos
        )));
    }

    let slots = (1..=max_ubos)
        .map(|ubo_number| {
            let keys = UboField::ALL
                .into_iter()
                .map(|field| (field, field.code_for(ubo_number)))
                .collect();
            (ubo_number, keys)
        })
        .collect();

    Ok(KeySchema { slots })
}

fn field_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^adyen-ubo(\d+)-([a-z]+)$").expect("valid UBO field code regex"))
}

/// Parses a field code back into its slot number and logical field.
///
/// Returns `None` for anything that is not one of the 15 per-slot codes,
/// including the photo id document codes.
pub fn parse_ubo_field_code(code: &str) -> Option<(u32, UboField)> {
    let captures = field_code_regex().captures(code)?;
    let ubo_number: u32 = captures[1].parse().ok()?;
    if ubo_number < 1 {
        return None;
    }
    let field = UboField::from_suffix(&captures[2])?;
    // Reject non-canonical numbering such as "adyen-ubo01-email".
    if field.code_for(ubo_number) != code {
        return None;
    }
    Some((ubo_number, field))
}

/// Document type code of the front photo id upload for a slot.
pub fn photo_id_front_code(ubo_number: u32) -> String {
    format!("{}{}-photoid", ADYEN_UBO, ubo_number)
}

/// Document type code of the rear photo id upload for a slot.
pub fn photo_id_rear_code(ubo_number: u32) -> String {
    format!("{}{}-photoid-rear", ADYEN_UBO, ubo_number)
}

/// Value-list field holding the photo id document type for a slot.
pub fn photo_id_type_code(ubo_number: u32) -> String {
    format!("{}{}-photoidtype", ADYEN_UBO, ubo_number)
}
