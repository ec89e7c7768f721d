//! Document schemas and API path kinds
//!
//! Field names follow the Oblio JSON schema (camelCase). Empty optional
//! fields are left out of the serialized document; the service validates the
//! rest.

use crate::error::OblioError;
use crate::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn de_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient::de_u64(deserializer).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

/// Kind of document created via `POST /api/docs/{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Invoice,
    Proforma,
    Notice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Proforma => "proforma",
            DocumentKind::Notice => "notice",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = OblioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(DocumentKind::Invoice),
            "proforma" => Ok(DocumentKind::Proforma),
            "notice" => Ok(DocumentKind::Notice),
            other => Err(OblioError::InvalidInput(format!(
                "Unknown document kind '{}'. Must be 'invoice', 'proforma' or 'notice'",
                other
            ))),
        }
    }
}

/// Reference data collection queried via `GET /api/nomenclature/{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NomenclatureKind {
    Companies,
    VatRates,
    Clients,
    Products,
    Series,
    Languages,
    Management,
}

impl NomenclatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NomenclatureKind::Companies => "companies",
            NomenclatureKind::VatRates => "vat_rates",
            NomenclatureKind::Clients => "clients",
            NomenclatureKind::Products => "products",
            NomenclatureKind::Series => "series",
            NomenclatureKind::Languages => "languages",
            NomenclatureKind::Management => "management",
        }
    }

    /// Whether the service requires a `cif` filter for this collection.
    pub fn requires_cif(&self) -> bool {
        !matches!(self, NomenclatureKind::Companies)
    }
}

impl fmt::Display for NomenclatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NomenclatureKind {
    type Err = OblioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "companies" => Ok(NomenclatureKind::Companies),
            "vat_rates" => Ok(NomenclatureKind::VatRates),
            "clients" => Ok(NomenclatureKind::Clients),
            "products" => Ok(NomenclatureKind::Products),
            "series" => Ok(NomenclatureKind::Series),
            "languages" => Ok(NomenclatureKind::Languages),
            "management" => Ok(NomenclatureKind::Management),
            other => Err(OblioError::InvalidInput(format!(
                "Unknown nomenclature kind '{}'",
                other
            ))),
        }
    }
}

/// Document (invoice, proforma, notice) to be issued
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    /// Fiscal code of the issuing company
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::de_date"
    )]
    pub issue_date: Option<NaiveDate>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::de_date"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    /// Decimal places used for amounts
    #[serde(skip_serializing_if = "is_zero_u32", deserialize_with = "de_u32")]
    pub precision: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issuer_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issuer_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notice_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internal_note: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_identity_card: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deputy_auto: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sales_agent: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mentions: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_station: String,
    pub client: Client,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
}

/// Customer the document is issued to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cif: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Trade register number
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iban: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bank: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact: String,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "lenient::de_bool")]
    pub vat_payer: bool,
    /// Store the client in the Oblio nomenclature
    #[serde(skip_serializing_if = "is_false", deserialize_with = "lenient::de_bool")]
    pub save: bool,
    /// Let the service complete the client's details from its CIF
    #[serde(skip_serializing_if = "is_false", deserialize_with = "lenient::de_bool")]
    pub autocomplete: bool,
}

/// Line item on a document
///
/// `price`, `quantity`, `exchange_rate` and `vat_included` are always sent,
/// even when zero or false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(skip_serializing_if = "is_zero_u32", deserialize_with = "de_u32")]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub measuring_unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub measuring_unit_translation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_type: String,
    #[serde(deserialize_with = "lenient::de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient::de_f64")]
    pub quantity: f64,
    #[serde(deserialize_with = "lenient::de_f64")]
    pub exchange_rate: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vat_name: String,
    #[serde(skip_serializing_if = "is_zero_f64", deserialize_with = "lenient::de_f64")]
    pub vat_percentage: f64,
    #[serde(deserialize_with = "lenient::de_bool")]
    pub vat_included: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub currency: String,
    /// Stock management unit the product is drawn from
    #[serde(skip_serializing_if = "String::is_empty")]
    pub management: String,
    #[serde(skip_serializing_if = "is_zero_u32", deserialize_with = "de_u32")]
    pub product_id: u32,
    #[serde(skip_serializing_if = "is_zero_f64", deserialize_with = "lenient::de_f64")]
    pub discount: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub discount_type: String,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "lenient::de_bool")]
    pub save: bool,
}
