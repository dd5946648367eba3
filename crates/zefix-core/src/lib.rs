//! ZEFIX Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the workspace:
//! - Registry records (company summaries, details, addresses, publications)
//! - Export rows
//! - Common error types
//! - The `RegistryClient` trait implemented by HTTP backends
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, ExportConfig, ExtractionConfig, LoggingConfig, RegistryConfig,
    Strategy,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for registry lookups and exports
#[derive(Error, Debug)]
pub enum ZefixError {
    #[error("Registry returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to decode registry response: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for ZefixError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ZefixError>;

/// Minimum length of a company search key
pub const MIN_SEARCH_KEY_LEN: usize = 3;

/// Validate a user supplied search key and return it trimmed
pub fn validate_search_key(key: &str) -> Result<&str> {
    let trimmed = key.trim();
    if trimmed.chars().count() < MIN_SEARCH_KEY_LEN {
        return Err(ZefixError::ValidationError(format!(
            "Search key must be at least {MIN_SEARCH_KEY_LEN} characters long"
        )));
    }
    Ok(trimmed)
}

// ============================================================================
// Registry Models
// ============================================================================

/// Lifecycle status of a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    Active,
    BeingCancelled,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl CompanyStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Entry of a registry name search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    /// Enterprise identification number (e.g. "CHE-123.456.789")
    pub uid: String,

    /// Registered company name
    #[serde(default)]
    pub name: String,

    /// Registry status
    pub status: CompanyStatus,
}

/// Postal address of a company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyAddress {
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub swiss_zip_code: Option<String>,
}

/// One legal notice published in the Swiss Official Gazette of Commerce
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationRecord {
    /// Free text of the notice; may be missing or empty
    pub message: Option<String>,

    /// Publication date
    pub sogc_date: Option<NaiveDate>,

    /// Gazette identifier
    pub sogc_id: Option<i64>,
}

impl PublicationRecord {
    /// Create a record carrying only a message
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Message text, if present and not blank
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }
}

/// Full registry entry for a company
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    pub uid: String,

    pub name: String,

    pub status: CompanyStatus,

    #[serde(default)]
    pub address: CompanyAddress,

    /// Gazette publications attached to the entry
    #[serde(default)]
    pub sogc_pub: Vec<PublicationRecord>,
}

// ============================================================================
// Export Rows
// ============================================================================

/// One exported CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRow {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Street")]
    pub street: String,

    #[serde(rename = "HouseNumber")]
    pub house_number: String,

    #[serde(rename = "City")]
    pub city: String,

    #[serde(rename = "SwissZipCode")]
    pub swiss_zip_code: String,

    /// Extracted person names, already joined into one cell
    #[serde(rename = "OwnerNames")]
    pub owner_names: String,
}

impl CompanyRow {
    /// Build a row from a company detail and its rendered owner names
    pub fn new(detail: &CompanyDetail, owner_names: impl Into<String>) -> Self {
        let address = &detail.address;
        Self {
            name: detail.name.clone(),
            street: address.street.clone().unwrap_or_default(),
            house_number: address.house_number.clone().unwrap_or_default(),
            city: address.city.clone().unwrap_or_default(),
            swiss_zip_code: address.swiss_zip_code.clone().unwrap_or_default(),
            owner_names: owner_names.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for registry backends
#[async_trait::async_trait]
pub trait RegistryClient: Send + Sync {
    /// Search for companies by name fragment, returning UIDs of active entries
    async fn search(&self, name_fragment: &str) -> Result<Vec<String>>;

    /// Fetch the active registry entries for a UID
    async fn company_details(&self, uid: &str) -> Result<Vec<CompanyDetail>>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"[
        {
            "uid": "CHE-123.456.789",
            "name": "Muster Holding AG",
            "status": "ACTIVE",
            "legalSeat": "Zürich",
            "address": {
                "organisation": "Muster Holding AG",
                "street": "Bahnhofstrasse",
                "houseNumber": "1",
                "city": "Zürich",
                "swissZipCode": "8001"
            },
            "sogcPub": [
                {
                    "sogcDate": "2021-03-04",
                    "sogcId": 1005123456,
                    "message": "Eingetragene Personen: Muster, Hans;"
                },
                { "sogcDate": "2019-01-02" }
            ]
        }
    ]"#;

    #[test]
    fn test_company_detail_deserialize() {
        let details: Vec<CompanyDetail> = serde_json::from_str(DETAIL_JSON).unwrap();
        assert_eq!(details.len(), 1);

        let detail = &details[0];
        assert!(detail.status.is_active());
        assert_eq!(detail.address.swiss_zip_code.as_deref(), Some("8001"));
        assert_eq!(detail.sogc_pub.len(), 2);
        assert_eq!(
            detail.sogc_pub[0].sogc_date,
            NaiveDate::from_ymd_opt(2021, 3, 4)
        );
        assert!(detail.sogc_pub[1].text().is_none());
    }

    #[test]
    fn test_unknown_status_is_not_active() {
        let summary: CompanySummary =
            serde_json::from_str(r#"{"uid": "CHE-1", "name": "X", "status": "MERGED"}"#).unwrap();
        assert_eq!(summary.status, CompanyStatus::Unknown);
        assert!(!summary.status.is_active());

        let cancelled: CompanyStatus = serde_json::from_str(r#""BEING_CANCELLED""#).unwrap();
        assert_eq!(cancelled, CompanyStatus::BeingCancelled);
    }

    #[test]
    fn test_blank_message_has_no_text() {
        assert!(PublicationRecord::from_message("   ").text().is_none());
        assert_eq!(
            PublicationRecord::from_message("Titulaire: Dupont").text(),
            Some("Titulaire: Dupont")
        );
    }

    #[test]
    fn test_company_row_from_detail() {
        let details: Vec<CompanyDetail> = serde_json::from_str(DETAIL_JSON).unwrap();
        let row = CompanyRow::new(&details[0], "Hans; Muster");

        assert_eq!(row.name, "Muster Holding AG");
        assert_eq!(row.street, "Bahnhofstrasse");
        assert_eq!(row.house_number, "1");
        assert_eq!(row.owner_names, "Hans; Muster");
    }

    #[test]
    fn test_missing_address_fields_render_empty() {
        let detail = CompanyDetail {
            uid: "CHE-1".to_string(),
            name: "Leer GmbH".to_string(),
            status: CompanyStatus::Active,
            address: CompanyAddress::default(),
            sogc_pub: Vec::new(),
        };
        let row = CompanyRow::new(&detail, "No names found");
        assert_eq!(row.city, "");
        assert_eq!(row.swiss_zip_code, "");
    }

    #[test]
    fn test_validate_search_key() {
        assert_eq!(validate_search_key("  bau ").unwrap(), "bau");
        assert!(matches!(
            validate_search_key("ab"),
            Err(ZefixError::ValidationError(_))
        ));
        assert!(validate_search_key("    ").is_err());
    }
}
