//! Zefix Registry - Client for the ZEFIX public REST API
//!
//! Company search and company detail lookups with HTTP basic auth.
//! Only companies in `ACTIVE` status are returned.
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use zefix_core::{
    CompanyDetail, CompanySummary, ConfigError, RegistryClient, RegistryConfig, Result,
    ZefixError,
};

/// Request body of `POST /company/search`
#[derive(Debug, Serialize, PartialEq, Eq)]
struct SearchRequest {
    name: String,
}

/// Wrap a name fragment for a contains-search
pub fn wildcard(fragment: &str) -> String {
    format!("*{}*", fragment.trim())
}

/// Parse a search response into the UIDs of active companies
pub fn parse_search_response(body: &str) -> Result<Vec<String>> {
    let companies: Vec<CompanySummary> = serde_json::from_str(body)
        .map_err(|e| ZefixError::Decode(format!("search response: {e}")))?;

    Ok(companies
        .into_iter()
        .filter(|c| c.status.is_active())
        .map(|c| c.uid)
        .collect())
}

/// Parse a detail response, keeping active entries only
pub fn parse_detail_response(body: &str) -> Result<Vec<CompanyDetail>> {
    let details: Vec<CompanyDetail> = serde_json::from_str(body)
        .map_err(|e| ZefixError::Decode(format!("detail response: {e}")))?;

    Ok(details
        .into_iter()
        .filter(|d| d.status.is_active())
        .collect())
}

// ============================================================================
// ZEFIX Client
// ============================================================================

/// ZEFIX REST API client
pub struct ZefixClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ZefixClient {
    /// Create a new client with default timeout
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create from config; credentials are required
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let username = config
            .username
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired("API_USERNAME".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired("API_PASSWORD".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ZefixError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self) -> String {
        format!("{}/company/search", self.base_url)
    }

    fn detail_url(&self, uid: &str) -> String {
        format!("{}/company/uid/{}", self.base_url, uid.trim())
    }

    /// Read the body of a response, mapping non-2xx statuses to errors
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ZefixError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RegistryClient for ZefixClient {
    async fn search(&self, name_fragment: &str) -> Result<Vec<String>> {
        let request = SearchRequest {
            name: wildcard(name_fragment),
        };
        tracing::debug!("Searching registry for {:?}", request.name);

        let response = self
            .client
            .post(self.search_url())
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ZefixError::Request(format!("Search request failed: {e}")))?;

        // The registry answers an empty search with 404.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("No companies match {:?}", request.name);
            return Ok(Vec::new());
        }

        let body = Self::read_body(response).await?;
        let uids = parse_search_response(&body)?;
        tracing::debug!("Search {:?} returned {} active companies", request.name, uids.len());
        Ok(uids)
    }

    async fn company_details(&self, uid: &str) -> Result<Vec<CompanyDetail>> {
        let response = self
            .client
            .get(self.detail_url(uid))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| ZefixError::Request(format!("Detail request for {uid} failed: {e}")))?;

        let body = Self::read_body(response).await?;
        parse_detail_response(&body)
    }

    fn name(&self) -> &str {
        "zefix"
    }
}
