//! Search, fetch and extract pipeline
//!
//! Searches the registry once, then fetches company details with bounded
//! concurrency in search-result order and extracts owner names per company.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use zefix_core::{validate_search_key, CompanyDetail, CompanyRow, RegistryClient, Result};
use zefix_extractor::NameExtractor;

/// Progress of the detail-fetch phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Companies processed so far, failed ones included
    pub completed: usize,
    pub total: usize,
    /// UID of the company just processed
    pub uid: String,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total).min(100) as u8
    }
}

/// Registry-to-rows pipeline
pub struct Pipeline {
    client: Arc<dyn RegistryClient>,
    extractor: Box<dyn NameExtractor>,
    max_concurrent_requests: usize,
    join_separator: String,
}

impl Pipeline {
    pub fn new(client: Arc<dyn RegistryClient>, extractor: Box<dyn NameExtractor>) -> Self {
        Self {
            client,
            extractor,
            max_concurrent_requests: 4,
            join_separator: "; ".to_string(),
        }
    }

    /// Set the number of detail lookups in flight; zero is treated as one
    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Set the separator used to join names into one cell
    pub fn with_join_separator(mut self, separator: impl Into<String>) -> Self {
        self.join_separator = separator.into();
        self
    }

    /// Build the export row of one company
    pub fn company_row(&self, detail: &CompanyDetail) -> CompanyRow {
        let names = self.extractor.extract(&detail.sogc_pub);
        tracing::debug!(
            "{} ({}): {} names via {}",
            detail.name,
            detail.uid,
            names.len(),
            self.extractor.name()
        );
        CompanyRow::new(detail, names.join(&self.join_separator))
    }

    /// Fetch one company and build its rows
    pub async fn company(&self, uid: &str) -> Result<Vec<CompanyRow>> {
        let details = self.client.company_details(uid).await?;
        Ok(details.iter().map(|d| self.company_row(d)).collect())
    }

    /// Run a full search.
    ///
    /// A failed search is returned as an error; a failed detail lookup is
    /// logged and that company skipped.
    pub async fn run<F>(&self, search_key: &str, mut on_progress: F) -> Result<Vec<CompanyRow>>
    where
        F: FnMut(Progress),
    {
        let key = validate_search_key(search_key)?;
        let uids = self.client.search(key).await?;
        let total = uids.len();
        tracing::info!(
            "Found {} active companies for {:?} via {}",
            total,
            key,
            self.client.name()
        );

        let mut fetches = stream::iter(uids)
            .map(|uid| async move {
                let result = self.client.company_details(&uid).await;
                (uid, result)
            })
            .buffered(self.max_concurrent_requests);

        let mut rows = Vec::new();
        let mut completed = 0;
        while let Some((uid, result)) = fetches.next().await {
            completed += 1;
            match result {
                Ok(details) => rows.extend(details.iter().map(|d| self.company_row(d))),
                Err(e) => tracing::warn!("Skipping company {}: {}", uid, e),
            }
            on_progress(Progress {
                completed,
                total,
                uid,
            });
        }

        tracing::info!("Processed {} of {} companies", rows.len(), total);
        Ok(rows)
    }
}
