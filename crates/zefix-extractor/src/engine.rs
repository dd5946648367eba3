//! Rule-based extraction engine
//!
//! Folds every publication of a company into one [`Accumulation`] and
//! reconciles it once all departed names are known.

use zefix_core::PublicationRecord;

use crate::compose::{fold_sections, Accumulation};
use crate::normalize::normalize;
use crate::reconcile::{reconcile, stable_unique};
use crate::section::SectionLocator;
use crate::{ExtractionResult, NameExtractor};

/// Section/segment grammar extractor
#[derive(Debug, Clone, Default)]
pub struct RuleBasedExtractor {
    locator: SectionLocator,
    deduplicate: bool,
}

impl RuleBasedExtractor {
    /// Create an extractor with the built-in header grammar
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom section locator
    pub fn with_locator(mut self, locator: SectionLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Drop repeated names after reconciliation
    pub fn with_deduplication(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Accumulate the names of one notice
    pub fn accumulate_message(&self, message: &str) -> Accumulation {
        let text = normalize(message);
        fold_sections(&self.locator.locate(&text))
    }

    /// Fold one publication into `acc`; records without text leave it unchanged
    pub fn fold_record(&self, acc: Accumulation, record: &PublicationRecord) -> Accumulation {
        match record.text() {
            Some(message) => acc.merge(self.accumulate_message(message)),
            None => acc,
        }
    }

    /// Accumulate all notices of a company, in the given order
    pub fn accumulate(&self, records: &[PublicationRecord]) -> Accumulation {
        records
            .iter()
            .fold(Accumulation::new(), |acc, record| self.fold_record(acc, record))
    }
}

impl NameExtractor for RuleBasedExtractor {
    fn extract(&self, records: &[PublicationRecord]) -> ExtractionResult {
        let acc = self.accumulate(records);
        tracing::debug!(
            "Accumulated {} names and {} exclusions from {} publications",
            acc.included.len(),
            acc.excluded.len(),
            records.len()
        );

        let mut names = reconcile(&acc);
        if self.deduplicate {
            names = stable_unique(names);
        }
        ExtractionResult::new(names)
    }

    fn name(&self) -> &str {
        "rules"
    }
}
