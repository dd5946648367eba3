//! Zefix Extractor - Person names from commercial registry notices
//!
//! Two strategies share the [`NameExtractor`] trait:
//! - [`RuleBasedExtractor`]: header grammar, segment tokenizer, noise filter,
//!   name composer and departed-person reconciliation
//! - [`ModelBasedExtractor`]: language detection plus a per-language
//!   person-entity model

use std::sync::Arc;

use zefix_core::{ExtractionConfig, PublicationRecord, Strategy};

pub mod compose;
pub mod engine;
pub mod language;
pub mod model;
pub mod noise;
pub mod normalize;
pub mod reconcile;
pub mod section;
pub mod segment;

pub use compose::{Accumulation, ComposedName};
pub use engine::RuleBasedExtractor;
pub use language::{Language, LanguageDetector};
pub use model::{ModelBasedExtractor, ModelError, ModelRegistry, PersonEntityModel};
pub use reconcile::{ExclusionKey, ExclusionSet};
pub use section::{Section, SectionKind, SectionLocator};

/// Output used in place of an empty name list
pub const NO_NAMES_FOUND: &str = "No names found";

/// Ordered person-name tokens extracted for one company
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionResult {
    names: Vec<String>,
}

impl ExtractionResult {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Names as reported, or the single sentinel when nothing was found
    pub fn to_output(&self) -> Vec<String> {
        if self.names.is_empty() {
            vec![NO_NAMES_FOUND.to_string()]
        } else {
            self.names.clone()
        }
    }

    /// Join the reported names with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.to_output().join(separator)
    }
}

/// Trait for name extraction strategies
pub trait NameExtractor: Send + Sync {
    /// Extract the names of one company from all of its publications
    fn extract(&self, records: &[PublicationRecord]) -> ExtractionResult;

    /// Strategy name, for logging
    fn name(&self) -> &str;
}

/// Build the extractor selected by `config`
pub fn build_extractor(
    config: &ExtractionConfig,
    models: Arc<ModelRegistry>,
) -> Box<dyn NameExtractor> {
    match config.strategy {
        Strategy::Rules => {
            Box::new(RuleBasedExtractor::new().with_deduplication(config.deduplicate))
        }
        Strategy::Model => Box::new(ModelBasedExtractor::new(models)),
    }
}
