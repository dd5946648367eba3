//! Name composition and accumulation
//!
//! Registry enumerations write people as `Last, First, attributes...`.
//! A segment with a comma becomes a first/last pair, anything else stays a
//! single full name. Sections are folded into an [`Accumulation`] of included
//! names and exclusion keys.

use serde::{Deserialize, Serialize};

use crate::noise::screen;
use crate::reconcile::{ExclusionKey, ExclusionSet};
use crate::section::Section;
use crate::segment::Segments;

/// A person name as composed from one segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComposedName {
    /// Decomposed name; both parts are non-empty
    Pair { first: String, last: String },
    /// Undecomposed name; never empty
    Single { full: String },
}

impl ComposedName {
    pub fn pair(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self::Pair {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn single(full: impl Into<String>) -> Self {
        Self::Single { full: full.into() }
    }

    /// Name tokens in output order: first then last, or the full name
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Pair { first, last } => vec![first.as_str(), last.as_str()],
            Self::Single { full } => vec![full.as_str()],
        }
    }

    /// Key used when this name appears under a departed section
    pub fn exclusion_key(&self) -> ExclusionKey {
        match self {
            Self::Pair { last, .. } => ExclusionKey::LastName(last.clone()),
            Self::Single { full } => ExclusionKey::FullName(full.clone()),
        }
    }
}

impl std::fmt::Display for ComposedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pair { first, last } => write!(f, "{first} {last}"),
            Self::Single { full } => write!(f, "{full}"),
        }
    }
}

/// Compose a cleaned segment.
///
/// The text before the first comma is the last name and the text up to the
/// second comma the first name. Whatever follows the second comma
/// (nationality, residence, role) is not part of the name. Returns `None`
/// when nothing is left after trimming.
pub fn compose(cleaned: &str) -> Option<ComposedName> {
    let parts: Vec<&str> = cleaned.splitn(3, ',').map(str::trim).collect();

    match parts.as_slice() {
        [] => None,
        [full] if full.is_empty() => None,
        [full] => Some(ComposedName::single(*full)),
        [last, first, ..] => match (last.is_empty(), first.is_empty()) {
            (false, false) => Some(ComposedName::pair(*first, *last)),
            (false, true) => Some(ComposedName::single(*last)),
            (true, false) => Some(ComposedName::single(*first)),
            (true, true) => None,
        },
    }
}

/// Compose every non-noise segment of a section, in order
pub fn compose_section(section: &Section<'_>) -> Vec<ComposedName> {
    Segments::new(section.span, section.kind.delimiter())
        .filter_map(screen)
        .filter_map(|segment| {
            let composed = compose(&segment.cleaned);
            if composed.is_none() {
                tracing::trace!("Segment {:?} produced no name", segment.raw);
            }
            composed
        })
        .collect()
}

/// Names gathered for one company: included names and exclusion keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulation {
    pub included: Vec<ComposedName>,
    pub excluded: ExclusionSet,
}

impl Accumulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one section into the accumulation
    pub fn fold_section(mut self, section: &Section<'_>) -> Self {
        let names = compose_section(section);
        if section.kind.is_exclusion() {
            for name in &names {
                self.excluded.insert(name.exclusion_key());
            }
        } else {
            self.included.extend(names);
        }
        self
    }

    /// Append another accumulation, keeping this one's names first
    pub fn merge(mut self, other: Accumulation) -> Self {
        self.included.extend(other.included);
        self.excluded.extend(other.excluded);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }
}

/// Fold a sequence of sections into a fresh accumulation
pub fn fold_sections<'s, 'a: 's>(
    sections: impl IntoIterator<Item = &'s Section<'a>>,
) -> Accumulation {
    sections
        .into_iter()
        .fold(Accumulation::new(), |acc, section| acc.fold_section(section))
}
