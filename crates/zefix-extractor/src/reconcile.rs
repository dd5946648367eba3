//! Reconciliation of included names against departed people
//!
//! Matching is asymmetric: a departed pair is keyed by its last name and
//! removes every included token equal to it (first names included), while
//! a departed single name only removes an identical single token.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::compose::Accumulation;

/// Key derived from a name listed under a departed section
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExclusionKey {
    /// The departed entry was decomposed into first and last name
    LastName(String),
    /// The departed entry stayed a single full name
    FullName(String),
}

impl ExclusionKey {
    /// The string a name token must equal to be removed
    pub fn value(&self) -> &str {
        match self {
            Self::LastName(value) | Self::FullName(value) => value,
        }
    }
}

/// Set of exclusion keys; ordered so iteration is deterministic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    keys: BTreeSet<ExclusionKey>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ExclusionKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &ExclusionKey) -> bool {
        self.keys.contains(key)
    }

    /// Whether a flattened name token is excluded
    pub fn excludes(&self, token: &str) -> bool {
        self.keys.iter().any(|key| key.value() == token)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionKey> {
        self.keys.iter()
    }
}

impl Extend<ExclusionKey> for ExclusionSet {
    fn extend<T: IntoIterator<Item = ExclusionKey>>(&mut self, iter: T) {
        self.keys.extend(iter);
    }
}

impl FromIterator<ExclusionKey> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = ExclusionKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ExclusionSet {
    type Item = ExclusionKey;
    type IntoIter = std::collections::btree_set::IntoIter<ExclusionKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

/// Flatten included names into tokens and drop the excluded ones.
///
/// Must only run once the exclusion set holds every departed entry of the
/// company, since earlier tokens are not revisited.
pub fn reconcile(acc: &Accumulation) -> Vec<String> {
    let blocked: HashSet<&str> = acc.excluded.iter().map(ExclusionKey::value).collect();

    acc.included
        .iter()
        .flat_map(|name| name.tokens())
        .filter(|token| {
            let keep = !blocked.contains(token);
            if !keep {
                tracing::debug!("Removing departed name token {:?}", token);
            }
            keep
        })
        .map(str::to_string)
        .collect()
}

/// Remove repeated names, keeping the first occurrence of each
pub fn stable_unique(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ComposedName;

    fn accumulation(included: Vec<ComposedName>, excluded: Vec<ExclusionKey>) -> Accumulation {
        Accumulation {
            included,
            excluded: excluded.into_iter().collect(),
        }
    }

    #[test]
    fn test_last_name_exclusion() {
        let acc = accumulation(
            vec![
                ComposedName::pair("Hans", "Muster"),
                ComposedName::pair("Anna", "Meier"),
            ],
            vec![ComposedName::pair("Hans", "Muster").exclusion_key()],
        );
        assert_eq!(reconcile(&acc), vec!["Hans", "Anna", "Meier"]);
    }

    #[test]
    fn test_single_exclusion_matches_full_string_only() {
        let acc = accumulation(
            vec![
                ComposedName::single("Jean Dupont"),
                ComposedName::pair("Jean", "Dupont"),
            ],
            vec![ExclusionKey::FullName("Jean Dupont".into())],
        );
        assert_eq!(reconcile(&acc), vec!["Jean", "Dupont"]);
    }

    #[test]
    fn test_last_name_key_hits_first_name_token() {
        // Departed "Peter, Thomas" removes the first name of "Keller, Peter".
        let acc = accumulation(
            vec![ComposedName::pair("Peter", "Keller")],
            vec![ExclusionKey::LastName("Peter".into())],
        );
        assert_eq!(reconcile(&acc), vec!["Keller"]);
    }

    #[test]
    fn test_no_exclusions() {
        let acc = accumulation(vec![ComposedName::single("Eva Neu")], vec![]);
        assert_eq!(reconcile(&acc), vec!["Eva Neu"]);
        assert!(reconcile(&Accumulation::default()).is_empty());
    }

    #[test]
    fn test_duplicates_survive_reconcile() {
        let acc = accumulation(
            vec![
                ComposedName::pair("Hans", "Muster"),
                ComposedName::pair("Hans", "Muster"),
            ],
            vec![],
        );
        assert_eq!(reconcile(&acc), vec!["Hans", "Muster", "Hans", "Muster"]);
    }

    #[test]
    fn test_stable_unique() {
        let names = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(stable_unique(names), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_exclusion_set_ops() {
        let mut set = ExclusionSet::new();
        assert!(set.insert(ExclusionKey::LastName("Muster".into())));
        assert!(!set.insert(ExclusionKey::LastName("Muster".into())));
        assert!(set.excludes("Muster"));
        assert!(!set.excludes("Hans"));
        assert_eq!(set.len(), 1);
    }
}
