//! Section location in registry notices
//!
//! A notice lists people under labelled headers such as
//! `Eingetragene Personen neu oder mutierend:` or `Titulaire:`. A section is
//! the text after one header and before the next recognized header (of any
//! kind) or the end of the notice.
//!
//! Header grammar: a case-sensitive phrase, an optional qualifier of at most
//! 80 characters containing no `:`, `;` or `.`, and a terminating colon.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Role of the people listed in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Newly registered or changed people
    Registered,
    /// Holders and managing partners, listed on a single line
    Holder,
    /// People who left; their names are excluded from the result
    Departed,
}

impl SectionKind {
    /// Character separating the entries of this section
    pub fn delimiter(&self) -> char {
        match self {
            Self::Holder => ',',
            Self::Registered | Self::Departed => ';',
        }
    }

    /// Whether entries of this section feed the exclusion set
    pub fn is_exclusion(&self) -> bool {
        matches!(self, Self::Departed)
    }
}

/// Compiled header pattern
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    pub language: Language,
    pub kind: SectionKind,
    regex: Regex,
}

/// A located section of a notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub language: Language,
    pub kind: SectionKind,
    /// Byte offset of the header
    pub header_start: usize,
    /// Byte offset immediately after the header's colon
    pub offset: usize,
    /// Text between the header and the next header or end of text
    pub span: &'a str,
}

/// Locates person sections for every supported language
#[derive(Debug, Clone)]
pub struct SectionLocator {
    patterns: Vec<HeaderPattern>,
}

const QUALIFIER: &str = r"[^:;.]{0,80}:";

impl SectionLocator {
    /// Create a locator with the built-in de/fr/it headers
    pub fn new() -> Self {
        let mut locator = Self {
            patterns: Vec::new(),
        };
        locator.init_default_patterns();
        locator
    }

    /// Create a locator without any pattern
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    fn init_default_patterns(&mut self) {
        use Language::*;
        use SectionKind::*;

        // German
        self.add_pattern(German, Registered, r"Eingetragene Personen");
        self.add_pattern(German, Departed, r"Ausgeschiedene Personen");

        // French
        self.add_pattern(
            French,
            Registered,
            r"(?:Personne\(s\) inscrite\(s\)|Personnes inscrites|Personne inscrite)",
        );
        self.add_pattern(French, Holder, r"(?:Titulaire|Associée?s?-gérante?s?)");
        self.add_pattern(
            French,
            Departed,
            r"(?:Personne\(s\) radiée\(s\)|Personnes radiées|Personne radiée)",
        );

        // Italian
        self.add_pattern(Italian, Registered, r"(?:Persone iscritte|Persona iscritta)");
        self.add_pattern(
            Italian,
            Departed,
            r"(?:Persone dimissionarie|Persone uscite|Persona uscita)",
        );
    }

    /// Add a header phrase; the qualifier and colon are appended.
    ///
    /// Returns `false` and logs when the phrase is not a valid regex.
    pub fn add_pattern(&mut self, language: Language, kind: SectionKind, phrase: &str) -> bool {
        match Regex::new(&format!(r"\b{phrase}{QUALIFIER}")) {
            Ok(regex) => {
                self.patterns.push(HeaderPattern {
                    language,
                    kind,
                    regex,
                });
                true
            }
            Err(e) => {
                tracing::warn!("Ignoring invalid header pattern {:?}: {}", phrase, e);
                false
            }
        }
    }

    pub fn patterns(&self) -> &[HeaderPattern] {
        &self.patterns
    }

    /// Locate all sections in normalized text.
    ///
    /// Each pattern is searched independently; sections come back in pattern
    /// order, then by position.
    pub fn locate<'a>(&self, text: &'a str) -> Vec<Section<'a>> {
        let matches: Vec<(&HeaderPattern, usize, usize)> = self
            .patterns
            .iter()
            .flat_map(|pattern| {
                pattern
                    .regex
                    .find_iter(text)
                    .map(move |m| (pattern, m.start(), m.end()))
            })
            .collect();

        let mut boundaries: Vec<usize> = matches.iter().map(|(_, start, _)| *start).collect();
        boundaries.sort_unstable();
        boundaries.dedup();

        matches
            .into_iter()
            .map(|(pattern, header_start, offset)| {
                let end = boundaries
                    .iter()
                    .copied()
                    .find(|&boundary| boundary >= offset)
                    .unwrap_or(text.len());
                Section {
                    language: pattern.language,
                    kind: pattern.kind,
                    header_start,
                    offset,
                    span: &text[offset..end],
                }
            })
            .collect()
    }
}

impl Default for SectionLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<(Language, SectionKind, String)> {
        SectionLocator::new()
            .locate(text)
            .into_iter()
            .map(|s| (s.language, s.kind, s.span.trim().to_string()))
            .collect()
    }

    #[test]
    fn test_german_registered() {
        let found = spans("Eingetragene Personen: Muster, Hans; Meier, Anna");
        assert_eq!(
            found,
            vec![(
                Language::German,
                SectionKind::Registered,
                "Muster, Hans; Meier, Anna".to_string()
            )]
        );
    }

    #[test]
    fn test_german_qualifier() {
        let found = spans(
            "Eingetragene Personen neu oder mutierend: Muster, Hans, von Bern, in Zürich.",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].2, "Muster, Hans, von Bern, in Zürich.");
    }

    #[test]
    fn test_registered_and_departed_coexist() {
        let text = "Ausgeschiedene Personen und erloschene Unterschriften: Alt, Peter; \
                    Eingetragene Personen neu oder mutierend: Neu, Eva;";
        let found = spans(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].1, SectionKind::Registered);
        assert_eq!(found[0].2, "Neu, Eva;");
        assert_eq!(found[1].1, SectionKind::Departed);
        assert_eq!(found[1].2, "Alt, Peter;");
    }

    #[test]
    fn test_french_headers() {
        let found = spans("Personne(s) inscrite(s): Dupont, Jean; Martin, Claire.");
        assert_eq!(found[0].0, Language::French);
        assert_eq!(found[0].1, SectionKind::Registered);
        assert_eq!(found[0].2, "Dupont, Jean; Martin, Claire.");

        let found = spans("Titulaire: Jean Dupont, de Genève");
        assert_eq!(found[0].1, SectionKind::Holder);
        assert_eq!(found[0].2, "Jean Dupont, de Genève");

        let found = spans("Associé-gérant: Claire Martin");
        assert_eq!(found[0].1, SectionKind::Holder);

        let found = spans("Personnes radiées avec extinction de leurs pouvoirs: Roux, Luc;");
        assert_eq!(found[0].1, SectionKind::Departed);
        assert_eq!(found[0].2, "Roux, Luc;");
    }

    #[test]
    fn test_italian_headers() {
        let found = spans("Persone iscritte: Rossi, Mario; Bianchi, Lucia");
        assert_eq!(found[0].0, Language::Italian);
        assert_eq!(found[0].2, "Rossi, Mario; Bianchi, Lucia");

        let found = spans("Persone dimissionarie e firme cancellate: Verdi, Paolo");
        assert_eq!(found[0].1, SectionKind::Departed);
        assert_eq!(found[0].2, "Verdi, Paolo");

        let found = spans("Persona uscita: Neri, Giulia");
        assert_eq!(found[0].0, Language::Italian);
        assert_eq!(found[0].1, SectionKind::Departed);
        assert_eq!(found[0].2, "Neri, Giulia");
    }

    #[test]
    fn test_headers_are_case_sensitive() {
        assert!(spans("eingetragene personen: Muster, Hans").is_empty());
        assert!(spans("TITULAIRE: Dupont").is_empty());
    }

    #[test]
    fn test_header_requires_colon_nearby() {
        assert!(spans("Eingetragene Personen werden nicht publiziert.").is_empty());
    }

    #[test]
    fn test_repeated_header_each_located() {
        let text = "Eingetragene Personen: A, B; Ausgeschiedene Personen: C, D; \
                    Eingetragene Personen: E, F";
        let found = spans(text);
        let registered: Vec<&str> = found
            .iter()
            .filter(|(_, kind, _)| *kind == SectionKind::Registered)
            .map(|(_, _, span)| span.as_str())
            .collect();
        assert_eq!(registered, vec!["A, B;", "E, F"]);
    }

    #[test]
    fn test_offsets() {
        let text = "Titulaire: Dupont";
        let sections = SectionLocator::new().locate(text);
        assert_eq!(sections[0].header_start, 0);
        assert_eq!(sections[0].offset, "Titulaire:".len());
    }

    #[test]
    fn test_no_header() {
        assert!(spans("Neue Firma. Zweck: Handel mit Waren.").is_empty());
        assert!(spans("").is_empty());
    }

    #[test]
    fn test_custom_pattern() {
        let mut locator = SectionLocator::empty();
        assert!(locator.add_pattern(Language::German, SectionKind::Holder, "Inhaber"));
        assert!(!locator.add_pattern(Language::German, SectionKind::Holder, "(unclosed"));
        let sections = locator.locate("Inhaber: Muster");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].span.trim(), "Muster");
    }
}
