//! Languages of registry notices and stopword-based language detection

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Languages the extraction engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    German,
    French,
    Italian,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::German, Self::French, Self::Italian];

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::German => "de",
            Self::French => "fr",
            Self::Italian => "it",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "de" => Some(Self::German),
            "fr" => Some(Self::French),
            "it" => Some(Self::Italian),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

const GERMAN_STOPWORDS: &[&str] = &[
    "der", "die", "das", "und", "in", "mit", "von", "zu", "den", "des", "ist", "im", "auf",
    "für", "nicht", "sich", "dem", "ein", "eine", "einer", "als", "auch", "bei", "aus", "nach",
    "wird", "sind", "oder", "zur", "zum", "unterschrift", "personen", "eingetragene",
    "gesellschaft", "staatsangehöriger", "staatsangehörige", "mitglied",
];

const FRENCH_STOPWORDS: &[&str] = &[
    "le", "la", "les", "de", "des", "du", "et", "en", "un", "une", "est", "dans", "pour", "par",
    "sur", "au", "aux", "avec", "qui", "que", "ne", "pas", "son", "sa", "ses", "à", "signature",
    "personnes", "inscrites", "société", "originaire", "membre", "ressortissant",
];

const ITALIAN_STOPWORDS: &[&str] = &[
    "il", "lo", "la", "gli", "le", "di", "da", "del", "della", "dei", "delle", "e", "in", "con",
    "per", "su", "un", "una", "che", "non", "sono", "è", "al", "alla", "firma", "persone",
    "iscritte", "società", "attinente", "membro", "cittadino",
];

const ENGLISH_STOPWORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "is", "for", "with", "on", "by", "as", "at", "from", "this",
    "that", "are", "was", "be", "an", "or", "which", "company", "shares",
];

/// Failure modes of language detection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    #[error("no language signal in text")]
    NoSignal,

    #[error("unsupported language: {0}")]
    Unsupported(String),
}

/// Stopword-frequency language detector.
///
/// Scores de/fr/it plus English as a reject class; the highest count wins,
/// ties are broken in favour of the earlier language in the table.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    profiles: Vec<(&'static str, HashSet<&'static str>)>,
}

impl LanguageDetector {
    pub fn new() -> Self {
        let profile = |code: &'static str, words: &[&'static str]| {
            (code, words.iter().copied().collect::<HashSet<_>>())
        };
        Self {
            profiles: vec![
                profile("de", GERMAN_STOPWORDS),
                profile("fr", FRENCH_STOPWORDS),
                profile("it", ITALIAN_STOPWORDS),
                profile("en", ENGLISH_STOPWORDS),
            ],
        }
    }

    /// Detect the dominant language code of `text`
    pub fn detect_code(&self, text: &str) -> Result<&'static str, DetectionError> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut best: Option<(&'static str, usize)> = None;
        for (code, stopwords) in &self.profiles {
            let score = words
                .iter()
                .filter(|w| stopwords.contains(w.as_str()))
                .count();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((*code, score));
            }
        }

        best.map(|(code, _)| code).ok_or(DetectionError::NoSignal)
    }

    /// Detect the dominant language, restricted to supported languages
    pub fn detect(&self, text: &str) -> Result<Language, DetectionError> {
        let code = self.detect_code(text)?;
        Language::from_code(code).ok_or_else(|| DetectionError::Unsupported(code.to_string()))
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}
