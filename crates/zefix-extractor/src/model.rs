//! Model-based extraction
//!
//! Alternative to the rule-based engine: detect the language of each notice,
//! run the person-entity model registered for it, then clean and validate
//! the candidates. Models live in a [`ModelRegistry`] built once by the
//! caller and shared by reference.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use zefix_core::PublicationRecord;

use crate::language::{DetectionError, Language, LanguageDetector};
use crate::normalize::{collapse_whitespace, normalize, strip_markup};
use crate::reconcile::stable_unique;
use crate::{ExtractionResult, NameExtractor};

/// Registry boilerplate that shows up inside recognized entities
pub const BLACKLIST_TERMS: &[&str] = &[
    "Statuts",
    "Feuille",
    "Organe",
    "Publ",
    "TYPE",
    "Zweck",
    "FT",
    "AG",
    "Officielle Suisse du Commerce",
];

/// Lowercase particles allowed inside a person name
pub const VALID_NAME_PARTICLES: &[&str] =
    &["da", "de", "van", "von", "del", "dos", "du", "di", "la", "le", "der"];

static TRAILING_SEMICOLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+;\s*$").expect("valid semicolon regex"));
static EDGE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[;\s]+|[;\s]+$").expect("valid separator regex"));

// ============================================================================
// Errors
// ============================================================================

/// Failures of the model-based path; each degrades to no names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("language detection failed: {0}")]
    DetectionFailed(String),

    #[error("unsupported language detected: {0}")]
    UnsupportedLanguage(String),

    #[error("no model registered for language {0}")]
    ModelUnavailable(Language),
}

impl From<DetectionError> for ModelError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::Unsupported(code) => Self::UnsupportedLanguage(code),
            other => Self::DetectionFailed(other.to_string()),
        }
    }
}

// ============================================================================
// Models
// ============================================================================

/// Trait for language-specific person-entity models
pub trait PersonEntityModel: Send + Sync {
    /// Language the model was built for
    fn language(&self) -> Language;

    /// Person entities found in `text`, in document order
    fn person_entities(&self, text: &str) -> Vec<String>;
}

const SHARED_VOCABULARY: &[&str] = &[
    "ag", "sa", "gmbh", "holding", "sàrl", "sagl", "ch", "chf", "che", "shab", "fosc", "fusc",
];

const GERMAN_VOCABULARY: &[&str] = &[
    "eingetragene", "ausgeschiedene", "personen", "person", "unterschrift", "unterschriften",
    "einzelunterschrift", "kollektivunterschrift", "kollektivprokura", "prokura",
    "staatsangehöriger", "staatsangehörige", "mitglied", "präsident", "präsidentin",
    "vizepräsident", "verwaltungsrat", "verwaltungsrates", "geschäftsführer",
    "geschäftsführerin", "gesellschafter", "gesellschafterin", "revisionsstelle",
    "aktiengesellschaft", "gesellschaft", "statuten", "firma", "sitz", "domizil",
    "aktienkapital", "stammkapital", "stammanteile", "namenaktien", "liberierung",
    "handelsregister", "tagesregister", "publikation", "publikationsorgan", "mutation",
    "inhaber", "inhaberin", "einzelfirma", "neu", "mutierend", "erloschene",
];

const FRENCH_VOCABULARY: &[&str] = &[
    "personnes", "personne", "inscrites", "radiées", "titulaire", "associé-gérant",
    "associée-gérante", "statuts", "feuille", "officielle", "suisse", "commerce", "société",
    "conseil", "administration", "président", "présidente", "membre", "signature",
    "individuelle", "collective", "organe", "publication", "capital", "actions", "but",
    "siège", "domicile", "raison", "sociale", "gérant", "gérante", "directeur", "directrice",
];

const ITALIAN_VOCABULARY: &[&str] = &[
    "persone", "persona", "iscritte", "iscritta", "dimissionarie", "uscite", "società",
    "consiglio", "amministrazione", "presidente", "membro", "firma", "individuale",
    "collettiva", "statuti", "foglio", "ufficiale", "svizzero", "commercio", "capitale",
    "azioni", "scopo", "sede", "recapito", "organo", "pubblicazione", "gerente", "direttore",
];

/// Capitalization-driven person recognizer.
///
/// Recognizes `Last, First` enumerations (optionally with leading name
/// particles on the last name) and runs of two to four capitalized words,
/// ignoring a per-language vocabulary of registry terms.
#[derive(Debug, Clone)]
pub struct HeuristicPersonModel {
    language: Language,
    vocabulary: HashSet<&'static str>,
}

const MAX_RUN: usize = 4;

#[derive(Debug)]
struct Token<'a> {
    core: &'a str,
    breaks: bool,
    comma: bool,
}

impl HeuristicPersonModel {
    pub fn new(language: Language) -> Self {
        let specific = match language {
            Language::German => GERMAN_VOCABULARY,
            Language::French => FRENCH_VOCABULARY,
            Language::Italian => ITALIAN_VOCABULARY,
        };
        Self {
            language,
            vocabulary: SHARED_VOCABULARY
                .iter()
                .chain(specific)
                .copied()
                .collect(),
        }
    }

    fn tokenize(text: &str) -> Vec<Token<'_>> {
        text.split_whitespace()
            .map(|raw| {
                let core = raw.trim_matches(|c: char| {
                    matches!(c, ',' | ';' | '.' | ':' | '(' | ')' | '"' | '«' | '»')
                });
                Token {
                    core,
                    breaks: raw.ends_with([',', ';', '.', ':', ')']),
                    comma: raw.ends_with(','),
                }
            })
            .collect()
    }

    fn is_name_like(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let starts_upper = chars.next().is_some_and(char::is_uppercase);
        starts_upper
            && word.chars().count() >= 2
            && word.chars().all(|c| c.is_alphabetic() || c == '-')
            && !BLACKLIST_TERMS.contains(&word)
            && !self.vocabulary.contains(word.to_lowercase().as_str())
    }

    fn is_particle(word: &str) -> bool {
        VALID_NAME_PARTICLES.contains(&word)
    }

    /// `Last, First` starting at `start`; returns the entity and the next index
    fn comma_pair(&self, tokens: &[Token<'_>], start: usize) -> Option<(String, usize)> {
        let mut last_end = start;
        while last_end < tokens.len() && Self::is_particle(tokens[last_end].core) {
            if tokens[last_end].breaks {
                return None;
            }
            last_end += 1;
        }
        let last = tokens.get(last_end)?;
        if !self.is_name_like(last.core) || !last.comma {
            return None;
        }

        let mut first = Vec::new();
        let mut next = last_end + 1;
        while next < tokens.len() && first.len() < MAX_RUN - 1 {
            let token = &tokens[next];
            if !self.is_name_like(token.core) {
                break;
            }
            first.push(token.core);
            next += 1;
            if token.breaks {
                break;
            }
        }
        if first.is_empty() {
            return None;
        }

        let last_name: Vec<&str> = tokens[start..=last_end].iter().map(|t| t.core).collect();
        Some((format!("{} {}", first.join(" "), last_name.join(" ")), next))
    }

    /// Run of capitalized words (particles allowed inside) starting at `start`
    fn capitalized_run(&self, tokens: &[Token<'_>], start: usize) -> Option<(String, usize)> {
        let mut words: Vec<&str> = Vec::new();
        let mut next = start;
        while next < tokens.len() && words.len() < MAX_RUN {
            let token = &tokens[next];
            let accepted = if words.is_empty() {
                self.is_name_like(token.core)
            } else {
                self.is_name_like(token.core)
                    || (Self::is_particle(token.core)
                        && !token.breaks
                        && tokens
                            .get(next + 1)
                            .is_some_and(|t| self.is_name_like(t.core)))
            };
            if !accepted {
                break;
            }
            words.push(token.core);
            next += 1;
            if token.breaks {
                break;
            }
        }

        if words.len() >= 2 {
            Some((words.join(" "), next))
        } else {
            None
        }
    }
}

impl PersonEntityModel for HeuristicPersonModel {
    fn language(&self) -> Language {
        self.language
    }

    fn person_entities(&self, text: &str) -> Vec<String> {
        let tokens = Self::tokenize(text);
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if let Some((entity, next)) = self
                .comma_pair(&tokens, i)
                .or_else(|| self.capitalized_run(&tokens, i))
            {
                entities.push(entity);
                i = next;
            } else {
                i += 1;
            }
        }

        entities
    }
}

/// Language-keyed set of person-entity models
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<Language, Box<dyn PersonEntityModel>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the heuristic model for every supported language
    pub fn with_default_models() -> Self {
        let mut registry = Self::new();
        for language in Language::ALL {
            registry.register(HeuristicPersonModel::new(language));
        }
        registry
    }

    /// Register a model, replacing any model for the same language
    pub fn register(&mut self, model: impl PersonEntityModel + 'static) {
        self.models.insert(model.language(), Box::new(model));
    }

    pub fn get(&self, language: Language) -> Result<&dyn PersonEntityModel, ModelError> {
        self.models
            .get(&language)
            .map(|model| model.as_ref())
            .ok_or(ModelError::ModelUnavailable(language))
    }

    /// Languages with a registered model, sorted
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.models.keys().copied().collect();
        languages.sort();
        languages
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

// ============================================================================
// Name filtering
// ============================================================================

fn is_valid_word(word: &str) -> bool {
    word.chars().all(char::is_alphabetic)
        || VALID_NAME_PARTICLES.contains(&word)
        || word.contains('-')
}

/// Clean candidate names and keep those that look like person names.
///
/// Blacklisted terms and markup are removed, then every remaining word must
/// be alphabetic, a name particle, or hyphenated.
pub fn filter_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter_map(|original| {
            let mut name = original.clone();
            for &term in BLACKLIST_TERMS {
                if name.contains(term) {
                    tracing::trace!("Removed {:?} from {:?} due to blacklist", term, original);
                    name = name.replace(term, "").trim().to_string();
                }
            }

            let name = strip_markup(&name);
            let name = TRAILING_SEMICOLON.replace(&name, "");
            let name = EDGE_SEPARATORS.replace_all(&name, "");
            let name = collapse_whitespace(&name);

            let words: Vec<&str> = name.split(' ').filter(|w| !w.is_empty()).collect();
            if words.is_empty() || !words.iter().all(|w| is_valid_word(w)) {
                tracing::trace!("Removed {:?} for not meeting name criteria", original);
                return None;
            }
            Some(words.join(" "))
        })
        .collect()
}

// ============================================================================
// Extractor
// ============================================================================

/// Language detection + person-entity model extractor
#[derive(Debug, Clone)]
pub struct ModelBasedExtractor {
    registry: Arc<ModelRegistry>,
    detector: LanguageDetector,
}

impl ModelBasedExtractor {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            detector: LanguageDetector::new(),
        }
    }

    /// Extract names from a single notice
    pub fn extract_message(&self, message: &str) -> Result<Vec<String>, ModelError> {
        let text = normalize(message);
        let language = self.detector.detect(&text)?;
        let model = self.registry.get(language)?;
        Ok(filter_names(model.person_entities(&text)))
    }
}

impl NameExtractor for ModelBasedExtractor {
    fn extract(&self, records: &[PublicationRecord]) -> ExtractionResult {
        let mut names = Vec::new();
        for message in records.iter().filter_map(PublicationRecord::text) {
            match self.extract_message(message) {
                Ok(found) => names.extend(found),
                Err(e) => tracing::warn!("Skipping publication: {}", e),
            }
        }
        ExtractionResult::new(stable_unique(names))
    }

    fn name(&self) -> &str {
        "model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn german() -> HeuristicPersonModel {
        HeuristicPersonModel::new(Language::German)
    }

    #[test]
    fn test_german_enumeration() {
        let text = "Eingetragene Personen neu oder mutierend: Muster, Hans, deutscher \
                    Staatsangehöriger, in Zürich, Mitglied des Verwaltungsrates, mit \
                    Einzelunterschrift.";
        assert_eq!(german().person_entities(text), vec!["Hans Muster"]);
    }

    #[test]
    fn test_leading_particle_kept() {
        let text = "Eingetragene Personen: von Arx, Peter, von Olten, in Bern, Präsident.";
        assert_eq!(german().person_entities(text), vec!["Peter von Arx"]);
    }

    #[test]
    fn test_french_holder_run() {
        let model = HeuristicPersonModel::new(Language::French);
        let text = "Titulaire: Jean Dupont, de Genève, à Lausanne.";
        assert_eq!(model.person_entities(text), vec!["Jean Dupont"]);
    }

    #[test]
    fn test_particle_inside_run() {
        let model = HeuristicPersonModel::new(Language::Italian);
        let text = "Persone iscritte: Maria da Silva, cittadina portoghese, in Lugano.";
        assert_eq!(model.person_entities(text), vec!["Maria da Silva"]);
    }

    #[test]
    fn test_vocabulary_not_recognized() {
        let text = "Zweck: Handel. Aktiengesellschaft Statuten Handelsregister.";
        assert!(german().person_entities(text).is_empty());
    }

    #[test]
    fn test_filter_names() {
        let names = vec![
            "Hans Muster".to_string(),
            "Muster AG".to_string(),
            "CHE-328.335.041 Anna Meier".to_string(),
            "Peter 123".to_string(),
            "  ; ".to_string(),
            "Anne-Marie de Rham ;".to_string(),
        ];
        assert_eq!(
            filter_names(names),
            vec!["Hans Muster", "Muster", "Anna Meier", "Anne-Marie de Rham"]
        );
    }

    #[test]
    fn test_registry() {
        let registry = ModelRegistry::with_default_models();
        assert_eq!(
            registry.languages(),
            vec![Language::German, Language::French, Language::Italian]
        );
        assert!(registry.get(Language::French).is_ok());

        let empty = ModelRegistry::new();
        assert_eq!(
            empty.get(Language::German).err(),
            Some(ModelError::ModelUnavailable(Language::German))
        );
    }

    struct FixedModel;

    impl PersonEntityModel for FixedModel {
        fn language(&self) -> Language {
            Language::German
        }

        fn person_entities(&self, _text: &str) -> Vec<String> {
            vec!["Erika Beispiel".to_string(), "Erika Beispiel".to_string()]
        }
    }

    #[test]
    fn test_extractor_uses_registered_model() {
        let mut registry = ModelRegistry::new();
        registry.register(FixedModel);
        let extractor = ModelBasedExtractor::new(Arc::new(registry));

        let records = vec![PublicationRecord::from_message(
            "Eingetragene Personen: irgendwer, mit Einzelunterschrift.",
        )];
        assert_eq!(extractor.extract(&records).names(), ["Erika Beispiel"]);
    }

    #[test]
    fn test_extractor_degrades_on_failures() {
        let registry = Arc::new(ModelRegistry::new());
        let extractor = ModelBasedExtractor::new(registry);

        assert_eq!(
            extractor.extract_message("Eingetragene Personen: Muster, Hans, mit Unterschrift."),
            Err(ModelError::ModelUnavailable(Language::German))
        );
        assert_eq!(
            extractor.extract_message("The shares of the company were sold."),
            Err(ModelError::UnsupportedLanguage("en".to_string()))
        );
        assert!(matches!(
            extractor.extract_message("12345"),
            Err(ModelError::DetectionFailed(_))
        ));

        let records = vec![PublicationRecord::from_message("The company was sold.")];
        assert!(extractor.extract(&records).is_empty());
    }

    #[test]
    fn test_default_models_end_to_end() {
        let extractor = ModelBasedExtractor::new(Arc::new(ModelRegistry::with_default_models()));
        let records = vec![
            PublicationRecord::from_message(
                "Eingetragene Personen neu oder mutierend: Muster, Hans, deutscher \
                 Staatsangehöriger, in Zürich, Mitglied, mit Einzelunterschrift.",
            ),
            PublicationRecord::from_message(
                "Personnes inscrites: Dupont, Jean, de Genève, à Lausanne, membre, avec \
                 signature individuelle.",
            ),
            PublicationRecord::from_message(
                "Eingetragene Personen: Muster, Hans, in Zürich, mit Einzelunterschrift.",
            ),
        ];
        assert_eq!(
            extractor.extract(&records).names(),
            ["Hans Muster", "Jean Dupont"]
        );
    }
}
