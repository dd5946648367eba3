//! Noise filter for candidate segments
//!
//! Capital notices interleave person lists with share counts and amounts
//! ("2 parts de CHF 1000 chacune", "1'200.00"). Such segments are dropped
//! before they reach the name composer or the exclusion set.

use once_cell::sync::Lazy;
use regex::Regex;

/// Share or quota phrase followed by a Swiss franc amount
static SHARE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:shares?|parts?|actions?|aktien?|stammanteile?|anteile?|quot[ae]|quote|azion[ei])\s+(?:of|de|du|à|von|zu|di|da)\s+CHF\b",
    )
    .expect("valid share regex")
});

/// Decimal amount with optional thousands groups, not part of a longer number
static DECIMAL_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\d'.])\d+(?:['.]\d{3})*\.\d{2}(?:$|[^\d'.]|\.(?:$|\s))")
        .expect("valid amount regex")
});

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));

/// Why a segment was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noise {
    SharePhrase,
    Amount,
    Numeric,
}

/// A segment that passed the noise filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSegment<'a> {
    /// Trimmed segment as found in the section
    pub raw: &'a str,
    /// Apostrophes removed, trailing sentence period dropped
    pub cleaned: String,
}

/// Remove apostrophes, which the registry uses as thousands separators
pub fn strip_apostrophes(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\'' | '’')).collect()
}

/// Classify a segment, returning the kind of noise if it is one
pub fn classify(text: &str) -> Option<Noise> {
    if SHARE_PHRASE.is_match(text) {
        Some(Noise::SharePhrase)
    } else if DIGITS_ONLY.is_match(text) {
        Some(Noise::Numeric)
    } else if DECIMAL_AMOUNT.is_match(text) {
        Some(Noise::Amount)
    } else {
        None
    }
}

/// Screen a raw segment.
///
/// Returns `None` for noise; otherwise the segment with its cleaned form.
pub fn screen(raw: &str) -> Option<CandidateSegment<'_>> {
    let raw = raw.trim();
    let stripped = strip_apostrophes(raw);
    let cleaned = stripped.trim().trim_end_matches('.').trim_end();

    if let Some(noise) = classify(cleaned) {
        tracing::trace!("Dropping {:?} segment {:?}", noise, raw);
        return None;
    }

    Some(CandidateSegment {
        raw,
        cleaned: cleaned.to_string(),
    })
}
