//! Text normalization for registry notices
//!
//! Notices arrive HTML-escaped (sometimes twice) and with arbitrary line
//! breaks. Everything downstream works on the output of [`normalize`].

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid entity regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static UID_WITH_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CHE-\d+\.\d+\.\d+<.*?>").expect("valid uid regex"));
static UID: Lazy<Regex> = Lazy::new(|| Regex::new(r"CHE-\d+\.\d+\.\d+").expect("valid uid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static ATTRIBUTE_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=[^>]*>").expect("valid attribute regex"));

/// Decode HTML entities and collapse whitespace.
///
/// Decoding repeats until no known entity is left, so `&amp;amp;` ends up as
/// `&` and the function is idempotent. Unknown entities are kept verbatim.
pub fn normalize(raw: &str) -> String {
    let decoded = decode_entities(raw);
    collapse_whitespace(&decoded)
}

/// Decode HTML entities until a fixed point is reached
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let decoded = ENTITY.replace_all(&current, |caps: &Captures| {
            let whole = &caps[0];
            match decode_entity(&caps[1]) {
                Some(decoded) => decoded.into_owned(),
                None => whole.to_string(),
            }
        });
        if decoded == current.as_str() {
            return current;
        }
        // Every decoded entity is shorter than its escape, so this terminates.
        current = decoded.into_owned();
    }
}

/// Collapse whitespace runs into one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Remove markup remnants and registry UIDs from a fragment of notice text
pub fn strip_markup(text: &str) -> String {
    let text = UID_WITH_TAG.replace_all(text, "");
    let text = UID.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    ATTRIBUTE_TAIL.replace_all(&text, "").into_owned()
}

fn decode_entity(body: &str) -> Option<Cow<'static, str>> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        if code == 0 {
            return None;
        }
        return char::from_u32(code).map(|c| Cow::Owned(c.to_string()));
    }
    named_entity(body).map(Cow::Borrowed)
}

fn named_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "shy" => "\u{ad}",
        "laquo" => "«",
        "raquo" => "»",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "bdquo" => "„",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        "middot" => "·",
        "deg" => "°",
        "euro" => "€",
        "szlig" => "ß",
        "auml" => "ä",
        "ouml" => "ö",
        "uuml" => "ü",
        "Auml" => "Ä",
        "Ouml" => "Ö",
        "Uuml" => "Ü",
        "agrave" => "à",
        "aacute" => "á",
        "acirc" => "â",
        "Agrave" => "À",
        "Acirc" => "Â",
        "ccedil" => "ç",
        "Ccedil" => "Ç",
        "egrave" => "è",
        "eacute" => "é",
        "ecirc" => "ê",
        "euml" => "ë",
        "Egrave" => "È",
        "Eacute" => "É",
        "Ecirc" => "Ê",
        "igrave" => "ì",
        "iacute" => "í",
        "icirc" => "î",
        "iuml" => "ï",
        "ograve" => "ò",
        "oacute" => "ó",
        "ocirc" => "ô",
        "ugrave" => "ù",
        "uacute" => "ú",
        "ucirc" => "û",
        "Ugrave" => "Ù",
        "ntilde" => "ñ",
        "oelig" => "œ",
        "OElig" => "Œ",
        _ => return None,
    };
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_common_entities() {
        assert_eq!(normalize("M&uuml;ller &amp; Co"), "Müller & Co");
        assert_eq!(normalize("D&apos;Amico"), "D'Amico");
        assert_eq!(normalize("Soci&#233;t&#xE9;"), "Société");
    }

    #[test]
    fn test_double_escaped_entities() {
        assert_eq!(normalize("Gr&amp;uuml;nig"), "Grünig");
        assert_eq!(normalize("&amp;amp;"), "&");
    }

    #[test]
    fn test_unknown_entity_kept() {
        assert_eq!(normalize("a &bogus; b"), "a &bogus; b");
        assert_eq!(normalize("&#0;"), "&#0;");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            normalize("  Eingetragene\n\tPersonen:&nbsp; Muster,\r\n Hans  "),
            "Eingetragene Personen: Muster, Hans"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_strip_markup() {
        let text = r#"<FT TYPE="F">Muster AG</FT>, CHE-328.335.041</SEAT>, in Bern"#;
        assert_eq!(strip_markup(text), "Muster AG, , in Bern");
        assert_eq!(strip_markup(r#"Hans" TYPE="P">"#), "Hans\" TYPE");
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in "[ a-zA-Z&;#0-9\\n\\t]{0,64}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_idempotent_on_entities(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("&amp;".to_string()),
                    Just("&nbsp;".to_string()),
                    Just("&uuml;".to_string()),
                    Just("amp;".to_string()),
                    Just("#39;".to_string()),
                    Just(" ".to_string()),
                    "[a-z]{1,4}",
                ],
                0..16,
            )
        ) {
            let s = parts.concat();
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
