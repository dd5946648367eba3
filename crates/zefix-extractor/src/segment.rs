//! Segment tokenizer
//!
//! Splits a section span into candidate entries. The iterator keeps a
//! cursor into the text, so it is lazy and cannot be restarted.

/// Lazy iterator over delimiter-separated segments of a section
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    delimiter: char,
    offset: usize,
}

impl<'a> Segments<'a> {
    /// Iterate over `text` from its beginning
    pub fn new(text: &'a str, delimiter: char) -> Self {
        Self::starting_at(text, 0, delimiter)
    }

    /// Iterate over `text` starting at byte `offset`
    ///
    /// An offset past the end or inside a character yields nothing.
    pub fn starting_at(text: &'a str, offset: usize, delimiter: char) -> Self {
        let offset = if text.is_char_boundary(offset) {
            offset
        } else {
            text.len()
        };
        Self {
            text,
            delimiter,
            offset,
        }
    }

    /// Current cursor position
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.text.len() {
            let rest = &self.text[self.offset..];
            let (segment, advance) = match rest.find(self.delimiter) {
                Some(pos) => (&rest[..pos], pos + self.delimiter.len_utf8()),
                None => (rest, rest.len()),
            };
            self.offset += advance;

            let segment = segment.trim();
            if !segment.is_empty() {
                return Some(segment);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_enumeration() {
        let segments: Vec<&str> = Segments::new(" Muster, Hans; Meier, Anna", ';').collect();
        assert_eq!(segments, vec!["Muster, Hans", "Meier, Anna"]);
    }

    #[test]
    fn test_comma_holder_list() {
        let segments: Vec<&str> = Segments::new("Jean Dupont, de Genève", ',').collect();
        assert_eq!(segments, vec!["Jean Dupont", "de Genève"]);
    }

    #[test]
    fn test_empty_pieces_skipped() {
        let segments: Vec<&str> = Segments::new(";; A ;  ; B;", ';').collect();
        assert_eq!(segments, vec!["A", "B"]);
        assert_eq!(Segments::new("", ';').count(), 0);
        assert_eq!(Segments::new("   ", ';').count(), 0);
    }

    #[test]
    fn test_no_delimiter_runs_to_end() {
        let segments: Vec<&str> = Segments::new("Muster, Hans", ';').collect();
        assert_eq!(segments, vec!["Muster, Hans"]);
    }

    #[test]
    fn test_lazy_cursor() {
        let mut segments = Segments::new("a; b; c", ';');
        assert_eq!(segments.next(), Some("a"));
        assert_eq!(segments.offset(), 2);
        assert_eq!(segments.next(), Some("b"));
        assert_eq!(segments.next(), Some("c"));
        assert_eq!(segments.next(), None);
        assert_eq!(segments.next(), None);
    }

    #[test]
    fn test_starting_offset() {
        let text = "Eingetragene Personen: X, Y; Z";
        let offset = text.find(':').unwrap() + 1;
        let segments: Vec<&str> = Segments::starting_at(text, offset, ';').collect();
        assert_eq!(segments, vec!["X, Y", "Z"]);

        assert_eq!(Segments::starting_at("ü", 1, ';').count(), 0);
        assert_eq!(Segments::starting_at("abc", 10, ';').count(), 0);
    }
}
