//! Query normalization for the site search box.

/// Case folding applied to queries and to the stored `*_lc` search columns.
/// Both sides must fold identically for substring matches to line up.
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// A search query after trimming, lowercasing and tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Trimmed input, as typed.
    pub original: String,
    /// Lowercased form of `original`; also the cache key component.
    pub lowered: String,
    /// Distinct whitespace-separated terms longer than one character, in input order.
    pub terms: Vec<String>,
}

impl NormalizedQuery {
    /// Normalizes `raw`, keeping at most `max_chars` characters of the trimmed input.
    #[must_use]
    pub fn new(raw: &str, max_chars: usize) -> Self {
        let trimmed = raw.trim();
        let original: String = match trimmed.char_indices().nth(max_chars) {
            Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
            None => trimmed.to_string(),
        };

        let lowered = fold_case(&original);

        let mut terms: Vec<String> = Vec::new();
        for term in lowered.split_whitespace() {
            if term.chars().count() > 1 && !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }

        Self {
            original,
            lowered,
            terms,
        }
    }

    /// Queries shorter than `min_chars` are answered with an empty result.
    #[must_use]
    pub fn is_too_short(&self, min_chars: usize) -> bool {
        self.original.chars().count() < min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        let query = NormalizedQuery::new("  Web   Design ", 200);
        assert_eq!(query.original, "Web   Design");
        assert_eq!(query.lowered, "web   design");
        assert_eq!(query.terms, vec!["web", "design"]);
    }

    #[test]
    fn test_drops_single_character_terms() {
        let query = NormalizedQuery::new("a logo for X company", 200);
        assert_eq!(query.terms, vec!["logo", "for", "company"]);
    }

    #[test]
    fn test_deduplicates_terms() {
        let query = NormalizedQuery::new("SEO seo Seo audit", 200);
        assert_eq!(query.terms, vec!["seo", "audit"]);
    }

    #[test]
    fn test_short_query_detection() {
        assert!(NormalizedQuery::new("", 200).is_too_short(2));
        assert!(NormalizedQuery::new("  x  ", 200).is_too_short(2));
        assert!(!NormalizedQuery::new("ab", 200).is_too_short(2));
    }

    #[test]
    fn test_multibyte_length_counts_characters() {
        // Two characters, four bytes.
        let query = NormalizedQuery::new("éü", 200);
        assert!(!query.is_too_short(2));
        assert_eq!(query.terms, vec!["éü"]);
    }

    #[test]
    fn test_truncates_long_input_on_char_boundary() {
        let query = NormalizedQuery::new("ééééé", 3);
        assert_eq!(query.original, "ééé");
    }

    #[test]
    fn test_only_noise_terms_keeps_phrase() {
        let query = NormalizedQuery::new("a b", 200);
        assert!(query.terms.is_empty());
        assert_eq!(query.lowered, "a b");
        assert!(!query.is_too_short(2));
    }
}
