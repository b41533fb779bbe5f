//! Free-text search terms

use super::validation::{required, ValidationError};

const MAX_TERM_LEN: usize = 100;

/// Validated search term
///
/// Numeric terms are treated as FSY IDs by the lookups that support it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(value: Option<&str>) -> Result<Self, ValidationError> {
        let term = required("Search term", value)?;
        if term.chars().count() > MAX_TERM_LEN {
            return Err(ValidationError::TooLong {
                field: "Search term",
                max: MAX_TERM_LEN,
            });
        }
        Ok(Self(term.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The term as an FSY ID, when it is entirely digits.
    pub fn as_fsy_id(&self) -> Option<i64> {
        if self.0.bytes().all(|b| b.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    /// `%term%` with LIKE wildcards in the term escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_terms_are_fsy_ids() {
        let term = SearchTerm::new(Some(" 100234 ")).unwrap();
        assert_eq!(term.as_fsy_id(), Some(100234));

        let term = SearchTerm::new(Some("12abc")).unwrap();
        assert_eq!(term.as_fsy_id(), None);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let term = SearchTerm::new(Some("50%_off")).unwrap();
        assert_eq!(term.like_pattern(), r"%50\%\_off%");

        let term = SearchTerm::new(Some("Dela Cruz")).unwrap();
        assert_eq!(term.like_pattern(), "%Dela Cruz%");
    }

    #[test]
    fn missing_term_is_rejected() {
        let err = SearchTerm::new(None).unwrap_err();
        assert_eq!(err.to_string(), "Search term is required");
        assert!(SearchTerm::new(Some("")).is_err());
        assert!(SearchTerm::new(Some(&"x".repeat(101))).is_err());
    }
}
