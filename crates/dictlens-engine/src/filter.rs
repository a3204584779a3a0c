//! Free-text field filtering
//!
//! Patterns are case-insensitive regular expressions matched against a
//! composed text of each field. A pattern that fails to compile never
//! raises: the filter simply matches nothing and reports itself invalid, so
//! callers can show an empty result instead of an error.

use dictlens_core::{Dictionary, Field};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum FilterState {
    /// Empty or absent pattern
    All,

    Pattern(Regex),

    /// Pattern failed to compile
    Invalid(String),
}

/// A compiled field predicate
#[derive(Debug, Clone)]
pub struct TextFilter {
    state: FilterState,
}

impl TextFilter {
    /// Compile a filter from an optional pattern
    pub fn new(pattern: Option<&str>) -> Self {
        let state = match pattern {
            None => FilterState::All,
            Some(p) if p.is_empty() => FilterState::All,
            Some(p) => match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(re) => FilterState::Pattern(re),
                Err(e) => {
                    tracing::debug!(pattern = p, error = %e, "invalid filter pattern");
                    FilterState::Invalid(e.to_string())
                }
            },
        };

        Self { state }
    }

    /// Whether the field matches
    pub fn matches(&self, field: &Field) -> bool {
        match &self.state {
            FilterState::All => true,
            FilterState::Pattern(re) => re.is_match(&search_text(field)),
            FilterState::Invalid(_) => false,
        }
    }

    /// Fields that match, in input order
    pub fn apply<'a>(&self, fields: &'a [Field]) -> Vec<&'a Field> {
        fields.iter().filter(|f| self.matches(f)).collect()
    }

    /// True when a non-empty pattern is in effect
    pub fn is_active(&self) -> bool {
        !matches!(self.state, FilterState::All)
    }

    /// True when the pattern failed to compile
    pub fn is_invalid(&self) -> bool {
        matches!(self.state, FilterState::Invalid(_))
    }

    /// Compilation error of an invalid pattern
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FilterState::Invalid(e) => Some(e.as_str()),
            _ => None,
        }
    }
}

/// Compile a field predicate from a pattern (empty matches everything)
pub fn filter_by_text(pattern: &str) -> TextFilter {
    TextFilter::new(Some(pattern))
}

/// Text a field is searched by: name, label, value type and restriction configs
pub fn search_text(field: &Field) -> String {
    let mut parts = vec![field.name.clone(), field.label.clone(), field.value_type.clone()];
    for restriction in &field.restrictions {
        parts.extend(restriction.search_terms());
    }
    parts.join(" ")
}

/// Number of matching fields per file type, omitting file types with none
pub fn match_counts(dictionary: &Dictionary, filter: &TextFilter) -> BTreeMap<String, usize> {
    dictionary
        .files
        .iter()
        .filter_map(|file_type| {
            let count = file_type.fields.iter().filter(|f| filter.matches(f)).count();
            (count > 0).then(|| (file_type.name.clone(), count))
        })
        .collect()
}
