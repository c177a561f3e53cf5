//! Run filter configuration and the two content predicates shared by the
//! classifier and the copy analyzer.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Vocabulary that marks creative text as selling an infoproduct.
pub const INFOPRODUCT_KEYWORDS: &[&str] = &[
    "curso",
    "aprende",
    "guía",
    "masterclass",
    "ebook",
    "taller",
    "webinar",
    "entrenamiento",
    "programa",
];

/// Lower-bound impressions at or above which an ad counts as a winner.
pub const WINNER_THRESHOLD: u64 = 100_000;

/// Country restriction for an archive search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    /// Every country the archive covers (sent upstream as `ALL`).
    All,
    /// A single ISO 3166-1 alpha-2 code, upper-cased.
    Code(String),
}

impl Country {
    /// Parses `ALL` (any case) or a two-letter country code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCountry`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Ok(Self::Code(trimmed.to_ascii_uppercase()));
        }
        Err(ConfigError::InvalidCountry(raw.to_string()))
    }

    /// Value sent in the `ad_reached_countries` parameter.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            Self::All => "ALL",
            Self::Code(code) => code,
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Filters applied to every archive item during one fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Items active for fewer whole days are rejected.
    pub min_days: i64,
    /// When set, body text must contain at least one of `keywords`.
    pub filter_infoproducts: bool,
    pub keywords: Vec<String>,
    /// Case-insensitive substring the body text must contain; empty disables it.
    pub cta_filter: String,
    pub winner_threshold: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_days: 10,
            filter_infoproducts: true,
            keywords: INFOPRODUCT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            cta_filter: String::new(),
            winner_threshold: WINNER_THRESHOLD,
        }
    }
}

/// Returns the keywords from `keywords` that occur in `text`, ignoring case,
/// in vocabulary order.
#[must_use]
pub fn infoproduct_keywords_in<'k, S: AsRef<str>>(text: &str, keywords: &'k [S]) -> Vec<&'k str> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|kw| !kw.is_empty() && haystack.contains(&kw.to_lowercase()))
        .collect()
}

/// Infoproduct predicate: always true when filtering is disabled.
#[must_use]
pub fn matches_infoproduct(text: &str, config: &FilterConfig) -> bool {
    !config.filter_infoproducts || !infoproduct_keywords_in(text, &config.keywords).is_empty()
}

/// Call-to-action predicate: an empty filter always matches.
#[must_use]
pub fn matches_cta(text: &str, cta_filter: &str) -> bool {
    cta_filter.is_empty() || text.to_lowercase().contains(&cta_filter.to_lowercase())
}
