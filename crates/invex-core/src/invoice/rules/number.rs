//! Locale-aware number parsing.
//!
//! Invoices use either the English (`1,234.56`) or the German (`1.234,56`)
//! number format and the currency says nothing reliable about which one. The
//! parser therefore tries several conventions in a fixed order and takes the
//! first that accepts the text.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ExtractionError;

use super::patterns::{ENGLISH_NUMBER, GERMAN_NUMBER};

/// Languages writing a comma as decimal separator.
const COMMA_DECIMAL_LANGUAGES: &[&str] = &[
    "bg", "cs", "da", "de", "el", "es", "et", "fi", "fr", "hr", "hu", "id", "it", "lt", "lv",
    "nb", "nl", "nn", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk", "vi",
];

/// Environment variables consulted for the ambient locale, in priority order.
const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_NUMERIC", "LANG"];

/// A number format convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberConvention {
    /// Period as decimal separator, comma between thousands.
    English,
    /// Comma as decimal separator, period or space between thousands.
    German,
}

impl NumberConvention {
    /// Map a locale name such as `de_DE.UTF-8` or `en-US` to its convention.
    pub fn from_locale(locale: &str) -> Self {
        let language = locale
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or("")
            .to_lowercase();

        if COMMA_DECIMAL_LANGUAGES.contains(&language.as_str()) {
            NumberConvention::German
        } else {
            NumberConvention::English
        }
    }

    /// Convention of the process locale, if the environment names one.
    pub fn from_env() -> Option<Self> {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|locale| Self::from_locale(&locale))
    }

    /// Parse `text` in this convention. Grouping separators must be followed
    /// by exactly three digits.
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let text = text.trim();

        let normalized = match self {
            NumberConvention::English => {
                if !ENGLISH_NUMBER.is_match(text) {
                    return None;
                }
                text.replace(',', "")
            }
            NumberConvention::German => {
                if !GERMAN_NUMBER.is_match(text) {
                    return None;
                }
                text.replace(['.', ' ', '\u{00a0}'], "").replace(',', ".")
            }
        };

        Decimal::from_str(&normalized).ok()
    }
}

/// Parses numbers by trying a list of conventions in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberParser {
    conventions: Vec<NumberConvention>,
}

impl NumberParser {
    /// Ambient locale first, then English, then German.
    pub fn new() -> Self {
        Self::with_ambient(NumberConvention::from_env())
    }

    /// Like [`NumberParser::new`], with the first attempt taken from `locale`
    /// instead of the environment.
    pub fn for_locale(locale: &str) -> Self {
        Self::with_ambient(Some(NumberConvention::from_locale(locale)))
    }

    fn with_ambient(ambient: Option<NumberConvention>) -> Self {
        Self::with_conventions(
            ambient
                .into_iter()
                .chain([NumberConvention::English, NumberConvention::German]),
        )
    }

    /// Use exactly the given conventions. Repeated entries are tried once.
    pub fn with_conventions(conventions: impl IntoIterator<Item = NumberConvention>) -> Self {
        let mut unique = Vec::new();
        for convention in conventions {
            if !unique.contains(&convention) {
                unique.push(convention);
            }
        }
        Self { conventions: unique }
    }

    /// Conventions in the order they are tried.
    pub fn conventions(&self) -> &[NumberConvention] {
        &self.conventions
    }

    /// Parse `text` with the first convention that accepts it.
    pub fn parse(&self, text: &str) -> Result<Decimal, ExtractionError> {
        for convention in &self.conventions {
            if let Some(value) = convention.parse(text) {
                trace!("Parsed {:?} as {} ({:?})", text, value, convention);
                return Ok(value);
            }
        }

        Err(ExtractionError::parse("number", text))
    }
}

impl Default for NumberParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a number in either the English or the German format.
pub fn parse_number(text: &str) -> Option<Decimal> {
    NumberParser::new().parse(text).ok()
}
