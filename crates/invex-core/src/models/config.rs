//! Configuration structures for the extraction pipeline.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvexError;

/// Default currency symbol pattern: any Unicode currency sign, or `EUR`.
pub const DEFAULT_CURRENCY_PATTERN: &str = r"\p{Sc}|EUR";

/// Default decimal number pattern: digits with up to two fraction digits.
pub const DEFAULT_DECIMAL_PATTERN: &str = r"\d+([,.]\d{1,2})?";

/// Keys understood by [`InvexConfig::get`] and [`InvexConfig::set`].
pub const CONFIG_KEYS: [&str; 8] = [
    "extraction.currency_pattern",
    "extraction.decimal_pattern",
    "extraction.number_locale",
    "extraction.max_amounts",
    "extraction.extract_dates",
    "extraction.extract_bank_details",
    "extraction.validate_iban",
    "output.pretty_json",
];

/// Main configuration for invex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Regex matching a currency symbol (compiled case-insensitive).
    pub currency_pattern: String,

    /// Regex matching the number next to a currency or percent symbol.
    pub decimal_pattern: String,

    /// Locale used for the first number parsing attempt (e.g. "de_DE").
    /// Taken from the environment when unset.
    pub number_locale: Option<String>,

    /// Maximum number of amounts handed to the categorizer; only the largest
    /// are kept beyond this.
    pub max_amounts: usize,

    /// Extract dates alongside the amounts.
    pub extract_dates: bool,

    /// Extract IBANs and BICs alongside the amounts.
    pub extract_bank_details: bool,

    /// Enable IBAN checksum validation.
    pub validate_iban: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            currency_pattern: DEFAULT_CURRENCY_PATTERN.to_string(),
            decimal_pattern: DEFAULT_DECIMAL_PATTERN.to_string(),
            number_locale: None,
            max_amounts: 50,
            extract_dates: true,
            extract_bank_details: true,
            validate_iban: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Current value of a setting as text. An unset locale is empty.
    pub fn get(&self, key: &str) -> crate::Result<String> {
        let extraction = &self.extraction;

        let value = match key {
            "extraction.currency_pattern" => extraction.currency_pattern.clone(),
            "extraction.decimal_pattern" => extraction.decimal_pattern.clone(),
            "extraction.number_locale" => extraction.number_locale.clone().unwrap_or_default(),
            "extraction.max_amounts" => extraction.max_amounts.to_string(),
            "extraction.extract_dates" => extraction.extract_dates.to_string(),
            "extraction.extract_bank_details" => extraction.extract_bank_details.to_string(),
            "extraction.validate_iban" => extraction.validate_iban.to_string(),
            "output.pretty_json" => self.output.pretty_json.to_string(),
            _ => return Err(unknown_key(key)),
        };

        Ok(value)
    }

    /// Change a setting from its text form. An empty locale unsets it.
    ///
    /// Patterns are stored as given; building an extractor from the
    /// configuration is what compiles them.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let extraction = &mut self.extraction;

        match key {
            "extraction.currency_pattern" => extraction.currency_pattern = value.to_string(),
            "extraction.decimal_pattern" => extraction.decimal_pattern = value.to_string(),
            "extraction.number_locale" => {
                let locale = value.trim();
                extraction.number_locale = (!locale.is_empty()).then(|| locale.to_string());
            }
            "extraction.max_amounts" => extraction.max_amounts = parse_setting(key, value)?,
            "extraction.extract_dates" => extraction.extract_dates = parse_setting(key, value)?,
            "extraction.extract_bank_details" => {
                extraction.extract_bank_details = parse_setting(key, value)?
            }
            "extraction.validate_iban" => extraction.validate_iban = parse_setting(key, value)?,
            "output.pretty_json" => self.output.pretty_json = parse_setting(key, value)?,
            _ => return Err(unknown_key(key)),
        }

        Ok(())
    }
}

fn unknown_key(key: &str) -> InvexError {
    InvexError::Config(format!(
        "unknown key {:?}, expected one of: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_setting<T>(key: &str, value: &str) -> crate::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| InvexError::Config(format!("invalid value {:?} for {}: {}", value, key, e)))
}
