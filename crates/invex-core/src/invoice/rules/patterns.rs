//! Common regex patterns for invoice extraction.
//!
//! All patterns are compiled once on first use and only read afterwards, so
//! they can be shared by extractors running on different threads.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::models::config::{DEFAULT_CURRENCY_PATTERN, DEFAULT_DECIMAL_PATTERN};

// Date building blocks
const DAY: &str = r"([012][0-9]|3[01]|[1-9])";
const MONTH: &str = r"(1[012]|0?[1-9])";
const YEAR: &str = r"(?:19|20)?\d\d";
const DATE_SEPARATOR: &str = r"[./ -]";

/// Build the currency/percent symbol regex (case-insensitive).
pub fn symbol_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Build a regex matching a decimal number at the very end of a text, only
/// whitespace allowed after it. Used on the text in front of a symbol.
pub fn number_before_symbol_regex(decimal_pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?:{decimal_pattern})\s*$"))
}

/// Build a regex matching a decimal number at the very start of a text, only
/// whitespace allowed in front of it. Used on the text after a symbol.
pub fn number_after_symbol_regex(decimal_pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"^\s*(?:{decimal_pattern})"))
}

fn date_regex(first: &str, second: &str, third: &str) -> Regex {
    Regex::new(&format!(
        r"\b{first}{DATE_SEPARATOR}{second}{DATE_SEPARATOR}{third}\b"
    ))
    .unwrap()
}

lazy_static! {
    // Amounts of money
    pub static ref CURRENCY_SYMBOL: Regex = symbol_regex(DEFAULT_CURRENCY_PATTERN).unwrap();

    pub static ref NUMBER_BEFORE_SYMBOL: Regex =
        number_before_symbol_regex(DEFAULT_DECIMAL_PATTERN).unwrap();

    pub static ref NUMBER_AFTER_SYMBOL: Regex =
        number_after_symbol_regex(DEFAULT_DECIMAL_PATTERN).unwrap();

    // Percentages (VAT rates)
    pub static ref PERCENT_SYMBOL: Regex = Regex::new("%").unwrap();

    pub static ref VAT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:VAT|MwSt|USt|Mehrwertsteuer|Umsatzsteuer|tax|TVA|IVA|BTW|moms)\b"
    ).unwrap();

    // Number formats: English 1,234.56 and German 1.234,56 / 1 234,56
    pub static ref ENGLISH_NUMBER: Regex = Regex::new(
        r"^-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$"
    ).unwrap();

    pub static ref GERMAN_NUMBER: Regex = Regex::new(
        r"^-?(?:\d{1,3}(?:[. \u{00a0}]\d{3})+|\d+)(?:,\d+)?$"
    ).unwrap();

    // Dates: DD.MM.YYYY, MM/DD/YYYY, YYYY-MM-DD (any of . / space - as separator)
    pub static ref DATE_DAY_MONTH_YEAR: Regex = date_regex(DAY, MONTH, YEAR);

    pub static ref DATE_MONTH_DAY_YEAR: Regex = date_regex(MONTH, DAY, YEAR);

    pub static ref DATE_YEAR_MONTH_DAY: Regex = date_regex(YEAR, MONTH, DAY);

    pub static ref DATE_PART_SEPARATOR: Regex = Regex::new(DATE_SEPARATOR).unwrap();

    // Bank details
    pub static ref IBAN_PATTERN: Regex = Regex::new(
        r"\b[A-Z]{2}\d{2}(?: ?[A-Z0-9]{4}){2,7}(?: ?[A-Z0-9]{1,3})?\b"
    ).unwrap();

    pub static ref BIC_PATTERN: Regex = Regex::new(
        r"(?i:\b(?:BIC|SWIFT)(?:[- ]?code)?)\s*:?\s*\b([A-Z]{6}[A-Z0-9]{2}(?:[A-Z0-9]{3})?)\b"
    ).unwrap();
}
