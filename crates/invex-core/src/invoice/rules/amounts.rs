//! Extraction of amounts of money and percentages from document lines.
//!
//! A currency symbol only yields an amount when a decimal number sits right
//! next to it, either in front (`19,99 €`) or behind (`€ 19.99`), with nothing
//! but whitespace in between. Percentages work the same way with `%`.

use std::collections::HashSet;

use regex::{Match, Regex};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::invoice::AmountOfMoney;

use super::number::NumberParser;
use super::patterns::{
    number_after_symbol_regex, number_before_symbol_regex, symbol_regex, CURRENCY_SYMBOL,
    NUMBER_AFTER_SYMBOL, NUMBER_BEFORE_SYMBOL, PERCENT_SYMBOL as PERCENT_SYMBOL_PATTERN,
};
use super::split_lines;

/// Finds amounts of money and percentages in text lines.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    currency_symbol: Regex,
    number_before_symbol: Regex,
    number_after_symbol: Regex,
    number_parser: NumberParser,
}

impl AmountExtractor {
    /// Extractor with the default currency and decimal patterns.
    pub fn new() -> Self {
        Self {
            currency_symbol: CURRENCY_SYMBOL.clone(),
            number_before_symbol: NUMBER_BEFORE_SYMBOL.clone(),
            number_after_symbol: NUMBER_AFTER_SYMBOL.clone(),
            number_parser: NumberParser::new(),
        }
    }

    /// Extractor with custom patterns, e.g. for currencies written as codes.
    ///
    /// `currency_pattern` is matched case-insensitive. `decimal_pattern` must
    /// match the number next to the symbol; its groups are ignored.
    pub fn with_patterns(
        currency_pattern: &str,
        decimal_pattern: &str,
    ) -> Result<Self, ExtractionError> {
        let currency_symbol = symbol_regex(currency_pattern)
            .map_err(|e| ExtractionError::invalid_pattern(currency_pattern, e))?;
        let number_before_symbol = number_before_symbol_regex(decimal_pattern)
            .map_err(|e| ExtractionError::invalid_pattern(decimal_pattern, e))?;
        let number_after_symbol = number_after_symbol_regex(decimal_pattern)
            .map_err(|e| ExtractionError::invalid_pattern(decimal_pattern, e))?;

        Ok(Self {
            currency_symbol,
            number_before_symbol,
            number_after_symbol,
            number_parser: NumberParser::new(),
        })
    }

    /// Set the parser used for the matched numbers.
    pub fn with_number_parser(mut self, number_parser: NumberParser) -> Self {
        self.number_parser = number_parser;
        self
    }

    /// All distinct amounts of money in `lines`, in order of first occurrence.
    ///
    /// Amounts are distinct by value, symbol and matched text, so the same
    /// amount repeated on several lines is reported once.
    pub fn extract_amounts_of_money<S: AsRef<str>>(&self, lines: &[S]) -> Vec<AmountOfMoney> {
        let mut seen = HashSet::new();
        let mut amounts = Vec::new();

        for line in lines {
            for amount in self.find_amounts(line.as_ref(), &self.currency_symbol) {
                if seen.insert(amount.clone()) {
                    amounts.push(amount);
                }
            }
        }

        debug!("Found {} distinct amounts of money", amounts.len());
        amounts
    }

    /// Like [`AmountExtractor::extract_amounts_of_money`] on `text` split into lines.
    pub fn extract_amounts_of_money_from_text(&self, text: &str) -> Vec<AmountOfMoney> {
        self.extract_amounts_of_money(&split_lines(text))
    }

    /// All percentages in `lines` between 0 and 100 inclusive, in document order.
    pub fn extract_percentages<S: AsRef<str>>(&self, lines: &[S]) -> Vec<AmountOfMoney> {
        let percentages: Vec<AmountOfMoney> = lines
            .iter()
            .flat_map(|line| self.find_amounts(line.as_ref(), &PERCENT_SYMBOL_PATTERN))
            .filter(|percentage| {
                let plausible = percentage.value >= Decimal::ZERO
                    && percentage.value <= Decimal::ONE_HUNDRED;
                if !plausible {
                    debug!("Discarding implausible percentage {:?}", percentage.text);
                }
                plausible
            })
            .collect();

        debug!("Found {} percentages", percentages.len());
        percentages
    }

    /// Like [`AmountExtractor::extract_percentages`] on `text` split into lines.
    pub fn extract_percentages_from_text(&self, text: &str) -> Vec<AmountOfMoney> {
        self.extract_percentages(&split_lines(text))
    }

    fn find_amounts(&self, line: &str, symbol_pattern: &Regex) -> Vec<AmountOfMoney> {
        let mut amounts = Vec::new();
        let mut scan_start = 0;

        for symbol in symbol_pattern.find_iter(line) {
            if let Some(amount) = self.find_amount_at(line, scan_start, symbol) {
                amounts.push(amount);
            }

            scan_start = symbol.end();
        }

        amounts
    }

    /// Amount for the symbol match, looking in front of the symbol first.
    ///
    /// Only text after `scan_start` is considered in front of the symbol, so a
    /// number already consumed by the previous symbol is not matched again.
    fn find_amount_at(
        &self,
        line: &str,
        scan_start: usize,
        symbol: Match<'_>,
    ) -> Option<AmountOfMoney> {
        let before = &line[scan_start..symbol.start()];
        if let Some(number) = self.number_before_symbol.find(before) {
            let text = &line[scan_start + number.start()..symbol.end()];
            return self.to_amount(number.as_str(), symbol.as_str(), text, line);
        }

        let after = &line[symbol.end()..];
        if let Some(number) = self.number_after_symbol.find(after) {
            let text = &line[symbol.start()..symbol.end() + number.end()];
            return self.to_amount(number.as_str(), symbol.as_str(), text, line);
        }

        trace!("No number next to {:?} in {:?}", symbol.as_str(), line);
        None
    }

    fn to_amount(
        &self,
        number: &str,
        symbol: &str,
        text: &str,
        line: &str,
    ) -> Option<AmountOfMoney> {
        match self.number_parser.parse(number) {
            Ok(value) => Some(AmountOfMoney::new(value, symbol, text, line)),
            Err(e) => {
                debug!("Discarding amount candidate {:?}: {}", text, e);
                None
            }
        }
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract all distinct amounts of money from invoice text.
pub fn extract_amounts(text: &str) -> Vec<AmountOfMoney> {
    AmountExtractor::new().extract_amounts_of_money_from_text(text)
}

/// Extract all plausible percentages from invoice text.
pub fn extract_percentages(text: &str) -> Vec<AmountOfMoney> {
    AmountExtractor::new().extract_percentages_from_text(text)
}
