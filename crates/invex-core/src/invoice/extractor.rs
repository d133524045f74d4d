//! Invoice data extraction: amounts, categorization and supplementary fields.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::{AmountOfMoney, DateData, Invoice, StringSearchResult};

use super::rules::{
    split_lines, AmountCategorizer, AmountExtractor, BicExtractor, DateExtractor,
    FieldExtractor, IbanExtractor, NumberParser,
};
use super::InvoiceExtractor;

/// Result of a full extraction run over one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted financial data, `None` when the document has no amounts.
    pub invoice: Option<Invoice>,
    /// Dates found in the document.
    pub dates: Vec<DateData>,
    /// IBANs found in the document.
    pub ibans: Vec<StringSearchResult>,
    /// BICs found in the document.
    pub bics: Vec<StringSearchResult>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extracts total, net and VAT amount and VAT rate from document text.
#[derive(Debug, Clone)]
pub struct InvoiceDataExtractor {
    amount_extractor: AmountExtractor,
    categorizer: AmountCategorizer,
    date_extractor: DateExtractor,
    iban_extractor: IbanExtractor,
    bic_extractor: BicExtractor,
    /// Maximum number of amounts handed to the categorizer (0 = unlimited).
    max_amounts: usize,
    extract_dates: bool,
    extract_bank_details: bool,
}

impl InvoiceDataExtractor {
    /// Create a new extractor with default settings.
    pub fn new() -> Self {
        Self::with_amount_extractor(AmountExtractor::new())
    }

    /// Create an extractor using a custom amount extractor.
    pub fn with_amount_extractor(amount_extractor: AmountExtractor) -> Self {
        let defaults = ExtractionConfig::default();

        Self {
            amount_extractor,
            categorizer: AmountCategorizer::new(),
            date_extractor: DateExtractor::new(),
            iban_extractor: IbanExtractor::new().with_validation(defaults.validate_iban),
            bic_extractor: BicExtractor::new(),
            max_amounts: defaults.max_amounts,
            extract_dates: defaults.extract_dates,
            extract_bank_details: defaults.extract_bank_details,
        }
    }

    /// Create an extractor from configuration.
    ///
    /// Fails only when a configured pattern does not compile.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let number_parser = match &config.number_locale {
            Some(locale) => NumberParser::for_locale(locale),
            None => NumberParser::new(),
        };

        let amount_extractor =
            AmountExtractor::with_patterns(&config.currency_pattern, &config.decimal_pattern)?
                .with_number_parser(number_parser);

        Ok(Self::with_amount_extractor(amount_extractor)
            .with_max_amounts(config.max_amounts)
            .with_date_extraction(config.extract_dates)
            .with_bank_details(config.extract_bank_details)
            .with_iban_validation(config.validate_iban))
    }

    /// Set the maximum number of amounts handed to the categorizer.
    pub fn with_max_amounts(mut self, max_amounts: usize) -> Self {
        self.max_amounts = max_amounts;
        self
    }

    /// Set date extraction.
    pub fn with_date_extraction(mut self, extract_dates: bool) -> Self {
        self.extract_dates = extract_dates;
        self
    }

    /// Set IBAN and BIC extraction.
    pub fn with_bank_details(mut self, extract_bank_details: bool) -> Self {
        self.extract_bank_details = extract_bank_details;
        self
    }

    /// Set IBAN validation.
    pub fn with_iban_validation(mut self, validate: bool) -> Self {
        self.iban_extractor = self.iban_extractor.with_validation(validate);
        self
    }

    /// Run the full extraction over a document.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.extract_from_lines(&split_lines(text))
    }

    /// Run the full extraction over the lines of a document.
    pub fn extract_from_lines(&self, lines: &[&str]) -> ExtractionResult {
        let start = start_timer();
        let mut warnings = Vec::new();

        info!("Extracting invoice data from {} lines", lines.len());

        let invoice = self.extract_invoice(lines, &mut warnings);

        match &invoice {
            Some(invoice) => warnings.extend(invoice.validate()),
            None => warnings.push("No amounts of money found".to_string()),
        }

        let dates = if self.extract_dates {
            self.date_extractor.extract_from_lines(lines)
        } else {
            Vec::new()
        };

        let (ibans, bics) = if self.extract_bank_details {
            (
                self.iban_extractor.extract_from_lines(lines),
                self.bic_extractor.extract_from_lines(lines),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        debug!(
            "Extraction finished with {} dates, {} IBANs, {} BICs and {} warnings",
            dates.len(),
            ibans.len(),
            bics.len(),
            warnings.len()
        );

        ExtractionResult {
            invoice,
            dates,
            ibans,
            bics,
            warnings,
            processing_time_ms: start.map_or(0, |start| start.elapsed().as_millis() as u64),
        }
    }

    fn extract_invoice(&self, lines: &[&str], warnings: &mut Vec<String>) -> Option<Invoice> {
        let amounts = self.amount_extractor.extract_amounts_of_money(lines);
        if amounts.is_empty() {
            debug!("No amounts of money found");
            return None;
        }

        let amounts = self.cap_amounts(amounts, warnings);
        let percentages = self.amount_extractor.extract_percentages(lines);

        let categorized = self.categorizer.find_total_net_and_vat_amount(&amounts)?;
        let vat_rate = self
            .categorizer
            .find_value_added_tax_rate_for(&percentages, &categorized);

        Some(Invoice::from_categorized(&categorized, vat_rate))
    }

    /// Keep only the largest amounts when there are too many to categorize.
    fn cap_amounts(
        &self,
        mut amounts: Vec<AmountOfMoney>,
        warnings: &mut Vec<String>,
    ) -> Vec<AmountOfMoney> {
        if self.max_amounts > 0 && amounts.len() > self.max_amounts {
            let message = format!(
                "Found {} amounts, categorizing only the {} largest",
                amounts.len(),
                self.max_amounts
            );
            warn!("{}", message);
            warnings.push(message);

            amounts.sort_by(|a, b| b.value.cmp(&a.value));
            amounts.truncate(self.max_amounts);
        }

        amounts
    }
}

// std has no clock on wasm32-unknown-unknown.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

impl Default for InvoiceDataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceExtractor for InvoiceDataExtractor {
    fn extract_invoice_data_from_lines(&self, lines: &[&str]) -> Option<Invoice> {
        self.extract_invoice(lines, &mut Vec::new())
    }
}
