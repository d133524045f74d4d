//! Invoice field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{ExtractionResult, InvoiceDataExtractor};

use crate::models::invoice::Invoice;

/// Trait for invoice data extractors.
pub trait InvoiceExtractor {
    /// Extract invoice data from the lines of a document.
    ///
    /// Returns `None` when the document contains no amount of money.
    fn extract_invoice_data_from_lines(&self, lines: &[&str]) -> Option<Invoice>;

    /// Extract invoice data from plain text.
    fn extract_invoice_data(&self, text: &str) -> Option<Invoice> {
        self.extract_invoice_data_from_lines(&rules::split_lines(text))
    }
}
