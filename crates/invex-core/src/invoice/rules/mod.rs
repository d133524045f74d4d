//! Rule-based extractors for invoice text.

pub mod amounts;
pub mod bank;
pub mod categorizer;
pub mod dates;
pub mod number;
pub mod patterns;

pub use amounts::{extract_amounts, extract_percentages, AmountExtractor};
pub use bank::{extract_bic, extract_iban, format_iban, validate_iban, BicExtractor, IbanExtractor};
pub use categorizer::AmountCategorizer;
pub use dates::{extract_dates, DateExtractor};
pub use number::{parse_number, NumberConvention, NumberParser};

/// Trait for extractors that look at a document line by line.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract all occurrences of the field from the given lines.
    fn extract_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Self::Output>;

    /// Extract all occurrences of the field from text.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.extract_from_lines(&split_lines(text))
    }

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
