//! IBAN and BIC extraction and validation.

use tracing::debug;

use crate::models::invoice::StringSearchResult;

use super::patterns::{BIC_PATTERN, IBAN_PATTERN};
use super::FieldExtractor;

/// IBAN field extractor.
#[derive(Debug, Clone, Copy)]
pub struct IbanExtractor {
    validate: bool,
}

impl IbanExtractor {
    /// Create a new IBAN extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate IBAN checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IbanExtractor {
    type Output = StringSearchResult;

    fn extract_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<StringSearchResult> {
        let mut results: Vec<StringSearchResult> = Vec::new();

        for line in lines {
            let line = line.as_ref();

            for m in IBAN_PATTERN.find_iter(line) {
                let iban: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();

                if self.validate && !validate_iban(&iban) {
                    debug!("Skipping {:?}: invalid IBAN checksum", m.as_str());
                    continue;
                }

                if results.iter().any(|r| r.value == iban) {
                    continue;
                }

                results.push(StringSearchResult {
                    value: iban,
                    text: m.as_str().to_string(),
                    line: line.to_string(),
                });
            }
        }

        results
    }
}

/// BIC (SWIFT code) field extractor.
///
/// Only codes following a `BIC` or `SWIFT` label are reported; a bare
/// eight letter word is indistinguishable from a BIC otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct BicExtractor;

impl BicExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for BicExtractor {
    type Output = StringSearchResult;

    fn extract_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<StringSearchResult> {
        let mut results: Vec<StringSearchResult> = Vec::new();

        for line in lines {
            let line = line.as_ref();

            for caps in BIC_PATTERN.captures_iter(line) {
                let bic = &caps[1];

                if results.iter().any(|r| r.value == bic) {
                    continue;
                }

                results.push(StringSearchResult {
                    value: bic.to_string(),
                    text: bic.to_string(),
                    line: line.to_string(),
                });
            }
        }

        results
    }
}

/// Extract the first IBAN from text.
pub fn extract_iban(text: &str) -> Option<String> {
    IbanExtractor::new().extract(text).map(|m| m.value)
}

/// Extract the first BIC from text.
pub fn extract_bic(text: &str) -> Option<String> {
    BicExtractor::new().extract(text).map(|m| m.value)
}

/// Validate an IBAN using the ISO 13616 checksum.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    // Shortest IBANs (Norway) have 15 characters, longest 34
    if !(15..=34).contains(&iban.len()) || !iban.is_ascii() {
        return false;
    }

    let country_code = &iban[..2];
    let check_digits = &iban[2..4];

    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !check_digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    // Fold digit by digit, the number is too large for u64
    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 10,
            _ => return false,
        };

        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}

/// Format IBAN in groups of 4 characters.
pub fn format_iban(iban: &str) -> String {
    let cleaned: String = iban.chars().filter(|c| !c.is_whitespace()).collect();

    cleaned
        .chars()
        .collect::<Vec<char>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_iban_valid() {
        assert!(validate_iban("DE89370400440532013000"));
        assert!(validate_iban("DE89 3704 0044 0532 0130 00"));
        assert!(validate_iban("PL61109010140000071219812874"));
        assert!(validate_iban("GB82WEST12345698765432"));
        assert!(validate_iban("NO9386011117947"));
    }

    #[test]
    fn test_validate_iban_invalid() {
        assert!(!validate_iban("DE00370400440532013000")); // Invalid checksum
        assert!(!validate_iban("DE89")); // Too short
        assert!(!validate_iban("1289370400440532013000")); // No country code
    }

    #[test]
    fn test_extract_iban() {
        let text = "Bankverbindung\nIBAN: DE89 3704 0044 0532 0130 00\nBIC: COBADEFFXXX";
        let results = IbanExtractor::new().extract_all(text);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, "DE89370400440532013000");
        assert_eq!(results[0].text, "DE89 3704 0044 0532 0130 00");
        assert_eq!(results[0].line, "IBAN: DE89 3704 0044 0532 0130 00");
    }

    #[test]
    fn test_extract_iban_validation() {
        let text = "IBAN DE00 3704 0044 0532 0130 00";

        assert_eq!(extract_iban(text), None);

        let results = IbanExtractor::new().with_validation(false).extract_all(text);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, "DE00370400440532013000");
    }

    #[test]
    fn test_extract_iban_deduplicated() {
        let lines = ["IBAN DE89370400440532013000", "Please pay to DE89 3704 0044 0532 0130 00"];
        let results = IbanExtractor::new().extract_from_lines(&lines);

        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_extract_bic() {
        assert_eq!(
            extract_bic("IBAN DE89 3704 0044 0532 0130 00 BIC COBADEFFXXX"),
            Some("COBADEFFXXX".to_string())
        );
        assert_eq!(extract_bic("SWIFT-Code: DEUTDEFF"), Some("DEUTDEFF".to_string()));
        assert_eq!(extract_bic("RECHNUNG"), None);
    }

    #[test]
    fn test_format_iban() {
        assert_eq!(
            format_iban("DE89370400440532013000"),
            "DE89 3704 0044 0532 0130 00"
        );
    }
}
