//! Invoice data models: extracted amounts, dates and the final invoice record.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol used for percentages, which reuse [`AmountOfMoney`].
pub const PERCENT_SYMBOL: &str = "%";

/// An amount found in document text, either money or a percentage.
///
/// Two amounts are equal when value, symbol and matched text agree; the
/// source line is kept for diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountOfMoney {
    /// Parsed numeric value.
    pub value: Decimal,

    /// Currency symbol (or `%`) exactly as matched.
    pub symbol: String,

    /// Full matched substring, e.g. `19,99 €`.
    pub text: String,

    /// Line the amount was found in.
    pub line: String,
}

impl AmountOfMoney {
    pub fn new(
        value: Decimal,
        symbol: impl Into<String>,
        text: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            value,
            symbol: symbol.into(),
            text: text.into(),
            line: line.into(),
        }
    }

    /// Whether this amount was matched with the percent symbol.
    pub fn is_percentage(&self) -> bool {
        self.symbol == PERCENT_SYMBOL
    }
}

impl PartialEq for AmountOfMoney {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.symbol == other.symbol && self.text == other.text
    }
}

impl Eq for AmountOfMoney {}

impl Hash for AmountOfMoney {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.symbol.hash(state);
        self.text.hash(state);
    }
}

impl fmt::Display for AmountOfMoney {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_percentage() {
            write!(f, "{}%", self.value)
        } else {
            write!(f, "{} {}", self.value, self.symbol)
        }
    }
}

/// The total amount of a document, split into net and VAT when the amounts
/// on the document allow it.
///
/// Borrows from the extracted amounts. When both `net` and `vat` are set,
/// `total.value == net.value + vat.value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalNetAndVatAmount<'a> {
    pub total: &'a AmountOfMoney,
    pub net: Option<&'a AmountOfMoney>,
    pub vat: Option<&'a AmountOfMoney>,
}

impl<'a> TotalNetAndVatAmount<'a> {
    /// A fully categorized triple.
    pub fn new(total: &'a AmountOfMoney, net: &'a AmountOfMoney, vat: &'a AmountOfMoney) -> Self {
        Self {
            total,
            net: Some(net),
            vat: Some(vat),
        }
    }

    /// Only the total is known; net and VAT could not be told apart.
    pub fn total_only(total: &'a AmountOfMoney) -> Self {
        Self {
            total,
            net: None,
            vat: None,
        }
    }

    /// Whether net and VAT were both identified.
    pub fn is_complete(&self) -> bool {
        self.net.is_some() && self.vat.is_some()
    }
}

/// Which part of a matched date string holds which calendar field.
///
/// Positions are 1-based indices into the date split on its separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePartsPosition {
    pub day_position: usize,
    pub month_position: usize,
    pub year_position: usize,
}

impl DatePartsPosition {
    pub const DAY_MONTH_YEAR: Self = Self::new(1, 2, 3);
    pub const MONTH_DAY_YEAR: Self = Self::new(2, 1, 3);
    pub const YEAR_MONTH_DAY: Self = Self::new(3, 2, 1);

    pub const fn new(day_position: usize, month_position: usize, year_position: usize) -> Self {
        Self {
            day_position,
            month_position,
            year_position,
        }
    }
}

/// A date found in document text.
///
/// Fields are only checked to be integers; `31.02.2024` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateData {
    pub day: u32,
    pub month: u32,
    pub year: i32,

    /// Matched date string.
    pub text: String,

    /// Line the date was found in.
    pub line: String,
}

impl DateData {
    /// Convert to a calendar date, expanding two-digit years.
    ///
    /// Returns `None` for dates that do not exist.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let year = if self.year < 100 {
            // Two-digit year: 00-50 -> 2000s, 51-99 -> 1900s
            if self.year <= 50 {
                2000 + self.year
            } else {
                1900 + self.year
            }
        } else {
            self.year
        };

        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// A string value found in document text, e.g. an IBAN or a BIC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSearchResult {
    /// Normalized value (whitespace removed, upper case).
    pub value: String,

    /// Matched text as it appears in the line.
    pub text: String,

    /// Line the value was found in.
    pub line: String,
}

/// Financial data extracted from an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Total amount (net + VAT).
    pub total_amount: AmountOfMoney,

    /// Net amount, before tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<AmountOfMoney>,

    /// VAT amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<AmountOfMoney>,

    /// VAT rate as a percentage amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<AmountOfMoney>,
}

impl Invoice {
    pub fn new(
        total_amount: AmountOfMoney,
        net_amount: Option<AmountOfMoney>,
        vat_amount: Option<AmountOfMoney>,
        vat_rate: Option<AmountOfMoney>,
    ) -> Self {
        Self {
            total_amount,
            net_amount,
            vat_amount,
            vat_rate,
        }
    }

    /// Build an invoice from a categorized triple, cloning the amounts out of
    /// the extracted set.
    pub fn from_categorized(
        amounts: &TotalNetAndVatAmount<'_>,
        vat_rate: Option<&AmountOfMoney>,
    ) -> Self {
        Self::new(
            amounts.total.clone(),
            amounts.net.cloned(),
            amounts.vat.cloned(),
            vat_rate.cloned(),
        )
    }

    /// Whether net and VAT amounts were identified. An incomplete invoice
    /// carries only the largest amount on the document as its total.
    pub fn is_complete(&self) -> bool {
        self.net_amount.is_some() && self.vat_amount.is_some()
    }

    /// Check the invoice for inconsistencies.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.is_complete() {
            issues.push("Net and VAT amounts could not be identified".to_string());
        }

        if self.total_amount.value.is_zero() {
            issues.push("Total amount is zero".to_string());
        }

        if let (Some(net), Some(vat)) = (&self.net_amount, &self.vat_amount) {
            if net.value.checked_add(vat.value) != Some(self.total_amount.value) {
                issues.push(format!(
                    "Net ({}) + VAT ({}) differs from total ({})",
                    net.value, vat.value, self.total_amount.value
                ));
            }

            if let Some(rate) = &self.vat_rate {
                match vat_for_rate(net.value, rate.value) {
                    Some(expected) if expected == vat.value.round_dp(2) => {}
                    Some(expected) => issues.push(format!(
                        "VAT rate {}% of net ({}) is {}, not {}",
                        rate.value, net.value, expected, vat.value
                    )),
                    None => issues.push(format!(
                        "VAT rate {}% of net ({}) is out of range",
                        rate.value, net.value
                    )),
                }
            }
        }

        issues
    }
}

/// VAT amount for `net` at `rate` percent, rounded to cents. `None` when
/// the product overflows `Decimal`.
pub fn vat_for_rate(net: Decimal, rate: Decimal) -> Option<Decimal> {
    net.checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .map(|vat| vat.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_amount_equality_ignores_line() {
        let a = AmountOfMoney::new(dec("19.99"), "€", "19,99 €", "Total: 19,99 €");
        let b = AmountOfMoney::new(dec("19.99"), "€", "19,99 €", "Summe 19,99 €");
        let c = AmountOfMoney::new(dec("19.99"), "€", "€ 19.99", "Summe € 19.99");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_amount_display() {
        let amount = AmountOfMoney::new(dec("19.99"), "€", "19,99 €", "");
        assert_eq!(amount.to_string(), "19.99 €");

        let rate = AmountOfMoney::new(dec("19"), PERCENT_SYMBOL, "19%", "");
        assert!(rate.is_percentage());
        assert_eq!(rate.to_string(), "19%");
    }

    #[test]
    fn test_date_data_to_naive_date() {
        let date = DateData {
            day: 15,
            month: 1,
            year: 24,
            text: "15.01.24".to_string(),
            line: String::new(),
        };
        assert_eq!(date.to_naive_date(), NaiveDate::from_ymd_opt(2024, 1, 15));

        let invalid = DateData {
            day: 31,
            month: 2,
            year: 2024,
            text: "31.02.2024".to_string(),
            line: String::new(),
        };
        assert_eq!(invalid.to_naive_date(), None);
    }

    #[test]
    fn test_invoice_validate() {
        let invoice = Invoice::new(
            AmountOfMoney::new(dec("119.00"), "€", "119,00 €", ""),
            Some(AmountOfMoney::new(dec("100.00"), "€", "100,00 €", "")),
            Some(AmountOfMoney::new(dec("19.00"), "€", "19,00 €", "")),
            Some(AmountOfMoney::new(dec("19"), "%", "19%", "")),
        );
        assert!(invoice.is_complete());
        assert!(invoice.validate().is_empty());

        let wrong_rate = Invoice {
            vat_rate: Some(AmountOfMoney::new(dec("7"), "%", "7%", "")),
            ..invoice.clone()
        };
        assert_eq!(wrong_rate.validate().len(), 1);

        let partial = Invoice::new(invoice.total_amount.clone(), None, None, None);
        assert!(!partial.is_complete());
        assert_eq!(
            partial.validate(),
            vec!["Net and VAT amounts could not be identified".to_string()]
        );
    }

    #[test]
    fn test_validate_huge_amounts() {
        let invoice = Invoice::new(
            AmountOfMoney::new(dec("5000000000000000000000000001"), "€", "", ""),
            Some(AmountOfMoney::new(dec("5000000000000000000000000000"), "€", "", "")),
            Some(AmountOfMoney::new(dec("1"), "€", "1 €", "")),
            Some(AmountOfMoney::new(dec("19"), "%", "19%", "")),
        );

        assert_eq!(
            invoice.validate(),
            vec!["VAT rate 19% of net (5000000000000000000000000000) is out of range".to_string()]
        );

        let overflowing_sum = Invoice {
            total_amount: AmountOfMoney::new(Decimal::MAX, "€", "", ""),
            net_amount: Some(AmountOfMoney::new(Decimal::MAX, "€", "", "")),
            vat_amount: Some(AmountOfMoney::new(Decimal::MAX, "€", "", "")),
            vat_rate: None,
        };
        assert_eq!(overflowing_sum.validate().len(), 1);
    }

    #[test]
    fn test_vat_for_rate() {
        assert_eq!(vat_for_rate(dec("100.00"), dec("19")), Some(dec("19.00")));
        assert_eq!(vat_for_rate(dec("19.99"), dec("7")), Some(dec("1.40")));
        assert_eq!(vat_for_rate(Decimal::MAX, dec("19")), None);
    }
}
