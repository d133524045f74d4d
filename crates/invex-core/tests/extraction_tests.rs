use std::str::FromStr;

use invex_core::invoice::rules::{
    extract_amounts, extract_percentages, AmountCategorizer, AmountExtractor, NumberConvention,
    NumberParser,
};
use invex_core::{AmountOfMoney, ExtractionConfig, InvoiceDataExtractor, InvoiceExtractor};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Extractor independent of the locale of the machine running the tests.
fn extractor() -> InvoiceDataExtractor {
    InvoiceDataExtractor::with_amount_extractor(AmountExtractor::new().with_number_parser(
        NumberParser::with_conventions([NumberConvention::English, NumberConvention::German]),
    ))
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

#[test]
fn amount_in_front_of_and_behind_symbol() {
    let before = extract_amounts("19,99 €");
    let after = extract_amounts("€ 19.99");

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert_eq!(before[0].value, dec("19.99"));
    assert_eq!(after[0].value, dec("19.99"));
    assert_eq!(before[0].text, "19,99 €");
    assert_eq!(after[0].text, "€ 19.99");
}

#[test]
fn overlapping_cues_yield_one_amount() {
    let amounts = extract_amounts("Amount due: 50.00 USD-equivalent €50.00");

    assert_eq!(amounts.len(), 1);
    assert_eq!(amounts[0].value, dec("50.00"));
}

#[test]
fn percentages_are_bounded() {
    assert!(extract_percentages("150%").is_empty());

    let percentages = extract_percentages("19%");
    assert_eq!(
        percentages,
        vec![AmountOfMoney::new(dec("19"), "%", "19%", "19%")]
    );
    assert_eq!(percentages[0].line, "19%");
}

// ---------------------------------------------------------------------------
// Categorization
// ---------------------------------------------------------------------------

#[test]
fn maximal_triple_is_found() {
    let amounts = extract_amounts("10 €\n110 €\n100 €\n5 €\n105 €");
    let result = AmountCategorizer::new()
        .find_total_net_and_vat_amount(&amounts)
        .unwrap();

    assert_eq!(result.total.value, dec("110"));
    assert_eq!(result.net.unwrap().value, dec("105"));
    assert_eq!(result.vat.unwrap().value, dec("5"));
}

#[test]
fn no_triple_uses_maximum() {
    let amounts = extract_amounts("3 €\n9 €\n4 €");
    let result = AmountCategorizer::new()
        .find_total_net_and_vat_amount(&amounts)
        .unwrap();

    assert_eq!(result.total.value, dec("9"));
    assert_eq!(result.net, None);
    assert_eq!(result.vat, None);
}

// ---------------------------------------------------------------------------
// Invoice assembly
// ---------------------------------------------------------------------------

#[test]
fn invoice_from_lines() {
    let lines = ["Total: 119,00 €", "Net: 100,00 €", "VAT 19%: 19,00 €"];
    let invoice = extractor().extract_invoice_data_from_lines(&lines).unwrap();

    assert_eq!(invoice.total_amount.value, dec("119.00"));
    assert_eq!(invoice.net_amount.unwrap().value, dec("100.00"));
    assert_eq!(invoice.vat_amount.unwrap().value, dec("19.00"));
    assert_eq!(invoice.vat_rate.unwrap().value, dec("19"));
}

#[test]
fn no_amounts_no_invoice() {
    assert_eq!(
        extractor().extract_invoice_data_from_lines(&["Random text with no amounts"]),
        None
    );
}

#[test]
fn english_invoice() {
    let text = "\
INVOICE #1042
Date: 03/14/2024
Subtotal         $250.00
Sales tax 8%      $20.00
Total due        $270.00";

    let result = extractor().extract(text);
    let invoice = result.invoice.unwrap();

    assert_eq!(invoice.total_amount.value, dec("270.00"));
    assert_eq!(invoice.total_amount.symbol, "$");
    assert_eq!(invoice.net_amount.unwrap().value, dec("250.00"));
    assert_eq!(invoice.vat_amount.unwrap().value, dec("20.00"));
    assert_eq!(invoice.vat_rate.unwrap().value, dec("8"));
    assert_eq!(result.dates.len(), 1);
    assert_eq!(result.dates[0].month, 3);
    assert!(result.warnings.is_empty());
}

#[test]
fn amounts_near_decimal_limit() {
    let text = "\
Net 5000000000000000000000000000 €
VAT 19%: 1 €
Total 5000000000000000000000000001 €";

    let result = extractor().extract(text);
    let invoice = result.invoice.unwrap();

    assert!(invoice.is_complete());
    assert_eq!(invoice.total_amount.value, dec("5000000000000000000000000001"));
    assert_eq!(invoice.vat_amount.unwrap().value, dec("1"));
    assert_eq!(
        result.warnings,
        vec!["VAT rate 19% of net (5000000000000000000000000000) is out of range".to_string()]
    );
}

#[test]
fn serialized_invoice_omits_missing_fields() {
    let invoice = extractor().extract_invoice_data("Betrag 12,50 €").unwrap();
    let json = serde_json::to_value(&invoice).unwrap();

    assert_eq!(json["total_amount"]["value"], "12.50");
    assert!(json.get("net_amount").is_none());
    assert!(json.get("vat_rate").is_none());
}

#[test]
fn config_round_trip_builds_extractor() {
    let config: ExtractionConfig =
        serde_json::from_str(r#"{"currency_pattern": "CHF|Fr\\.", "max_amounts": 5}"#).unwrap();
    assert_eq!(config.max_amounts, 5);
    assert!(config.extract_dates);

    let extractor = InvoiceDataExtractor::from_config(&config).unwrap();
    let invoice = extractor
        .extract_invoice_data("Total CHF 107.70\nNetto Fr. 100.00\nMWST Fr. 7.70")
        .unwrap();

    assert!(invoice.is_complete());
    assert_eq!(invoice.vat_amount.unwrap().value, dec("7.70"));
}
