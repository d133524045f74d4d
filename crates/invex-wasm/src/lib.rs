//! WASM bindings for invoice amount extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

use invex_core::invoice::{InvoiceDataExtractor, InvoiceExtractor as _};
use invex_core::models::config::ExtractionConfig;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

/// Extract invoice data from text.
///
/// Takes invoice text (from OCR or PDF extraction) and returns the total, net
/// and VAT amount and VAT rate, or `null` if the text contains no amounts.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    match InvoiceDataExtractor::new().extract_invoice_data(text) {
        Some(invoice) => to_js(&invoice),
        None => Ok(JsValue::NULL),
    }
}

/// All distinct amounts of money in the text.
#[wasm_bindgen]
pub fn extract_amounts(text: &str) -> Result<JsValue, JsValue> {
    to_js(&invex_core::invoice::rules::extract_amounts(text))
}

/// All percentages between 0 and 100 in the text.
#[wasm_bindgen]
pub fn extract_percentages(text: &str) -> Result<JsValue, JsValue> {
    to_js(&invex_core::invoice::rules::extract_percentages(text))
}

/// Validate an IBAN (international bank account number).
#[wasm_bindgen]
pub fn validate_iban(iban: &str) -> bool {
    invex_core::invoice::rules::validate_iban(iban)
}

/// Format IBAN in groups of 4.
#[wasm_bindgen]
pub fn format_iban(iban: &str) -> String {
    invex_core::invoice::rules::format_iban(iban)
}

/// Parse a number in English ("1,234.56") or German ("1.234,56") notation.
#[wasm_bindgen]
pub fn parse_number(text: &str) -> Option<f64> {
    invex_core::invoice::rules::parse_number(text).and_then(|d| d.to_f64())
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    extractor: InvoiceDataExtractor,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: InvoiceDataExtractor::new(),
        }
    }

    /// Create an extractor from an extraction config in JSON, e.g.
    /// `{"currency_pattern": "CHF|EUR", "number_locale": "de_CH"}`.
    /// Missing fields take their defaults.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config_json: &str) -> Result<InvoiceExtractor, JsValue> {
        let config: ExtractionConfig = serde_json::from_str(config_json).map_err(to_js_error)?;
        let extractor = InvoiceDataExtractor::from_config(&config).map_err(to_js_error)?;

        Ok(Self { extractor })
    }

    /// Limit the number of amounts considered for categorization.
    #[wasm_bindgen]
    pub fn set_max_amounts(&mut self, max_amounts: usize) {
        self.extractor = self.extractor.clone().with_max_amounts(max_amounts);
    }

    /// Extract invoice from text, `null` if the text contains no amounts.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        match self.extractor.extract_invoice_data(text) {
            Some(invoice) => to_js(&invoice),
            None => Ok(JsValue::NULL),
        }
    }

    /// Get extraction result with dates, bank details, warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text))
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}
