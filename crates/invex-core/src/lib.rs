//! Core library for invoice amount extraction.
//!
//! This crate provides:
//! - Currency amount and percentage extraction from invoice text
//! - Locale-aware number parsing (English and German conventions)
//! - Categorization of amounts into total, net and VAT amount
//! - Date, IBAN and BIC extraction

pub mod error;
pub mod invoice;
pub mod models;

pub use error::{ExtractionError, InvexError, Result};
pub use invoice::rules::{AmountCategorizer, AmountExtractor, NumberParser};
pub use invoice::{ExtractionResult, InvoiceDataExtractor, InvoiceExtractor};
pub use models::config::{ExtractionConfig, InvexConfig};
pub use models::invoice::{AmountOfMoney, DateData, Invoice, StringSearchResult, TotalNetAndVatAmount};
