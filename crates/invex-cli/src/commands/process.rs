//! Process command - extract data from a single invoice text file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use invex_core::invoice::{ExtractionResult, InvoiceDataExtractor};
use invex_core::models::invoice::{AmountOfMoney, Invoice};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for output files in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Processing {} ({} bytes)", args.input.display(), text.len());

    let extractor = InvoiceDataExtractor::from_config(&config.extraction)?;
    let result = extractor.extract(&text);

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    if result.invoice.is_none() {
        eprintln!(
            "{} No invoice data found in {}",
            style("ℹ").blue(),
            args.input.display()
        );
    }

    let output = format_result(&result, args.format, config.output.pretty_json)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read the whole input file, or stdin for "-".
fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        return io::read_to_string(io::stdin()).context("Failed to read stdin");
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

/// Render an extraction result in the requested format.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    pretty_json: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty_json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

/// CSV columns shared by single-file output and the batch summary.
pub const CSV_AMOUNT_HEADER: [&str; 5] =
    ["total_amount", "net_amount", "vat_amount", "vat_rate", "currency"];

/// The amount columns of an invoice, empty where a value is missing.
pub fn csv_amount_fields(invoice: Option<&Invoice>) -> [String; 5] {
    let value = |amount: Option<&AmountOfMoney>| {
        amount.map(|a| a.value.to_string()).unwrap_or_default()
    };

    match invoice {
        Some(invoice) => [
            invoice.total_amount.value.to_string(),
            value(invoice.net_amount.as_ref()),
            value(invoice.vat_amount.as_ref()),
            value(invoice.vat_rate.as_ref()),
            invoice.total_amount.symbol.clone(),
        ],
        None => Default::default(),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = CSV_AMOUNT_HEADER.to_vec();
    header.extend(["date", "iban", "bic"]);
    wtr.write_record(&header)?;

    let mut record = csv_amount_fields(result.invoice.as_ref()).to_vec();
    record.push(
        result
            .dates
            .first()
            .map(|d| d.text.clone())
            .unwrap_or_default(),
    );
    record.push(result.ibans.first().map(|i| i.value.clone()).unwrap_or_default());
    record.push(result.bics.first().map(|b| b.value.clone()).unwrap_or_default());
    wtr.write_record(&record)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    match &result.invoice {
        None => output.push_str("No invoice data found\n"),
        Some(invoice) => {
            output.push_str("Amounts:\n");
            output.push_str(&format!("  Total: {}\n", invoice.total_amount));
            if let Some(net) = &invoice.net_amount {
                output.push_str(&format!("  Net:   {}\n", net));
            }
            if let Some(vat) = &invoice.vat_amount {
                match &invoice.vat_rate {
                    Some(rate) => output.push_str(&format!("  VAT:   {} ({})\n", vat, rate)),
                    None => output.push_str(&format!("  VAT:   {}\n", vat)),
                }
            }
        }
    }

    if !result.dates.is_empty() {
        output.push_str("\nDates:\n");
        for date in &result.dates {
            output.push_str(&format!("  {}\n", date.text));
        }
    }

    if !result.ibans.is_empty() || !result.bics.is_empty() {
        output.push_str("\nBank details:\n");
        for iban in &result.ibans {
            output.push_str(&format!(
                "  IBAN: {}\n",
                invex_core::invoice::rules::format_iban(&iban.value)
            ));
        }
        for bic in &result.bics {
            output.push_str(&format!("  BIC:  {}\n", bic.value));
        }
    }

    output
}
