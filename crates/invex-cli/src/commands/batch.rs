//! Batch processing command for multiple invoice text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use invex_core::invoice::{ExtractionResult, InvoiceDataExtractor};

use super::load_config;
use super::process::{csv_amount_fields, format_result, OutputFormat, CSV_AMOUNT_HEADER};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the input text files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: anyhow::Result<ExtractionResult>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match &self.result {
            Ok(result) if result.invoice.is_some() => "success",
            Ok(_) => "no_data",
            Err(_) => "error",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = Arc::new(InvoiceDataExtractor::from_config(&config.extraction)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    // Extraction is CPU bound, so each file runs on the blocking pool.
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let extractor = Arc::clone(&extractor);

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let result = process_single_file(&path, &extractor);

            ProcessResult {
                path,
                result,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;

        if let Err(e) = &result.result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), e);
            } else {
                error!("Failed to process {}: {}", result.path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), e);
            }
        }

        overall_pb.inc(1);
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(extraction) = &result.result {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                let content = format_result(extraction, args.format, config.output.pretty_json)?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |status: &str| results.iter().filter(|r| r.status() == status).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} without invoice data, {} failed",
        style(count("success")).green(),
        style(count("no_data")).yellow(),
        style(count("error")).red()
    );

    let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in failed {
            if let Err(e) = &result.result {
                println!("  - {}: {}", result.path.display(), e);
            }
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    extractor: &InvoiceDataExtractor,
) -> anyhow::Result<ExtractionResult> {
    let text = fs::read_to_string(path)?;

    if text.trim().is_empty() {
        debug!("{} is empty", path.display());
    }

    Ok(extractor.extract(&text))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_AMOUNT_HEADER);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let invoice = result.result.as_ref().ok().and_then(|r| r.invoice.as_ref());
        let error = result
            .result
            .as_ref()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();

        let mut record = vec![filename.to_string(), result.status().to_string()];
        record.extend(csv_amount_fields(invoice));
        record.push(result.processing_time_ms.to_string());
        record.push(error);
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
