//! CLI entry point for the blood-pressure cleaning stage.

use anyhow::{Context, Result};
use bp_cleaning::{
    CleaningConfig, CleaningPipeline, DataSource, ReportGenerator, DEFAULT_OUTPUT_FILE,
    DEFAULT_SOURCE_URL,
};
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Blood-pressure dataset cleaning",
    long_about = "Cleans the blood-pressure patient dataset: range sanitization, numeric \
                  coercion, median imputation, IQR outlier flags, winsorization and \
                  categorical normalization.\n\n\
                  EXAMPLES:\n  \
                  # Clean the published dataset into the working directory\n  \
                  bp-clean\n\n  \
                  # Clean a local copy and keep a JSON report beside the output\n  \
                  bp-clean -i data/raw.csv -o out/cleaned.csv --emit-report"
)]
struct Args {
    /// Path or http(s) URL of the raw CSV
    #[arg(short, long, default_value = DEFAULT_SOURCE_URL)]
    input: String,

    /// Path of the cleaned CSV
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of the human-readable summary
    ///
    /// Disables all logs so stdout holds only the report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report beside the output as <output_stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it reaches the filter
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = CleaningConfig::builder()
        .output_path(&args.output)
        .build()
        .context("Invalid cleaning configuration")?;

    let pipeline = CleaningPipeline::builder().config(config).build()?;
    let source = DataSource::parse(&args.input);

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let outcome = match pipeline.run(&source) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow::anyhow!("Cleaning failed: {}", e));
        }
    };

    if args.emit_report {
        let generator = ReportGenerator::for_output(&outcome.output_path);
        let report_path = generator.write_report_to_file(&outcome.report)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    if !args.quiet {
        println!("{}", ReportGenerator::render_summary(&outcome.report));
    }

    Ok(())
}
