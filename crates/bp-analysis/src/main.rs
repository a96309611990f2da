//! CLI entry point for the hemoglobin analysis stage.

use anyhow::Result;
use bp_analysis::{AnalysisConfig, Analyzer, DEFAULT_PLOTS_DIR};
use bp_cleaning::DEFAULT_OUTPUT_FILE;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Hemoglobin outlier analysis of the cleaned dataset",
    long_about = "Counts and previews hemoglobin outliers in the cleaned blood-pressure \
                  dataset, draws a histogram and prints per-Sex descriptive statistics.\n\n\
                  EXAMPLES:\n  \
                  # Analyze the file bp-clean wrote in the working directory\n  \
                  bp-analyze\n\n  \
                  # Explicit input, histogram under out/plots\n  \
                  bp-analyze -i out/cleaned.csv -p out/plots"
)]
struct Args {
    /// Path of the cleaned CSV
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    input: PathBuf,

    /// Directory the histogram is written to
    #[arg(short, long, default_value = DEFAULT_PLOTS_DIR)]
    plots_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of the text rendering
    #[arg(long)]
    json: bool,
}

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
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalysisConfig {
        input: args.input,
        plots_dir: args.plots_dir,
        ..AnalysisConfig::default()
    };

    let report = match Analyzer::new(config).run() {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow::anyhow!("Analysis failed: {}", e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
