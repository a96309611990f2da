//! Report output for the cleaning stage.
//!
//! The [`CleaningReport`](crate::types::CleaningReport) can be:
//! - printed as JSON to stdout (`--json` CLI flag)
//! - written next to the cleaned CSV (`--emit-report` CLI flag)
//! - rendered as a human-readable summary (default CLI output)
//!
//! # Example
//!
//! ```rust,ignore
//! use bp_cleaning::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::for_output(&outcome.output_path);
//! generator.write_report_to_file(&outcome.report)?;
//! println!("{}", ReportGenerator::render_summary(&outcome.report));
//! ```

mod generator;

pub use generator::ReportGenerator;
