use crate::error::{Result, ResultExt};
use crate::types::CleaningReport;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes and renders cleaning reports.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    report_base_name: String,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, report_base_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            report_base_name: report_base_name.into(),
        }
    }

    /// Generator that places `<stem>_report.json` beside the cleaned CSV.
    pub fn for_output(output_path: &Path) -> Self {
        let dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        Self::new(dir, stem)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.json", self.report_base_name))
    }

    /// Serialize `report` as pretty JSON to [`Self::report_path`].
    pub fn write_report_to_file(&self, report: &CleaningReport) -> Result<PathBuf> {
        if !self.output_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.output_dir)
                .context(format!("Failed to create {}", self.output_dir.display()))?;
        }

        let report_path = self.report_path();
        let mut file = File::create(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    /// Human-readable summary of a cleaning run.
    pub fn render_summary(report: &CleaningReport) -> String {
        CleaningSummary(report).to_string()
    }
}

/// Display adapter behind [`ReportGenerator::render_summary`].
struct CleaningSummary<'a>(&'a CleaningReport);

impl fmt::Display for CleaningSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let rule = "=".repeat(80);

        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "CLEANING COMPLETE")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;

        writeln!(
            f,
            "Input:  {} ({} rows x {} columns)",
            report.source, report.rows_loaded, report.columns_loaded
        )?;
        writeln!(
            f,
            "Output: {} ({} rows x {} columns)",
            report.output_file.as_deref().unwrap_or("(not written)"),
            report.rows_written,
            report.columns_written
        )?;
        writeln!(f)?;

        writeln!(f, "Processing Summary:")?;
        writeln!(f, "  Duration: {}ms", report.duration_ms)?;
        writeln!(f, "  Duplicates removed: {}", report.duplicates_removed)?;
        if let Some(ref id) = report.identifier_column {
            writeln!(f, "  Identifier column: {}", id)?;
        }
        writeln!(f, "  Numeric columns: {}", report.numeric_columns.join(", "))?;
        writeln!(
            f,
            "  Categorical columns: {}",
            report.categorical_columns.join(", ")
        )?;
        writeln!(f)?;

        let sanitized: Vec<_> = report.out_of_range.iter().filter(|(_, n)| **n > 0).collect();
        if !sanitized.is_empty() {
            writeln!(f, "Out-of-range values set to missing:")?;
            for (column, count) in sanitized {
                writeln!(f, "  - {}: {}", column, count)?;
            }
            writeln!(f)?;
        }

        let imputed: Vec<_> = report.imputation.iter().filter(|(_, s)| s.filled > 0).collect();
        if !imputed.is_empty() {
            writeln!(f, "Median imputation:")?;
            for (column, stat) in imputed {
                writeln!(f, "  - {}: {} filled with {}", column, stat.filled, stat.median)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Outlier counts (IQR):")?;
        for (column, flagged) in report.outlier_counts() {
            writeln!(f, "  - {}: {}", column, flagged)?;
        }
        writeln!(f)?;

        let norm = &report.normalization;
        writeln!(f, "Normalization (rules v{}):", report.rules_version)?;
        writeln!(f, "  Sex values remapped: {}", norm.sex_remapped)?;
        writeln!(f, "  Pregnancy corrected on male rows: {}", norm.pregnancy_corrected)?;
        for (column, count) in norm.unrecognized_binary.iter().filter(|(_, n)| **n > 0) {
            writeln!(f, "  Unrecognized tokens read as 0 in {}: {}", column, count)?;
        }
        writeln!(f)?;

        if !report.dropped_flags.is_empty() {
            writeln!(f, "Dropped flag columns: {}", report.dropped_flags.join(", "))?;
        }
        if !report.retained_flags.is_empty() {
            writeln!(f, "Retained flag columns: {}", report.retained_flags.join(", "))?;
        }

        if !report.all_missing_columns.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for column in &report.all_missing_columns {
                writeln!(f, "  ! '{}' has no values and was left missing", column)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Use --json for machine-readable output")?;
        writeln!(f, "Use --emit-report to save detailed JSON report")?;
        write!(f, "{}", rule)
    }
}
