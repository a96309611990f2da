//! The analysis run and its report.

use crate::config::{AnalysisConfig, PREVIEW_COLUMNS};
use crate::error::Result;
use crate::histogram::{histogram_bins, render_histogram};
use crate::summary::{grouped_describe, Describe, DescribeTable, FlaggedPreview};
use crate::target::{load_cleaned, resolve_target, FlagSource};
use bp_cleaning::series_to_strings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Everything the analysis stage derives from the cleaned file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub input: PathBuf,
    pub rows: usize,
    pub target: String,
    pub flag_column: String,
    pub flag_source: FlagSource,
    pub flagged_count: usize,
    pub preview: FlaggedPreview,

    /// `None` when the target had no values to bin.
    pub histogram_path: Option<PathBuf>,

    pub group_column: String,

    /// Empty when the group column is absent; see `group_note`.
    pub group_stats: BTreeMap<String, Describe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_note: Option<String>,

    pub duration_ms: u64,
}

pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the cleaned file, then count, preview, plot and describe the target.
    pub fn run(&self) -> Result<AnalysisReport> {
        let start = Instant::now();
        let cfg = &self.config;

        info!("Loading cleaned dataset from {}", cfg.input.display());
        let df = load_cleaned(&cfg.input)?;
        let target = resolve_target(&df, &cfg.target_column, &cfg.flag_column, cfg.iqr_multiplier)?;

        let flagged_count = target.flagged_count();
        info!(
            "{} rows flagged as '{}' outliers ({:?} flags)",
            flagged_count, cfg.target_column, target.flag_source
        );

        let preview = FlaggedPreview::build(
            &df,
            &target,
            &PREVIEW_COLUMNS,
            &cfg.flag_column,
            cfg.preview_rows,
        )?;

        let bins = histogram_bins(&target.values, cfg.histogram_bins);
        let histogram_path = if bins.is_empty() {
            warn!("'{}' has no numeric values; histogram skipped", cfg.target_column);
            None
        } else {
            let path = cfg.histogram_path();
            render_histogram(&bins, &path)?;
            Some(path)
        };

        let (group_stats, group_note) = match df.column(&cfg.group_column) {
            Ok(column) => {
                let keys = series_to_strings(column.as_materialized_series())?;
                (grouped_describe(&keys, &target.values), None)
            }
            Err(_) => {
                let note = format!(
                    "Column '{}' not found; grouped statistics skipped.",
                    cfg.group_column
                );
                warn!("{}", note);
                (BTreeMap::new(), Some(note))
            }
        };

        Ok(AnalysisReport {
            input: cfg.input.clone(),
            rows: df.height(),
            target: target.name,
            flag_column: cfg.flag_column.clone(),
            flag_source: target.flag_source,
            flagged_count,
            preview,
            histogram_path,
            group_column: cfg.group_column.clone(),
            group_stats,
            group_note,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl AnalysisReport {
    /// Human-readable rendering for the terminal.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);

        writeln!(f, "{}", rule)?;
        writeln!(f, "HEMOGLOBIN ANALYSIS")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Input: {} ({} rows)", self.input.display(), self.rows)?;
        let source = match self.flag_source {
            FlagSource::Stored => "stored",
            FlagSource::Recomputed => "recomputed",
        };
        writeln!(
            f,
            "Flagged rows in '{}': {} ({} flags)",
            self.flag_column, self.flagged_count, source
        )?;

        writeln!(f)?;
        if self.preview.rows.is_empty() {
            writeln!(f, "No flagged rows.")?;
        } else {
            writeln!(f, "First {} flagged rows:", self.preview.rows.len())?;
            write!(f, "{}", self.preview)?;
        }

        writeln!(f)?;
        match &self.histogram_path {
            Some(path) => writeln!(f, "Histogram: {}", path.display())?,
            None => writeln!(f, "Histogram: skipped (no values)")?,
        }

        writeln!(f)?;
        match &self.group_note {
            Some(note) => writeln!(f, "{}", note)?,
            None => {
                writeln!(f, "'{}' by '{}':", self.target, self.group_column)?;
                let table = DescribeTable {
                    group_column: &self.group_column,
                    groups: &self.group_stats,
                };
                write!(f, "{}", table)?;
            }
        }

        writeln!(f, "{}", rule)
    }
}
