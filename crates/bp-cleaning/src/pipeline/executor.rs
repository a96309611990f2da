//! The fixed cleaning sequence.
//!
//! Runs every component in order over one [`Table`] and records what each
//! did in the [`CleaningReport`]. No I/O happens here; loading and writing
//! belong to [`crate::pipeline::CleaningPipeline`].

use crate::cleaner::{DuplicateRemover, IdentifierGuard, NumericCoercer, RangeSanitizer};
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::MedianImputer;
use crate::normalizer::CategoricalNormalizer;
use crate::pipeline::outliers::{FlagPruner, OutlierFlagger, Winsorizer};
use crate::pipeline::progress::{CleaningStage, ProgressReporter, ProgressUpdate};
use crate::table::Table;
use crate::types::{CleaningReport, ColumnKind};
use crate::utils::{column_names, find_column_ci};
use polars::prelude::*;
use tracing::{info, warn};

/// Executes the cleaning components over a raw frame.
pub struct CleaningExecutor<'a> {
    config: &'a CleaningConfig,
    reporter: Option<&'a dyn ProgressReporter>,
}

impl<'a> CleaningExecutor<'a> {
    pub fn new(config: &'a CleaningConfig, reporter: Option<&'a dyn ProgressReporter>) -> Self {
        Self { config, reporter }
    }

    fn stage(&self, stage: CleaningStage, message: &str) {
        info!("{}", message);
        if let Some(reporter) = self.reporter {
            reporter.report(ProgressUpdate::new(stage, message));
        }
    }

    /// Clean an all-text frame.
    ///
    /// Returns the cleaned frame: original columns in input order, then the
    /// retained flag columns.
    pub fn execute(&self, raw: DataFrame, report: &mut CleaningReport) -> Result<DataFrame> {
        let config = self.config;
        config.validate()?;
        report.rows_loaded = raw.height();
        report.columns_loaded = raw.width();

        Self::check_required_columns(&raw, &config.required_columns)?;

        let identifier = find_column_ci(&raw, &config.identifier_column);
        match &identifier {
            Some(id) => info!("Identifier column: '{}'", id),
            None => warn!(
                "Identifier column '{}' not found; every column will be transformed",
                config.identifier_column
            ),
        }
        report.identifier_column = identifier.clone();

        let mut table = Table::new(raw).with_identifier(identifier);
        let mut guard = IdentifierGuard::capture(&table)?;

        self.stage(CleaningStage::Deduplication, "Removing exact duplicates...");
        let (mask, removed) = DuplicateRemover::remove(&mut table)?;
        if let Some(guard) = guard.as_mut() {
            guard.retain(&mask)?;
        }
        report.duplicates_removed = removed;

        self.stage(CleaningStage::RangeSanitization, "Sanitizing physiological ranges...");
        report.out_of_range = RangeSanitizer::sanitize(&mut table, &config.range_bounds)?;

        self.stage(CleaningStage::TypeCoercion, "Coercing numeric columns...");
        report.numeric_columns = NumericCoercer::coerce(&mut table, config.numeric_threshold)?;
        info!("Numeric columns: {:?}", report.numeric_columns);

        self.stage(CleaningStage::Imputation, "Imputing missing numeric values...");
        let imputation = MedianImputer::apply(&mut table)?;
        report.imputation = imputation.imputed;
        report.all_missing_columns = imputation.all_missing;

        self.stage(CleaningStage::OutlierFlagging, "Flagging IQR outliers...");
        report.outliers =
            OutlierFlagger::apply(&mut table, config.iqr_multiplier, &config.flag_prefix)?;

        self.stage(CleaningStage::Winsorization, "Winsorizing numeric columns...");
        report.winsorized = Winsorizer::apply(&mut table, config.winsor_lower, config.winsor_upper)?;

        let normalizer = CategoricalNormalizer::new(&config.rules, &config.categorical_sentinel);
        report.rules_version = config.rules.version;
        self.stage(CleaningStage::Normalization, "Normalizing categorical columns...");
        normalizer.fill_and_normalize_sex(&mut table, &mut report.normalization)?;
        report.categorical_columns = table.columns_of_kind(ColumnKind::Categorical);

        self.stage(CleaningStage::BinaryFlags, "Normalizing binary flags...");
        normalizer.normalize_binary_flags(&mut table, &mut report.normalization)?;

        self.stage(CleaningStage::FlagPruning, "Pruning non-informative flags...");
        let (dropped, retained) =
            FlagPruner::prune(&mut table, &config.flag_prefix, &config.identifier_column)?;
        info!("Dropped flag columns: {:?}", dropped);
        report.dropped_flags = dropped;
        report.retained_flags = retained;

        if let Some(guard) = guard {
            let drifted = guard.restore(&mut table)?;
            if drifted > 0 {
                warn!("{} identifier values drifted during cleaning and were restored", drifted);
            }
        }

        report.rows_written = table.height();
        report.columns_written = table.width();
        info!("Cleaned shape: {:?}", table.frame().shape());
        Ok(table.into_frame())
    }

    fn check_required_columns(df: &DataFrame, required: &[String]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .filter(|name| find_column_ci(df, name).is_none())
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(CleaningError::MissingPrerequisite(format!(
            "required columns absent: {} (found: {})",
            missing.join(", "),
            column_names(df).join(", ")
        )))
    }
}
