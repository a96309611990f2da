//! The cleaning pipeline and its builder.

use crate::config::{CleaningConfig, ConfigValidationError};
use crate::error::Result;
use crate::io::{load_raw_table, write_csv, DataSource};
use crate::pipeline::executor::CleaningExecutor;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::types::CleaningReport;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Result of a full cleaning run.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// The cleaned table as written.
    pub data: DataFrame,
    pub report: CleaningReport,
    pub output_path: PathBuf,
}

/// Load, clean and write the blood-pressure dataset.
///
/// Use [`CleaningPipeline::builder()`] to create a pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use bp_cleaning::{CleaningConfig, CleaningPipeline, DataSource};
///
/// let outcome = CleaningPipeline::builder()
///     .config(CleaningConfig::builder().output_path("clean.csv").build()?)
///     .on_progress(|update| println!("{}", update.message))
///     .build()?
///     .run(&DataSource::parse("raw.csv"))?;
///
/// println!("{} rows written", outcome.report.rows_written);
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run the whole stage: load `source`, clean, write the output CSV.
    ///
    /// Nothing is written unless every step succeeded.
    pub fn run(&self, source: &DataSource) -> Result<CleaningOutcome> {
        match self.run_internal(source) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Cleaning error: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self, source: &DataSource) -> Result<CleaningOutcome> {
        let start_time = Instant::now();

        self.report_progress(ProgressUpdate::new(CleaningStage::Loading, "Loading data..."));
        let raw = load_raw_table(source)?;

        let (mut data, mut report) = self.clean_frame(raw)?;
        report.source = source.to_string();

        self.report_progress(ProgressUpdate::new(CleaningStage::Writing, "Writing cleaned dataset..."));
        write_csv(&mut data, &self.config.output_path)?;
        report.output_file = Some(self.config.output_path.display().to_string());
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning finished in {} ms: {} rows, {} columns",
            report.duration_ms, report.rows_written, report.columns_written
        );

        Ok(CleaningOutcome {
            data,
            report,
            output_path: self.config.output_path.clone(),
        })
    }

    /// Clean an already loaded all-text frame without touching the disk.
    pub fn clean_frame(&self, raw: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let start_time = Instant::now();
        let mut report = CleaningReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        };

        let executor = CleaningExecutor::new(&self.config, self.progress_reporter.as_deref());
        let cleaned = executor.execute(raw, &mut report)?;

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok((cleaned, report))
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
