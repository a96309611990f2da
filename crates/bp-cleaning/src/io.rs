//! Reading the raw dataset and writing the cleaned one.
//!
//! Every column is loaded as text: type decisions belong to the numeric
//! coercer, not to the CSV reader.

use crate::error::{CleaningError, Result, ResultExt};
use polars::prelude::*;
use std::fmt;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the raw CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    /// `http://` and `https://` locations are remote, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(location.to_string())
        } else {
            Self::Local(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

fn string_read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
}

/// Load a CSV with every column typed as String. Empty fields are null.
pub fn load_raw_table(source: &DataSource) -> Result<DataFrame> {
    info!("Loading data from: {}", source);
    let df = match source {
        DataSource::Local(path) => read_local(path)?,
        DataSource::Remote(url) => {
            let bytes = fetch_remote(url)?;
            read_bytes(bytes).context(format!("Failed to parse CSV from {}", url))?
        }
    };

    if df.width() == 0 {
        return Err(CleaningError::MissingPrerequisite(format!(
            "{} has no columns",
            source
        )));
    }

    debug!("Loaded shape (raw): {:?}", df.shape());
    Ok(df)
}

fn read_local(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(CleaningError::MissingPrerequisite(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    string_read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse CSV {}", path.display()))
}

/// Parse CSV held in memory with the same all-text options.
pub fn read_bytes(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    string_read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

#[cfg(feature = "remote")]
fn fetch_remote(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| CleaningError::MissingPrerequisite(format!("cannot fetch {}: {}", url, e)))?;
    let bytes = response.bytes()?;
    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote"))]
fn fetch_remote(url: &str) -> Result<Vec<u8>> {
    Err(CleaningError::MissingPrerequisite(format!(
        "{} is remote but this build lacks the `remote` feature",
        url
    )))
}

/// Write `df` as a headed, comma separated CSV.
///
/// The frame goes to a sibling temp file first and is renamed into place, so
/// a failed write never leaves a truncated output behind.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut file =
            File::create(&tmp_path).context(format!("Failed to create {}", tmp_path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Failed to write {}", tmp_path.display()))?;
    }
    fs::rename(&tmp_path, path).context(format!("Failed to move output to {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}
