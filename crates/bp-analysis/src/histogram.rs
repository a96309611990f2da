//! Equal-width histogram of the target, rendered to PNG.
//!
//! The image carries bars only: no axis labels or captions, so no font
//! backend is needed.

use crate::error::{AnalysisError, Result};
use bp_cleaning::sorted_present;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const IMAGE_SIZE: (u32, u32) = (800, 400);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
}

/// Split `[min, max]` of the present values into `bins` equal-width bins.
///
/// Every bin is half-open except the last, which includes `max`. A constant
/// sample is widened to `[v - 0.5, v + 0.5]`. Returns an empty vector when
/// there are no values or `bins` is zero.
pub fn histogram_bins(values: &[Option<f64>], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted_present(values);
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let (min, max) = if first == last {
        (first - 0.5, last + 0.5)
    } else {
        (first, last)
    };
    let width = (max - min) / bins as f64;

    let mut counts = vec![0u32; bins];
    for v in &sorted {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

fn plot_err<E: std::fmt::Display>(err: E) -> AnalysisError {
    AnalysisError::Plot(err.to_string())
}

/// Draw `bins` to a PNG at `path`, creating the parent directory.
pub fn render_histogram(bins: &[HistogramBin], path: &Path) -> Result<()> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Err(AnalysisError::Plot("no bins to draw".to_string()));
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let top = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    // headroom above the tallest bar
    let y_max = top + top / 10 + 1;

    let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(first.lower..last.upper, 0u32..y_max)
        .map_err(plot_err)?;

    chart
        .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new([(b.lower, 0), (b.upper, b.count)], BLUE.mix(0.6).filled())
        }))
        .map_err(plot_err)?;
    chart
        .draw_series(
            bins.iter()
                .filter(|b| b.count > 0)
                .map(|b| Rectangle::new([(b.lower, 0), (b.upper, b.count)], BLACK.stroke_width(1))),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    debug!("Histogram: {} bins, tallest {}", bins.len(), top);
    info!("Histogram written to {}", path.display());
    Ok(())
}
