//! Shared utilities for the cleaning pipeline.
//!
//! Cell parsing, column extraction and the one quantile implementation every
//! statistic in this workspace goes through.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Column names of a DataFrame as owned strings, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Find a column by name ignoring ASCII case. Exact matches win.
pub fn find_column_ci(df: &DataFrame, name: &str) -> Option<String> {
    let names = column_names(df);
    if names.iter().any(|n| n == name) {
        return Some(name.to_string());
    }
    names.into_iter().find(|n| n.eq_ignore_ascii_case(name))
}

// =============================================================================
// Cell Parsing Utilities
// =============================================================================

/// Parse one cell as a number.
///
/// Surrounding whitespace is ignored. Non-finite results (`nan`, `inf`) count
/// as unparseable so that no NaN ever reaches the statistics.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a number the way a flag or token table expects to read it.
///
/// Integral values lose their fractional part (`1.0` -> `"1"`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Extract a column as optional floats.
///
/// String columns are parsed cell by cell, numeric columns are cast. Anything
/// that cannot be read as a finite number becomes `None`.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    if series.dtype() == &DataType::String {
        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_numeric_string))
            .collect())
    } else if is_numeric_dtype(series.dtype()) {
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect())
    } else {
        let as_text = series.cast(&DataType::String)?;
        series_to_f64(&as_text)
    }
}

/// Extract a column as optional strings.
///
/// Numeric cells are rendered with [`format_number`].
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    if series.dtype() == &DataType::String {
        Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    } else if is_numeric_dtype(series.dtype()) {
        Ok(series_to_f64(series)?
            .into_iter()
            .map(|v| v.map(format_number))
            .collect())
    } else {
        let as_text = series.cast(&DataType::String)?;
        series_to_strings(&as_text)
    }
}

/// Count cells that hold a value.
pub fn count_present<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}

// =============================================================================
// Quantiles
// =============================================================================

/// Non-missing values in ascending order.
pub fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(f64::total_cmp);
    present
}

/// Quantile of already sorted data, linear interpolation between closest ranks.
///
/// With `h = (n - 1) * p` the result is
/// `x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])`.
/// Returns `None` for empty input or a `p` outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let lower = sorted[lo];
    Some(lower + (h - lo as f64) * (sorted[hi] - lower))
}

/// Quantile over the non-missing values of a column.
pub fn quantile(values: &[Option<f64>], p: f64) -> Option<f64> {
    quantile_sorted(&sorted_present(values), p)
}

/// Median over the non-missing values of a column.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    quantile(values, 0.5)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int32));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string(" 12.5 "), Some(12.5));
        assert_eq!(parse_numeric_string("-3"), Some(-3.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("nan"), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn test_series_to_f64_from_strings() {
        let series = Series::new("v".into(), &[Some("1"), Some("x"), None, Some("2.5")]);
        let values = series_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(2.5)]);
    }

    #[test]
    fn test_series_to_strings_from_numbers() {
        let series = Series::new("v".into(), &[Some(1.0), None, Some(0.5)]);
        let values = series_to_strings(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), None, Some("0.5".to_string())]
        );
    }

    #[test]
    fn test_find_column_ci() {
        let df = df!["patient_number" => ["1"], "Age" => ["30"]].unwrap();
        assert_eq!(
            find_column_ci(&df, "Patient_Number"),
            Some("patient_number".to_string())
        );
        assert_eq!(find_column_ci(&df, "Age"), Some("Age".to_string()));
        assert_eq!(find_column_ci(&df, "BMI"), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // h = 3 * 0.25 = 0.75 -> 1 + 0.75 * 1
        assert_eq!(quantile_sorted(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
    }

    #[test]
    fn test_quantile_undefined() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[1.0], 1.5), None);
        assert_eq!(median(&[None, None]), None);
    }

    #[test]
    fn test_median_skips_missing() {
        assert_eq!(median(&[Some(5.0), None, Some(1.0), Some(3.0)]), Some(3.0));
        assert_eq!(median(&[Some(42.0)]), Some(42.0));
    }
}
