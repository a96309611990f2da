//! Integration tests for the cleaning pipeline.
//!
//! These tests run the full stage against CSV fixtures and check the
//! cleaned file the analysis stage will read.

use bp_cleaning::{
    CleaningConfig, CleaningPipeline, CleaningReport, DataSource, IqrFences, NormalizationRules,
    ReportGenerator, Winsorizer, flag_values, load_raw_table, quantile, series_to_f64,
    series_to_strings,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Clean `fixture` into a temp dir and read the written CSV back as text.
fn clean_fixture(fixture: &str) -> (DataFrame, CleaningReport, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("cleaned.csv");

    let config = CleaningConfig::builder()
        .output_path(&output)
        .build()
        .expect("Default config should be valid");
    let outcome = CleaningPipeline::builder()
        .config(config)
        .build()
        .expect("Failed to build pipeline")
        .run(&DataSource::Local(fixtures_path().join(fixture)))
        .expect("Cleaning should succeed");

    let written = load_raw_table(&DataSource::Local(output)).expect("Failed to read output");
    (written, outcome.report, dir)
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    series_to_strings(df.column(name).unwrap().as_materialized_series()).unwrap()
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    series_to_f64(df.column(name).unwrap().as_materialized_series()).unwrap()
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// End-to-End Scenarios
// ============================================================================

#[test]
fn test_hemoglobin_out_of_range_is_imputed_and_not_flagged() {
    let (cleaned, report, _dir) = clean_fixture("hemoglobin_ten_rows.csv");

    assert_eq!(cleaned.height(), 10);
    assert_eq!(report.out_of_range["Level_of_Hemoglobin"], 1);

    // the 50 became missing, then the median of the other nine
    let hb = floats(&cleaned, "Level_of_Hemoglobin");
    assert_eq!(hb[4], Some(13.0));
    assert_eq!(report.imputation["Level_of_Hemoglobin"].median, 13.0);
    assert_eq!(report.imputation["Level_of_Hemoglobin"].filled, 1);

    assert_eq!(report.outliers["Level_of_Hemoglobin"].flagged, 0);
    assert!(!names(&cleaned).contains(&"is_outlier_Level_of_Hemoglobin".to_string()));
    assert!(
        report
            .dropped_flags
            .contains(&"is_outlier_Level_of_Hemoglobin".to_string())
    );
}

#[test]
fn test_sample_dataset_end_to_end() {
    let (cleaned, report, _dir) = clean_fixture("bp_sample.csv");

    assert_eq!(report.rows_loaded, 12);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(cleaned.height(), 11);
    assert_eq!(report.rows_written, 11);

    assert_eq!(report.out_of_range["Age"], 1);
    assert_eq!(report.out_of_range["BMI"], 1);
    assert_eq!(report.out_of_range["Level_of_Hemoglobin"], 1);

    // original columns keep their input order, flags come last
    let columns = names(&cleaned);
    assert_eq!(columns[0], "Patient_Number");
    assert_eq!(columns[10], "Adrenal_and_thyroid_disorders");
    assert!(columns[11..].iter().all(|c| c.starts_with("is_outlier_")));

    // no numeric cell is left missing
    for column in &report.numeric_columns {
        if cleaned.column(column).is_ok() {
            assert_eq!(cleaned.column(column).unwrap().null_count(), 0, "{}", column);
        }
    }
}

#[test]
fn test_duplicate_rows_collapse_to_one() {
    let (cleaned, report, _dir) = clean_fixture("duplicates.csv");

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(
        strings(&cleaned, "Patient_Number"),
        vec![Some("1".to_string()), Some("2".to_string())]
    );
}

// ============================================================================
// Invariants on the Cleaned Output
// ============================================================================

#[test]
fn test_identifier_values_are_verbatim() {
    let (cleaned, _report, _dir) = clean_fixture("bp_sample.csv");

    let expected: Vec<Option<String>> = [
        "001", "002", "003", "004", "005", "006", "007", "008", "009", "010", "011",
    ]
    .iter()
    .map(|s| Some(s.to_string()))
    .collect();
    assert_eq!(strings(&cleaned, "Patient_Number"), expected);
}

#[test]
fn test_no_pregnant_male_rows() {
    let (cleaned, report, _dir) = clean_fixture("bp_sample.csv");

    let sex = strings(&cleaned, "Sex");
    let pregnancy = floats(&cleaned, "Pregnancy");
    for (s, p) in sex.iter().zip(&pregnancy) {
        let s = s.as_deref().unwrap_or_default();
        assert!(["male", "female", "unknown"].contains(&s), "unexpected sex {s}");
        assert!(matches!(p, Some(v) if *v == 0.0 || *v == 1.0));
        if s.starts_with('m') {
            assert_eq!(*p, Some(0.0));
        }
    }
    // rows 001, 007 and 011 are male with a positive pregnancy value
    assert_eq!(report.normalization.pregnancy_corrected, 3);
}

#[test]
fn test_retained_flags_are_informative() {
    let (cleaned, report, _dir) = clean_fixture("bp_sample.csv");

    for column in names(&cleaned)
        .into_iter()
        .filter(|c| c.starts_with("is_outlier_"))
    {
        let sum: f64 = floats(&cleaned, &column).into_iter().flatten().sum();
        assert!(sum > 0.0, "{column} should have been pruned");
        assert!(!column.to_lowercase().contains("patient_number"));
        assert!(report.retained_flags.contains(&column));
    }
    for column in &report.dropped_flags {
        assert!(cleaned.column(column).is_err());
    }
}

#[test]
fn test_winsorized_values_stay_in_reported_bounds() {
    let (cleaned, report, _dir) = clean_fixture("bp_sample.csv");

    for column in ["Age", "BMI", "Level_of_Hemoglobin", "Physical_activity"] {
        let bounds = report.winsorized[column];
        for value in floats(&cleaned, column).into_iter().flatten() {
            assert!(
                value >= bounds.lower - 1e-9 && value <= bounds.upper + 1e-9,
                "{column}: {value} outside [{}, {}]",
                bounds.lower,
                bounds.upper
            );
        }
    }
}

#[test]
fn test_missing_input_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cleaned.csv");
    let config = CleaningConfig::builder().output_path(&output).build().unwrap();

    let err = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(&DataSource::Local(fixtures_path().join("nope.csv")))
        .unwrap_err();

    assert!(err.is_missing_prerequisite());
    assert_eq!(err.error_code(), "MISSING_PREREQUISITE");
    assert!(!output.exists());
}

#[test]
fn test_required_column_missing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cleaned.csv");
    let config = CleaningConfig::builder()
        .required_columns(["Level_of_Hemoglobin", "Salt_Intake"])
        .output_path(&output)
        .build()
        .unwrap();

    let err = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(&DataSource::Local(fixtures_path().join("duplicates.csv")))
        .unwrap_err();

    assert!(err.is_missing_prerequisite());
    assert!(err.to_string().contains("Salt_Intake"));
    assert!(!output.exists());
}

// ============================================================================
// Configuration and Reporting
// ============================================================================

#[test]
fn test_custom_rules_are_used() {
    let mut rules = NormalizationRules::default();
    rules.version = 2;
    rules
        .sex_synonyms
        .insert("x".to_string(), bp_cleaning::SexCategory::Female);

    let dir = tempfile::tempdir().unwrap();
    let config = CleaningConfig::builder()
        .rules(rules)
        .output_path(dir.path().join("cleaned.csv"))
        .build()
        .unwrap();
    let outcome = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(&DataSource::Local(fixtures_path().join("bp_sample.csv")))
        .unwrap();

    assert_eq!(outcome.report.rules_version, 2);
    // row 010 carries Sex "x"
    let sex = strings(&outcome.data, "Sex");
    assert_eq!(sex[9].as_deref(), Some("female"));
}

#[test]
fn test_progress_updates_reach_completion() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let dir = tempfile::tempdir().unwrap();
    let config = CleaningConfig::builder()
        .output_path(dir.path().join("cleaned.csv"))
        .build()
        .unwrap();

    CleaningPipeline::builder()
        .config(config)
        .on_progress(move |update| sink.lock().unwrap().push(update.progress))
        .build()
        .unwrap()
        .run(&DataSource::Local(fixtures_path().join("duplicates.csv")))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&0.0));
    assert_eq!(seen.last(), Some(&1.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_report_round_trips_through_json_file() {
    let (_cleaned, report, dir) = clean_fixture("bp_sample.csv");

    let generator = ReportGenerator::for_output(&dir.path().join("cleaned.csv"));
    let path = generator.write_report_to_file(&report).unwrap();
    assert_eq!(path, dir.path().join("cleaned_report.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["rows_written"], 11);
    assert_eq!(json["identifier_column"], "Patient_Number");
    assert!(Path::new(&path).exists());
}

// ============================================================================
// Randomized Properties
// ============================================================================

fn random_column(rng: &mut StdRng, len: usize) -> Vec<Option<f64>> {
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.1) {
                None
            } else if rng.gen_bool(0.05) {
                Some(rng.gen_range(-500.0..500.0))
            } else {
                Some(rng.gen_range(10.0..20.0))
            }
        })
        .collect()
}

#[test]
fn test_flag_sum_matches_fence_count_on_random_columns() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.gen_range(0..60);
        let values = random_column(&mut rng, len);

        let (flags, stat) = flag_values(&values, 1.5);
        let fences = IqrFences::compute(&values, 1.5);
        let expected = values
            .iter()
            .flatten()
            .filter(|v| fences.is_outlier(**v))
            .count();

        assert_eq!(flags.iter().sum::<i32>() as usize, expected);
        assert_eq!(stat.flagged, expected);
    }
}

#[test]
fn test_constant_columns_never_flag() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let value = rng.gen_range(0.0..100.0);
        let len = rng.gen_range(1..40);
        let values: Vec<Option<f64>> = (0..len)
            .map(|_| if rng.gen_bool(0.2) { None } else { Some(value) })
            .collect();
        let (flags, stat) = flag_values(&values, 1.5);
        assert!(flags.iter().all(|f| *f == 0));
        assert_eq!(stat.flagged, 0);
    }
}

#[test]
fn test_winsorized_random_columns_stay_within_percentiles() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..200 {
        let len = rng.gen_range(0..80);
        let values = random_column(&mut rng, len);

        match Winsorizer::clip_values(&values, 0.01, 0.99) {
            Some((clipped, bounds)) => {
                assert_eq!(Some(bounds.lower), quantile(&values, 0.01));
                assert_eq!(Some(bounds.upper), quantile(&values, 0.99));
                for (before, after) in values.iter().zip(&clipped) {
                    assert_eq!(before.is_none(), after.is_none());
                    if let Some(v) = after {
                        assert!(*v >= bounds.lower && *v <= bounds.upper);
                    }
                }
            }
            None => assert!(values.iter().all(Option::is_none)),
        }
    }
}

#[test]
fn test_sanitizer_idempotent_on_random_columns() {
    let mut rng = StdRng::seed_from_u64(42);
    let bound = bp_cleaning::RangeBound::new("Level_of_Hemoglobin", 4.0, 20.0);
    let mut totals = BTreeMap::new();
    for i in 0..100 {
        let values = random_column(&mut rng, 50);
        let (once, removed) = bp_cleaning::RangeSanitizer::sanitize_values(&values, &bound);
        let (twice, removed_again) = bp_cleaning::RangeSanitizer::sanitize_values(&once, &bound);
        assert_eq!(once, twice);
        assert_eq!(removed_again, 0);
        totals.insert(i, removed);
    }
    assert!(totals.values().any(|n| *n > 0));
}
