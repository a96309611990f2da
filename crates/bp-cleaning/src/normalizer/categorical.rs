//! Sentinel filling, sex canonicalization and binary-flag mapping.

use super::rules::NormalizationRules;
use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnKind, NormalizationCounts};
use tracing::{debug, warn};

/// Normalizes categorical encodings in place.
pub struct CategoricalNormalizer<'a> {
    rules: &'a NormalizationRules,
    sentinel: &'a str,
}

impl<'a> CategoricalNormalizer<'a> {
    pub fn new(rules: &'a NormalizationRules, sentinel: &'a str) -> Self {
        Self { rules, sentinel }
    }

    /// Phase one: fill missing categorical cells and canonicalize `Sex`.
    pub fn fill_and_normalize_sex(
        &self,
        table: &mut Table,
        counts: &mut NormalizationCounts,
    ) -> Result<()> {
        for name in table.columns_of_kind(ColumnKind::Categorical) {
            let values = table.values_str(&name)?;
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing == 0 {
                continue;
            }
            let filled = values
                .into_iter()
                .map(|v| Some(v.unwrap_or_else(|| self.sentinel.to_string())))
                .collect();
            table.set_categorical(&name, filled)?;
            debug!("Filled {} missing values in '{}' with '{}'", missing, name, self.sentinel);
            counts.sentinel_filled.insert(name, missing);
        }

        let sex = &self.rules.sex_column;
        if table.has_column(sex) && table.kind(sex) != Some(ColumnKind::Identifier) {
            let raw = table.values_str(sex)?;
            let mut remapped = 0;
            let normalized = raw
                .iter()
                .map(|v| {
                    let cell = v.as_deref().unwrap_or(self.sentinel);
                    let canonical = self.rules.sex_of(cell).as_str();
                    if cell != canonical {
                        remapped += 1;
                    }
                    Some(canonical.to_string())
                })
                .collect();
            table.set_categorical(sex, normalized)?;
            debug!("Normalized '{}': {} values remapped", sex, remapped);
            counts.sex_remapped = remapped;
        }

        Ok(())
    }

    /// Phase two: map the binary-flag columns to 0/1, then force
    /// pregnancy to 0 on male rows.
    ///
    /// Must run after [`Self::fill_and_normalize_sex`], the correction reads
    /// the canonical sex values.
    pub fn normalize_binary_flags(
        &self,
        table: &mut Table,
        counts: &mut NormalizationCounts,
    ) -> Result<()> {
        for name in &self.rules.binary_columns {
            if !table.has_column(name) || table.kind(name) == Some(ColumnKind::Identifier) {
                continue;
            }
            let raw = table.values_str(name)?;
            let unrecognized = raw
                .iter()
                .flatten()
                .filter(|cell| self.rules.binary_of(cell) == 0 && !self.rules.is_false_token(cell))
                .count();
            let flags = self.to_flags(&raw);
            let ones = flags.iter().filter(|&&f| f == 1).count();
            table.set_flag(name, flags)?;

            debug!("Mapped '{}' to 0/1 ({} ones)", name, ones);
            if unrecognized > 0 {
                warn!("'{}': {} unrecognized tokens read as 0", name, unrecognized);
            }
            counts.binary_ones.insert(name.clone(), ones);
            counts.unrecognized_binary.insert(name.clone(), unrecognized);
        }

        counts.pregnancy_corrected = self.correct_pregnancy(table)?;
        Ok(())
    }

    fn to_flags(&self, raw: &[Option<String>]) -> Vec<i32> {
        raw.iter()
            .map(|v| v.as_deref().map_or(0, |cell| self.rules.binary_of(cell)))
            .collect()
    }

    /// Zero the pregnancy flag where the canonical sex starts with `m`.
    ///
    /// A pregnancy column outside the configured binary columns is mapped
    /// through the same tokens first, so its values survive as 0/1.
    fn correct_pregnancy(&self, table: &mut Table) -> Result<usize> {
        let (sex, pregnancy) = (&self.rules.sex_column, &self.rules.pregnancy_column);
        if !table.has_column(sex)
            || !table.has_column(pregnancy)
            || table.kind(pregnancy) == Some(ColumnKind::Identifier)
        {
            return Ok(0);
        }

        let mut flags: Vec<i32> = if table.kind(pregnancy) == Some(ColumnKind::Flag) {
            table
                .values_f64(pregnancy)?
                .iter()
                .map(|v| i32::from(*v == Some(1.0)))
                .collect()
        } else {
            debug!("'{}' is not a binary column; mapping its tokens to 0/1", pregnancy);
            self.to_flags(&table.values_str(pregnancy)?)
        };

        let sexes = table.values_str(sex)?;
        let mut corrected = 0;
        for (flag, sex) in flags.iter_mut().zip(&sexes) {
            let is_male = sex
                .as_deref()
                .is_some_and(|s| s.trim().to_lowercase().starts_with('m'));
            if is_male && *flag != 0 {
                *flag = 0;
                corrected += 1;
            }
        }
        table.set_flag(pregnancy, flags)?;

        if corrected > 0 {
            debug!("Set '{}' to 0 on {} male rows", pregnancy, corrected);
        }
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        let df = df![
            "Patient_Number" => ["1", "2", "3", "4", "5"],
            "Sex" => [Some("M"), Some("female."), None, Some("x"), Some("Male")],
            "Pregnancy" => [Some("yes"), Some("Y"), Some("no"), None, Some("1")],
            "Smoking" => [Some("true"), Some("0"), Some("maybe"), Some("N"), None],
            "Note" => [Some("a"), None, None, Some("b"), Some("c")],
        ]
        .unwrap();
        Table::new(df).with_identifier(Some("Patient_Number".to_string()))
    }

    fn normalize(table: &mut Table) -> NormalizationCounts {
        let rules = NormalizationRules::default();
        let normalizer = CategoricalNormalizer::new(&rules, "Unknown");
        let mut counts = NormalizationCounts::default();
        normalizer.fill_and_normalize_sex(table, &mut counts).unwrap();
        normalizer.normalize_binary_flags(table, &mut counts).unwrap();
        counts
    }

    fn strings(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_sex_canonical_values() {
        let mut table = table();
        let counts = normalize(&mut table);
        assert_eq!(
            table.values_str("Sex").unwrap(),
            strings(&["male", "female", "unknown", "unknown", "male"])
        );
        assert_eq!(counts.sex_remapped, 5);
    }

    #[test]
    fn test_sentinel_fill() {
        let mut table = table();
        let counts = normalize(&mut table);
        assert_eq!(
            table.values_str("Note").unwrap(),
            strings(&["a", "Unknown", "Unknown", "b", "c"])
        );
        assert_eq!(counts.sentinel_filled["Note"], 2);
        assert_eq!(counts.sentinel_filled["Sex"], 1);
    }

    #[test]
    fn test_binary_flags_and_pregnancy_correction() {
        let mut table = table();
        let counts = normalize(&mut table);

        assert_eq!(table.kind("Pregnancy"), Some(ColumnKind::Flag));
        assert_eq!(table.series("Pregnancy").unwrap().dtype(), &DataType::Int32);
        // rows 1 and 5 are male and were marked pregnant
        assert_eq!(
            table.values_f64("Pregnancy").unwrap(),
            vec![Some(0.0), Some(1.0), Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(counts.pregnancy_corrected, 2);
        assert_eq!(
            table.values_f64("Smoking").unwrap(),
            vec![Some(1.0), Some(0.0), Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(counts.binary_ones["Smoking"], 1);
        // "maybe" is neither a true nor a false token; missing cells are not counted
        assert_eq!(counts.unrecognized_binary["Smoking"], 1);
        assert_eq!(counts.unrecognized_binary["Pregnancy"], 0);
    }

    #[test]
    fn test_pregnancy_outside_binary_columns_keeps_values() {
        let df = df![
            "Sex" => ["M", "F", "F"],
            "Pregnancy" => ["yes", "yes", "no"],
        ]
        .unwrap();
        let mut table = Table::new(df);
        let rules = NormalizationRules {
            version: 2,
            binary_columns: vec!["Smoking".to_string()],
            ..NormalizationRules::default()
        };
        let normalizer = CategoricalNormalizer::new(&rules, "Unknown");
        let mut counts = NormalizationCounts::default();
        normalizer.fill_and_normalize_sex(&mut table, &mut counts).unwrap();
        normalizer.normalize_binary_flags(&mut table, &mut counts).unwrap();

        assert_eq!(table.kind("Pregnancy"), Some(ColumnKind::Flag));
        assert_eq!(table.series("Pregnancy").unwrap().dtype(), &DataType::Int32);
        assert_eq!(
            table.values_str("Pregnancy").unwrap(),
            strings(&["0", "1", "0"])
        );
        assert_eq!(counts.pregnancy_corrected, 1);
    }

    #[test]
    fn test_numeric_sex_and_pregnancy() {
        let df = df![
            "Sex" => ["x", "x", "x"],
            "Pregnancy" => ["x", "x", "x"],
        ]
        .unwrap();
        let mut table = Table::new(df);
        table
            .set_numeric("Sex", vec![Some(0.0), Some(1.0), Some(1.0)])
            .unwrap();
        table
            .set_numeric("Pregnancy", vec![Some(1.0), Some(1.0), Some(0.0)])
            .unwrap();
        let counts = normalize(&mut table);

        // 0/1 codes are not sex synonyms
        assert_eq!(table.kind("Sex"), Some(ColumnKind::Categorical));
        assert_eq!(table.series("Sex").unwrap().dtype(), &DataType::String);
        assert_eq!(
            table.values_str("Sex").unwrap(),
            strings(&["unknown", "unknown", "unknown"])
        );
        assert_eq!(counts.sex_remapped, 3);

        assert_eq!(table.kind("Pregnancy"), Some(ColumnKind::Flag));
        assert_eq!(table.series("Pregnancy").unwrap().dtype(), &DataType::Int32);
        assert_eq!(
            table.values_str("Pregnancy").unwrap(),
            strings(&["1", "1", "0"])
        );
        assert_eq!(counts.pregnancy_corrected, 0);
    }

    #[test]
    fn test_numeric_binary_column_rendered_first() {
        let df = df!["Smoking" => ["x", "x", "x"]].unwrap();
        let mut table = Table::new(df);
        table
            .set_numeric("Smoking", vec![Some(1.0), Some(0.0), Some(2.0)])
            .unwrap();
        normalize(&mut table);
        assert_eq!(
            table.values_f64("Smoking").unwrap(),
            vec![Some(1.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_identifier_untouched() {
        let mut table = table();
        normalize(&mut table);
        assert_eq!(
            table.values_str("Patient_Number").unwrap(),
            strings(&["1", "2", "3", "4", "5"])
        );
    }
}
