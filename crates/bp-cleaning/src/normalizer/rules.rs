use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical values of the `Sex` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SexCategory {
    Male,
    Female,
    Unknown,
}

impl SexCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

/// Lookup tables for the categorical normalizer.
///
/// Tokens are compared after trimming and lower-casing. Bump `version`
/// whenever a table changes meaning, it is echoed into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationRules {
    pub version: u32,
    pub sex_column: String,
    pub pregnancy_column: String,
    pub sex_synonyms: BTreeMap<String, SexCategory>,
    /// Tokens mapped to 1. Every other token maps to 0.
    pub true_tokens: Vec<String>,
    /// Tokens known to mean 0. Any other token also maps to 0 but is
    /// counted as unrecognized in the report.
    pub false_tokens: Vec<String>,
    pub binary_columns: Vec<String>,
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

impl Default for NormalizationRules {
    fn default() -> Self {
        let mut sex_synonyms = BTreeMap::new();
        for token in ["m", "male", "male."] {
            sex_synonyms.insert(token.to_string(), SexCategory::Male);
        }
        for token in ["f", "female", "female."] {
            sex_synonyms.insert(token.to_string(), SexCategory::Female);
        }
        for token in ["nan", "none", "unknown"] {
            sex_synonyms.insert(token.to_string(), SexCategory::Unknown);
        }

        Self {
            version: 1,
            sex_column: "Sex".to_string(),
            pregnancy_column: "Pregnancy".to_string(),
            sex_synonyms,
            true_tokens: owned(&["yes", "y", "true", "1"]),
            false_tokens: owned(&["no", "n", "false", "0", "unknown"]),
            binary_columns: owned(&[
                "Pregnancy",
                "Chronic_kidney_disease",
                "Adrenal_and_thyroid_disorders",
                "Smoking",
            ]),
        }
    }
}

impl NormalizationRules {
    /// Canonical sex for a raw cell. Unmapped tokens are unknown.
    pub fn sex_of(&self, raw: &str) -> SexCategory {
        self.sex_synonyms
            .get(raw.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(SexCategory::Unknown)
    }

    /// 0/1 value of a raw binary-flag cell.
    pub fn binary_of(&self, raw: &str) -> i32 {
        let token = raw.trim().to_lowercase();
        i32::from(self.true_tokens.iter().any(|t| *t == token))
    }

    pub fn is_false_token(&self, raw: &str) -> bool {
        let token = raw.trim().to_lowercase();
        self.false_tokens.iter().any(|t| *t == token)
    }
}
