//! Categorical normalization.
//!
//! Runs in two phases the driver calls separately: sentinel filling plus
//! `Sex` canonicalization, then binary-flag mapping plus the pregnancy
//! correction. Lookup tables live in [`NormalizationRules`].

mod categorical;
mod rules;

pub use categorical::CategoricalNormalizer;
pub use rules::{NormalizationRules, SexCategory};
