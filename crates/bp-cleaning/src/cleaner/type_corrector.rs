//! Numeric type coercion for raw text columns.

use crate::error::Result;
use crate::table::Table;
use crate::types::ColumnKind;
use crate::utils::count_present;
use tracing::debug;

/// Decides per column whether it is numeric, and converts it if so.
pub struct NumericCoercer;

impl NumericCoercer {
    /// A column is numeric when at least `threshold` of its rows parse.
    ///
    /// The comparison is `parsed >= len * threshold` in real arithmetic, so
    /// with the default 0.5 exactly half the rows is enough.
    #[inline]
    pub fn should_coerce(parsed: usize, len: usize, threshold: f64) -> bool {
        parsed as f64 >= len as f64 * threshold
    }

    /// Convert every qualifying categorical column to Float64.
    ///
    /// The identifier column is never touched. Columns that are already
    /// numeric stay numeric whatever their parse rate. Unparseable cells in a
    /// converted column become missing. Returns all numeric columns in frame
    /// order.
    pub fn coerce(table: &mut Table, threshold: f64) -> Result<Vec<String>> {
        let height = table.height();

        for name in table.columns_of_kind(ColumnKind::Categorical) {
            let parsed = table.values_f64(&name)?;
            let present = count_present(&parsed);

            if Self::should_coerce(present, height, threshold) {
                debug!(
                    "Coerced '{}' to numeric ({}/{} values parsed)",
                    name, present, height
                );
                table.set_numeric(&name, parsed)?;
            } else {
                debug!(
                    "Kept '{}' categorical ({}/{} values parsed)",
                    name, present, height
                );
            }
        }

        Ok(table.columns_of_kind(ColumnKind::Numeric))
    }
}
