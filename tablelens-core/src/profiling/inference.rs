//! Numeric-vs-text type inference.

use crate::models::CellValue;

use super::models::ColumnType;

/// Number of leading non-null values inspected when inferring a type.
pub const INFERENCE_SAMPLE_SIZE: usize = 100;

/// Infers a column type from its non-null values.
///
/// Only the first [`INFERENCE_SAMPLE_SIZE`] values are inspected. The column
/// is numeric when the sample is non-empty and every sampled value is a
/// number or non-blank text that parses fully as a number. A column whose
/// later values stop looking numeric is still classified from the sample.
pub fn infer_column_type<'a, I>(non_null: I) -> ColumnType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut sampled = 0usize;
    for value in non_null.into_iter().take(INFERENCE_SAMPLE_SIZE) {
        if !value.looks_numeric() {
            return ColumnType::Text;
        }
        sampled += 1;
    }

    if sampled == 0 {
        ColumnType::Text
    } else {
        ColumnType::Numeric
    }
}
