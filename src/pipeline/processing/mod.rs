// Pipeline processing: identifier column detection and row filtering

pub mod columns;
pub mod row_filter;

use crate::types::{NormalizedRow, UploadedRow};
use columns::{ColumnNormalizer, IdentifierColumnNormalizer};

/// Projects decoded rows onto their identifier codes, dropping rows without one.
pub fn extract_identifiers(rows: &[UploadedRow]) -> Vec<NormalizedRow> {
    let normalizer = IdentifierColumnNormalizer::default();
    row_filter::retain_present(normalizer.normalize(rows))
}
