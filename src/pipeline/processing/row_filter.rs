use crate::types::{CellValue, NormalizedRow};

/// Presence check for an identifier value.
///
/// Only blank cells and empty text count as missing; numeric zero is a valid code.
pub fn has_identifier(value: &CellValue) -> bool {
    match value {
        CellValue::Blank => false,
        CellValue::Text(s) => !s.trim().is_empty(),
        _ => true,
    }
}

pub fn retain_present(rows: Vec<NormalizedRow>) -> Vec<NormalizedRow> {
    rows.into_iter()
        .filter(|row| has_identifier(&row.identifier_code))
        .collect()
}
