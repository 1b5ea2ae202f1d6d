use crate::constants::IDENTIFIER_COLUMN_TOKENS;
use crate::types::{NormalizedRow, UploadedRow};

/// Reduces a decoded row to the single field the backend needs.
pub trait ColumnNormalizer {
    /// Returns `None` when the row has no identifier column.
    fn normalize_row(&self, row: &UploadedRow) -> Option<NormalizedRow>;

    fn normalize(&self, rows: &[UploadedRow]) -> Vec<NormalizedRow> {
        rows.iter().filter_map(|row| self.normalize_row(row)).collect()
    }
}

/// Picks the first column whose name contains one of the configured tokens,
/// compared case-insensitively.
pub struct IdentifierColumnNormalizer {
    tokens: Vec<String>,
}

impl IdentifierColumnNormalizer {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_identifier_column(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        self.tokens.iter().any(|token| column.contains(token.as_str()))
    }
}

impl Default for IdentifierColumnNormalizer {
    fn default() -> Self {
        Self::new(IDENTIFIER_COLUMN_TOKENS)
    }
}

impl ColumnNormalizer for IdentifierColumnNormalizer {
    fn normalize_row(&self, row: &UploadedRow) -> Option<NormalizedRow> {
        row.iter()
            .find(|(column, _)| self.is_identifier_column(column))
            .map(|(_, value)| NormalizedRow {
                identifier_code: value.clone(),
            })
    }
}
