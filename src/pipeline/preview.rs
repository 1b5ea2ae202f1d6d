use crate::constants::PREVIEW_COLUMN_HEADER;
use crate::types::{IdentifierList, Location, NormalizedRow};

/// Read-only view over the identifiers extracted from the current upload.
#[derive(Debug, Clone, Copy)]
pub struct Preview<'a> {
    rows: &'a [NormalizedRow],
    location: &'a Location,
}

impl<'a> Preview<'a> {
    pub fn new(rows: &'a [NormalizedRow], location: &'a Location) -> Self {
        Self { rows, location }
    }

    pub fn rows(&self) -> &'a [NormalizedRow] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flat code list, in row order, as it goes on the wire.
    pub fn identifier_codes(&self) -> IdentifierList {
        self.rows.iter().map(|r| r.identifier_code.clone()).collect()
    }

    pub fn summary(&self) -> String {
        if self.location.is_complete() {
            format!(
                "Found {} udise in {}, {}",
                self.len(),
                self.location.block,
                self.location.district
            )
        } else {
            format!("Found {} udise", self.len())
        }
    }

    /// Single-column text table with every row; no truncation.
    pub fn render(&self) -> String {
        let values: Vec<String> = self
            .rows
            .iter()
            .map(|r| r.identifier_code.to_string())
            .collect();
        let index_width = self.rows.len().max(1).to_string().len().max(1);
        let value_width = values
            .iter()
            .map(|v| v.chars().count())
            .chain(std::iter::once(PREVIEW_COLUMN_HEADER.len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&self.summary());
        out.push('\n');
        out.push_str(&format!(
            "{:>iw$}  {:<vw$}\n",
            "#",
            PREVIEW_COLUMN_HEADER,
            iw = index_width,
            vw = value_width
        ));
        out.push_str(&format!("{}  {}\n", "-".repeat(index_width), "-".repeat(value_width)));
        for (i, value) in values.iter().enumerate() {
            out.push_str(&format!(
                "{:>iw$}  {:<vw$}\n",
                i + 1,
                value,
                iw = index_width,
                vw = value_width
            ));
        }
        out
    }
}
