use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::info;

use crate::constants::EXPORT_SHEET_NAME;
use crate::error::Result;
use crate::types::UnmatchedGroup;

const HEADERS: [&str; 3] = ["SL No.", "ID", "Name"];

/// Builds the unmatched-groups workbook: one sheet, serial number, id and name per group.
pub fn unmatched_groups_workbook(groups: &[UnmatchedGroup]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, group) in groups.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_number(row, 0, (index + 1) as f64)?;
        match group.id.as_f64() {
            Some(numeric_id) if group.id.is_number() => {
                sheet.write_number(row, 1, numeric_id)?;
            }
            _ => {
                sheet.write_string(row, 1, group.display_id())?;
            }
        }
        sheet.write_string(row, 2, group.display_name())?;
    }
    sheet.set_column_width(1, 32)?;
    sheet.set_column_width(2, 40)?;

    Ok(workbook)
}

pub fn export_unmatched_groups(groups: &[UnmatchedGroup], path: &Path) -> Result<()> {
    let mut workbook = unmatched_groups_workbook(groups)?;
    workbook.save(path)?;
    info!(path = %path.display(), rows = groups.len(), "Exported unmatched groups");
    Ok(())
}
