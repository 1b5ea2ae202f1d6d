use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::DecodeError;
use crate::types::{CellValue, UploadedRow};

/// Reads an uploaded file into header-keyed rows. Only the first worksheet is read.
pub trait SpreadsheetDecoder {
    fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<UploadedRow>, DecodeError>;
}

/// Container formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// xlsx, xlsm, xlsb, xls or ods, handled by calamine
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Zip and OLE signatures always mean a workbook; otherwise the extension decides.
    pub fn detect(file_name: &str, bytes: &[u8]) -> Self {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            return SheetFormat::Workbook;
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") | Some("txt") => SheetFormat::Csv,
            _ => SheetFormat::Workbook,
        }
    }
}

/// Dispatches on [`SheetFormat::detect`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoDecoder;

impl SpreadsheetDecoder for AutoDecoder {
    fn decode(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<UploadedRow>, DecodeError> {
        let format = SheetFormat::detect(file_name, bytes);
        debug!(file = %file_name, ?format, size = bytes.len(), "Decoding spreadsheet");
        match format {
            SheetFormat::Workbook => WorkbookDecoder.decode(file_name, bytes),
            SheetFormat::Csv => CsvDecoder.decode(file_name, bytes),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookDecoder;

impl SpreadsheetDecoder for WorkbookDecoder {
    fn decode(&self, _file_name: &str, bytes: &[u8]) -> Result<Vec<UploadedRow>, DecodeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DecodeError::NoWorksheet)??;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => {
                HeaderNames::from_cells(header_row.iter().map(|cell| cell_value(cell).to_string()))
            }
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .map(|cells| build_row(&headers, cells.iter().map(cell_value)))
            .filter(|row| !row.is_empty())
            .collect())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvDecoder;

impl SpreadsheetDecoder for CsvDecoder {
    fn decode(&self, _file_name: &str, bytes: &[u8]) -> Result<Vec<UploadedRow>, DecodeError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes);

        let headers = HeaderNames::from_cells(
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
                .map(str::to_string),
        );

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = build_row(&headers, record.iter().map(text_cell_value));
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

/// Column names taken from the header row.
///
/// Blank headers become `__EMPTY`, `__EMPTY_1`, ... and repeated names get a numeric
/// suffix, so every column keeps a distinct key.
#[derive(Debug, Clone)]
struct HeaderNames(Vec<String>);

impl HeaderNames {
    fn from_cells<I: IntoIterator<Item = String>>(cells: I) -> Self {
        let mut suffixes: HashMap<String, usize> = HashMap::new();
        let mut used: HashSet<String> = HashSet::new();
        let mut names = Vec::new();
        for raw in cells {
            let base = if raw.trim().is_empty() {
                "__EMPTY".to_string()
            } else {
                raw
            };
            let mut name = base.clone();
            // A literal header such as `udise_1` may already hold the next suffix.
            while used.contains(&name) {
                let count = suffixes.entry(base.clone()).or_insert(0);
                *count += 1;
                name = format!("{base}_{count}");
            }
            used.insert(name.clone());
            names.push(name);
        }
        Self(names)
    }

    fn name(&self, index: usize) -> String {
        self.0
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("__EMPTY_{index}"))
    }
}

fn build_row<I: Iterator<Item = CellValue>>(headers: &HeaderNames, cells: I) -> UploadedRow {
    let mut row = UploadedRow::new();
    for (index, value) in cells.enumerate() {
        if !value.is_blank() {
            row.push(headers.name(index), value);
        }
    }
    row
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::from_float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.is_empty() => CellValue::Blank,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Empty => CellValue::Blank,
        other => CellValue::Text(other.to_string()),
    }
}

/// Types a CSV field the way a spreadsheet would on open.
/// Digit strings with a leading zero stay text so no code loses digits.
fn text_cell_value(field: &str) -> CellValue {
    let field = field.trim();
    if field.is_empty() {
        return CellValue::Blank;
    }
    let keeps_leading_zero = field.len() > 1 && field.starts_with('0') && !field.starts_with("0.");
    if !keeps_leading_zero {
        if let Ok(i) = field.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = field.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Number(f);
            }
        }
    }
    match field.to_ascii_lowercase().as_str() {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => CellValue::Text(field.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        build(workbook.add_worksheet());
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_first_sheet_with_typed_cells() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "School").unwrap();
            sheet.write_string(0, 1, "UDISE Code").unwrap();
            sheet.write_string(1, 0, "Govt PS Gop").unwrap();
            sheet.write_number(1, 1, 21180100101.0).unwrap();
            sheet.write_string(2, 0, "UGHS Puri").unwrap();
            sheet.write_string(2, 1, "0211801").unwrap();
        });

        let rows = AutoDecoder.decode("schools.xlsx", &bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("UDISE Code"), Some(&CellValue::Integer(21180100101)));
        assert_eq!(rows[1].get("UDISE Code"), Some(&CellValue::from("0211801")));
        assert_eq!(rows[1].get("School"), Some(&CellValue::from("UGHS Puri")));
    }

    #[test]
    fn only_the_first_sheet_is_read() {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.write_string(0, 0, "udise").unwrap();
        first.write_number(1, 0, 1.0).unwrap();
        let second = workbook.add_worksheet();
        second.write_string(0, 0, "udise").unwrap();
        second.write_number(1, 0, 2.0).unwrap();
        second.write_number(2, 0, 3.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = WorkbookDecoder.decode("two.xlsx", &bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("udise"), Some(&CellValue::Integer(1)));
    }

    #[test]
    fn header_only_sheet_yields_no_rows() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "UDISE").unwrap();
        });
        assert!(AutoDecoder.decode("empty.xlsx", &bytes).unwrap().is_empty());
    }

    #[test]
    fn blank_cells_are_omitted_from_rows() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "a").unwrap();
            sheet.write_string(0, 1, "udise").unwrap();
            sheet.write_string(1, 0, "only a").unwrap();
            sheet.write_number(2, 1, 5.0).unwrap();
        });

        let rows = AutoDecoder.decode("gaps.xlsx", &bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert!(rows[0].get("udise").is_none());
        assert_eq!(rows[1].get("udise"), Some(&CellValue::Integer(5)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = AutoDecoder.decode("report.xlsx", b"definitely not a workbook");
        assert!(result.is_err());

        let truncated_zip = b"PK\x03\x04garbage";
        assert!(AutoDecoder.decode("upload.bin", truncated_zip).is_err());
    }

    #[test]
    fn csv_fields_are_typed() {
        let csv = "\u{feff}Udice Code,Name,Active\n101,Alpha,TRUE\n0102,Beta,false\n,Gamma,\n";
        let rows = AutoDecoder.decode("codes.csv", csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("Udice Code"), Some(&CellValue::Integer(101)));
        assert_eq!(rows[0].get("Active"), Some(&CellValue::Bool(true)));
        assert_eq!(rows[1].get("Udice Code"), Some(&CellValue::from("0102")));
        assert!(rows[2].get("Udice Code").is_none());
    }

    #[test]
    fn duplicate_and_blank_headers_get_distinct_names() {
        let csv = "udise,,udise,\n1,2,3,4\n";
        let rows = CsvDecoder.decode("dup.csv", csv.as_bytes()).unwrap();
        let names: Vec<&str> = rows[0].iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["udise", "__EMPTY", "udise_1", "__EMPTY_1"]);
    }

    #[test]
    fn generated_suffix_skips_names_already_in_the_header() {
        let csv = "udise,udise_1,udise,udise\n1,2,3,4\n";
        let rows = CsvDecoder.decode("dup.csv", csv.as_bytes()).unwrap();
        let names: Vec<&str> = rows[0].iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["udise", "udise_1", "udise_2", "udise_3"]);
        assert_eq!(rows[0].get("udise_2"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn format_detection_prefers_magic_bytes() {
        assert_eq!(SheetFormat::detect("a.csv", b"PK\x03\x04rest"), SheetFormat::Workbook);
        assert_eq!(SheetFormat::detect("a.CSV", b"udise\n1"), SheetFormat::Csv);
        assert_eq!(SheetFormat::detect("a.xlsx", b"udise\n1"), SheetFormat::Workbook);
    }
}
