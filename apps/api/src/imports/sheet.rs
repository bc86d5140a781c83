//! Uploaded spreadsheet decoding: XLSX via calamine, CSV via the csv crate.
//! Both produce the same in-memory `Sheet` of stringified cells, so the
//! validation layer never cares which format arrived.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use thiserror::Error;

/// Sheet name the importer reads and the template generator writes.
pub const DATA_SHEET: &str = "Data";

/// Errors that abort an import before any row is processed.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unsupported file type '{0}': expected .xlsx or .csv")]
    Unsupported(String),

    #[error("could not read spreadsheet: {0}")]
    Unreadable(String),

    #[error("spreadsheet has no header row")]
    Empty,
}

/// One data row: the spreadsheet row number (header is row 1, so data starts
/// at 2) plus its cells, padded/truncated to the header width by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub number: u32,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// Decodes an upload by file extension. Rows whose cells are all empty are
/// dropped (trailing blank rows are routine in hand-edited workbooks), but
/// row numbers keep their spreadsheet positions.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<Sheet, SheetError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".xlsx") {
        parse_xlsx(bytes)
    } else if lower.ends_with(".csv") {
        parse_csv(bytes)
    } else {
        Err(SheetError::Unsupported(
            filename.rsplit('.').next().unwrap_or(filename).to_string(),
        ))
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<Sheet, SheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    // Prefer the well-known data sheet (templates carry a field-guide sheet
    // first); fall back to the first sheet for plain workbooks.
    let sheet_name = workbook
        .sheet_names()
        .iter()
        .find(|n| n.as_str() == DATA_SHEET)
        .cloned()
        .or_else(|| workbook.sheet_names().first().cloned())
        .ok_or(SheetError::Empty)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SheetError::Unreadable(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or(SheetError::Empty)?
        .iter()
        .map(cell_to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SheetError::Empty);
    }

    let mut rows = Vec::new();
    for (i, row) in rows_iter.enumerate() {
        let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
        cells.resize(headers.len(), String::new());
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(SheetRow {
            number: i as u32 + 2,
            cells,
        });
    }

    Ok(Sheet { headers, rows })
}

fn parse_csv(bytes: &[u8]) -> Result<Sheet, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(|c| c.trim().to_string()).collect(),
        Some(Err(e)) => return Err(SheetError::Unreadable(e.to_string())),
        None => return Err(SheetError::Empty),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SheetError::Empty);
    }

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record.map_err(|e| SheetError::Unreadable(e.to_string()))?;
        let mut cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        cells.resize(headers.len(), String::new());
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(SheetRow {
            number: i as u32 + 2,
            cells,
        });
    }

    Ok(Sheet { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_basic() {
        let csv = "title,company\nEngineer,Acme\nAnalyst,Globex\n";
        let sheet = parse_upload("jobs.csv", csv.as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["title", "company"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].number, 2);
        assert_eq!(sheet.rows[0].cells, vec!["Engineer", "Acme"]);
        assert_eq!(sheet.rows[1].number, 3);
    }

    #[test]
    fn test_csv_skips_blank_rows_but_keeps_numbering() {
        let csv = "title\nfirst\n\nthird\n";
        let sheet = parse_upload("jobs.csv", csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].number, 2);
        assert_eq!(sheet.rows[1].number, 4);
    }

    #[test]
    fn test_csv_short_rows_padded_to_header_width() {
        let csv = "title,company,location\nEngineer,Acme\n";
        let sheet = parse_upload("jobs.csv", csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows[0].cells, vec!["Engineer", "Acme", ""]);
    }

    #[test]
    fn test_empty_csv_is_fatal() {
        assert!(matches!(
            parse_upload("jobs.csv", b""),
            Err(SheetError::Empty)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            parse_upload("jobs.pdf", b"%PDF"),
            Err(SheetError::Unsupported(_))
        ));
    }

    #[test]
    fn test_garbage_xlsx_is_unreadable() {
        assert!(matches!(
            parse_upload("jobs.xlsx", b"this is not a zip archive"),
            Err(SheetError::Unreadable(_))
        ));
    }

    #[test]
    fn test_xlsx_round_trip() {
        // Write a workbook with rust_xlsxwriter, read it back through calamine.
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(DATA_SHEET).unwrap();
        sheet.write_string(0, 0, "title").unwrap();
        sheet.write_string(0, 1, "category").unwrap();
        sheet.write_string(1, 0, "Engineer").unwrap();
        sheet.write_string(1, 1, "Software").unwrap();
        sheet.write_number(2, 0, 42.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let parsed = parse_upload("upload.xlsx", &bytes).unwrap();
        assert_eq!(parsed.headers, vec!["title", "category"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].cells, vec!["Engineer", "Software"]);
        // Integral floats are rendered without a trailing ".0".
        assert_eq!(parsed.rows[1].cells[0], "42");
    }

    #[test]
    fn test_xlsx_prefers_data_sheet() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let guide = workbook.add_worksheet();
        guide.set_name("Field Guide").unwrap();
        guide.write_string(0, 0, "this sheet is documentation").unwrap();
        let data = workbook.add_worksheet();
        data.set_name(DATA_SHEET).unwrap();
        data.write_string(0, 0, "title").unwrap();
        data.write_string(1, 0, "Engineer").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let parsed = parse_upload("upload.xlsx", &bytes).unwrap();
        assert_eq!(parsed.headers, vec!["title"]);
        assert_eq!(parsed.rows.len(), 1);
    }
}
