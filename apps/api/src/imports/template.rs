//! Import template generation: a workbook with a field-guide sheet and an
//! empty data sheet whose header row matches the column specs exactly, so a
//! filled-in template parses cleanly back through the ingest path.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use crate::imports::sheet::DATA_SHEET;
use crate::imports::ImportKind;

pub fn build_template(kind: ImportKind) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let guide = workbook.add_worksheet();
    guide.set_name("Field Guide").context("set sheet name")?;
    for (col, title) in ["field", "required", "description", "example"]
        .iter()
        .enumerate()
    {
        guide.write_string_with_format(0, col as u16, *title, &header_format)?;
        guide.set_column_width(col as u16, 28)?;
    }
    for (row, spec) in kind.columns().iter().enumerate() {
        let row = row as u32 + 1;
        guide.write_string(row, 0, spec.name)?;
        guide.write_string(row, 1, if spec.required { "yes" } else { "no" })?;
        guide.write_string(row, 2, spec.description)?;
        guide.write_string(row, 3, spec.example)?;
    }

    let data = workbook.add_worksheet();
    data.set_name(DATA_SHEET).context("set sheet name")?;
    for (col, spec) in kind.columns().iter().enumerate() {
        data.write_string_with_format(0, col as u16, spec.name, &header_format)?;
        data.set_column_width(col as u16, 22)?;
    }

    workbook
        .save_to_buffer()
        .context("serialize template workbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::sheet::parse_upload;

    #[test]
    fn test_template_parses_back_through_ingest() {
        for kind in [ImportKind::Jobs, ImportKind::Careers] {
            let bytes = build_template(kind).unwrap();
            let sheet = parse_upload(kind.template_filename(), &bytes).unwrap();
            let expected: Vec<&str> = kind.columns().iter().map(|c| c.name).collect();
            assert_eq!(sheet.headers, expected);
            assert!(sheet.rows.is_empty());
        }
    }

    #[test]
    fn test_template_has_no_missing_columns() {
        let bytes = build_template(ImportKind::Careers).unwrap();
        let sheet = parse_upload("template.xlsx", &bytes).unwrap();
        assert!(crate::imports::validate::missing_columns(ImportKind::Careers, &sheet).is_empty());
    }

    #[test]
    fn test_template_survives_disk_round_trip() {
        // Same path a user takes: download to disk, fill in, re-upload.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        std::fs::write(&path, build_template(ImportKind::Jobs).unwrap()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let sheet = parse_upload("template.xlsx", &bytes).unwrap();
        assert_eq!(sheet.headers[0], "title");
    }
}
