// export/workbook.rs
// Spreadsheet output: one workbook per export session, one sheet per table.

use super::persist_bytes;
use crate::db::models::{Row, Value};
use crate::error::{ExportError, Result};
use crate::export::normalize::format_timestamp;
use crate::export::width::{column_width, WidthScheme, DEFAULT_COLUMN_PADDING};
use rust_xlsxwriter::{DocProperties, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Accumulates one sheet per exported table and serializes exactly once, at
/// the end of the session. Exclusively owned by the orchestrator; never
/// touched concurrently.
pub struct WorkbookBuilder {
    workbook: Workbook,
    scheme: WidthScheme,
    sheets: usize,
}

impl WorkbookBuilder {
    pub fn new(scheme: WidthScheme) -> Self {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new().set_author(env!("CARGO_PKG_NAME"));
        workbook.set_properties(&properties);
        Self {
            workbook,
            scheme,
            sheets: 0,
        }
    }

    /// Adds one sheet named after the table: header row and sized columns in
    /// catalog order, then the temporal-normalized rows in fetch order.
    /// Numbers stay native; the sheet needs no byte-level re-encoding.
    pub fn add_table_sheet(&mut self, table: &str, columns: &[String], rows: &[Row]) -> Result<()> {
        let scheme = self.scheme;
        let sheet = self.workbook.add_worksheet();
        sheet
            .set_name(sheet_name(table))
            .map_err(|source| sheet_error(table, source))?;

        for (c, column) in columns.iter().enumerate() {
            let col = c as u16;
            let width = column_width(rows, column, DEFAULT_COLUMN_PADDING, scheme);
            sheet
                .set_column_width(col, width)
                .map_err(|source| sheet_error(table, source))?;
            sheet
                .write_string(0, col, column.as_str())
                .map_err(|source| sheet_error(table, source))?;
        }

        for (r, row) in rows.iter().enumerate() {
            for (c, column) in columns.iter().enumerate() {
                if let Some(value) = row.get(column) {
                    write_value(sheet, (r + 1) as u32, c as u16, value)
                        .map_err(|source| sheet_error(table, source))?;
                }
            }
        }

        self.sheets += 1;
        Ok(())
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets
    }

    /// Serializes the whole workbook to `path`. Called once per session,
    /// after every table's sheet has been added.
    pub fn save(mut self, path: &Path) -> Result<()> {
        let bytes = self
            .workbook
            .save_to_buffer()
            .map_err(|e| ExportError::serialization(path, e))?;
        persist_bytes(path, &bytes)
    }
}

fn write_value(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> std::result::Result<(), XlsxError> {
    match value {
        Value::Null => {} // blank cell
        Value::Int(v) => {
            sheet.write_number(row, col, *v as f64)?;
        }
        Value::UInt(v) => {
            sheet.write_number(row, col, *v as f64)?;
        }
        Value::Float(v) => {
            sheet.write_number(row, col, *v)?;
        }
        Value::Text(v) => {
            sheet.write_string(row, col, v.as_str())?;
        }
        Value::Bytes(v) => {
            sheet.write_string(row, col, String::from_utf8_lossy(v))?;
        }
        Value::DateTime(dt) => {
            sheet.write_string(row, col, format_timestamp(dt))?;
        }
    }
    Ok(())
}

fn sheet_error(table: &str, source: XlsxError) -> ExportError {
    ExportError::Sheet {
        table: table.to_string(),
        source,
    }
}

/// XLSX sheet names are capped at 31 characters and reject a handful of
/// punctuation characters; table names are sanitized rather than refused.
fn sheet_name(table: &str) -> String {
    table
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(31)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Row;

    fn order_row(id: i64, name: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(id));
        row.insert("name".to_string(), Value::Text(name.to_string()));
        row
    }

    #[test]
    fn sheet_names_are_sanitized_and_capped() {
        assert_eq!(sheet_name("orders"), "orders");
        assert_eq!(sheet_name("bad/name?"), "bad_name_");
        assert_eq!(sheet_name(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn workbook_saves_once_with_all_sheets() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let mut builder = WorkbookBuilder::new(WidthScheme::Weighted);
        builder
            .add_table_sheet("orders", &columns, &[order_row(1, "Alice")])
            .unwrap();
        builder
            .add_table_sheet("customers", &columns, &[order_row(2, "Bob")])
            .unwrap();
        assert_eq!(builder.sheet_count(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_all_tables.xlsx");
        builder.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_table_still_gets_a_header_sheet() {
        let columns = vec!["id".to_string()];
        let mut builder = WorkbookBuilder::new(WidthScheme::Weighted);
        builder.add_table_sheet("empty", &columns, &[]).unwrap();
        assert_eq!(builder.sheet_count(), 1);
    }
}
