// export/csv.rs
// Delimited-text output: one BOM-prefixed UTF-8 file per exported table.

use super::persist_bytes;
use crate::db::models::{Row, Value};
use crate::error::{ExportError, Result};
use crate::export::normalize::format_timestamp;
use std::path::Path;

/// UTF-8 byte-order-mark. Spreadsheet readers use it to detect the encoding;
/// without it they fall back to a locale codepage and mangle non-ASCII text.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// One table's delimited-text document: header row from the column order,
/// data rows in fetch order.
#[derive(Debug, Clone)]
pub struct CsvDocument {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CsvDocument {
    pub fn new(columns: &[String]) -> Self {
        Self {
            columns: columns.to_vec(),
            records: Vec::new(),
        }
    }

    /// Appends rows, rendering each field in column order. Rows are expected
    /// to be temporal- and encoding-normalized already; stray values of
    /// other shapes still render sensibly.
    pub fn add_rows(&mut self, rows: &[Row]) {
        for row in rows {
            let record = self
                .columns
                .iter()
                .map(|column| field_text(row.get(column)))
                .collect();
            self.records.push(record);
        }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Serializes the document and prepends the byte-order-mark.
    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;
        let body = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
        bytes.extend_from_slice(&UTF8_BOM);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

/// Writes one table's document to its per-table file.
pub fn write_csv_file(document: &CsvDocument, path: &Path) -> Result<()> {
    let bytes = document
        .to_bytes()
        .map_err(|e| ExportError::serialization(path, e))?;
    persist_bytes(path, &bytes)
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Int(v)) => v.to_string(),
        Some(Value::UInt(v)) => v.to_string(),
        Some(Value::Float(v)) => v.to_string(),
        Some(Value::Text(v)) => v.clone(),
        Some(Value::Bytes(v)) => String::from_utf8_lossy(v).into_owned(),
        Some(Value::DateTime(dt)) => format_timestamp(dt),
    }
}
