// db/models.rs
// Data structures for table contents flowing from the driver to the writers.

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// One scalar cell as returned by the driver.
///
/// `Bytes` holds values the driver could not hand over as valid UTF-8 text
/// (BLOB columns, mis-declared charsets); the CSV path re-encodes them, the
/// workbook path renders them lossily.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// One fetched row: column name to scalar value. Column order lives in
/// [`TableData::columns`], not here.
pub type Row = HashMap<String, Value>;

/// The full contents of one table, columns in catalog ordinal order and rows
/// in fetch order. Both orders are preserved in every output format.
#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}
