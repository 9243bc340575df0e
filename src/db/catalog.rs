// db/catalog.rs
// Read-only catalog introspection and full-table row fetch against MySQL.

use super::models::{Row, TableData, Value};
use crate::config;
use crate::error::{ExportError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _, TypeInfo};

/// Opens a pool capped at a single connection. The export pipeline is
/// strictly sequential and assumes one statement in flight at a time.
pub async fn connect(host: &str, user: &str, password: &str) -> Result<MySqlPool> {
    let url = config::connection_url(host, user, password);
    MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .map_err(|source| ExportError::Connection {
            host: host.to_string(),
            source,
        })
}

/// Lists every schema on the server. Filtering of system schemas is the
/// menu layer's concern, not the introspector's.
pub async fn list_schemas(pool: &MySqlPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT schema_name AS schema_name FROM information_schema.schemata ORDER BY schema_name",
    )
    .fetch_all(pool)
    .await
    .map_err(|source| ExportError::Catalog {
        schema: "information_schema".to_string(),
        source,
    })?;
    Ok(rows
        .into_iter()
        .map(|r| r.get::<String, _>("schema_name"))
        .collect())
}

/// Lists the tables of one schema, in catalog order.
pub async fn list_tables(pool: &MySqlPool, schema: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT table_name AS table_name FROM information_schema.tables \
         WHERE table_schema = ? ORDER BY table_name",
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|source| ExportError::Catalog {
        schema: schema.to_string(),
        source,
    })?;
    Ok(rows
        .into_iter()
        .map(|r| r.get::<String, _>("table_name"))
        .collect())
}

/// Lists the columns of one table ordered by ordinal position. This order is
/// authoritative: the workbook sheet and the CSV file both follow it.
pub async fn list_columns(pool: &MySqlPool, schema: &str, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT column_name AS column_name FROM information_schema.columns \
         WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|source| ExportError::Catalog {
        schema: schema.to_string(),
        source,
    })?;
    Ok(rows
        .into_iter()
        .map(|r| r.get::<String, _>("column_name"))
        .collect())
}

/// Fetches every row of one table, unfiltered and unordered, fully
/// materialized in memory. Acceptable for operational backup table sizes;
/// not suitable for very large tables.
pub async fn fetch_rows(pool: &MySqlPool, schema: &str, table: &str) -> Result<Vec<Row>> {
    let query = format!("SELECT * FROM `{}`.`{}`", schema, table);
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .await
        .map_err(|source| fetch_error(schema, table, source))?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut map = Row::with_capacity(row.columns().len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value =
                decode_value(row, idx).map_err(|source| fetch_error(schema, table, source))?;
            map.insert(column.name().to_string(), value);
        }
        out.push(map);
    }
    Ok(out)
}

/// Columns plus rows for one table in a single call.
pub async fn fetch_table(pool: &MySqlPool, schema: &str, table: &str) -> Result<TableData> {
    let columns = list_columns(pool, schema, table).await?;
    let rows = fetch_rows(pool, schema, table).await?;
    Ok(TableData { columns, rows })
}

fn fetch_error(schema: &str, table: &str, source: sqlx::Error) -> ExportError {
    ExportError::Fetch {
        schema: schema.to_string(),
        table: table.to_string(),
        source,
    }
}

/// Decodes one cell into a [`Value`] keyed on the driver's type name.
/// Types without a fixed mapping degrade to text, then to raw bytes.
fn decode_value(row: &MySqlRow, idx: usize) -> std::result::Result<Value, sqlx::Error> {
    let type_name = row.column(idx).type_info().name();
    let value = match type_name {
        "NULL" => Value::Null,
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(idx)?
            .map_or(Value::Null, |v| Value::Int(i64::from(v))),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(idx)?
            .map_or(Value::Null, Value::Int),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(idx)?
            .map_or(Value::Null, Value::UInt),
        "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(idx)?
            .map_or(Value::Null, Value::Float),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map_or(Value::Null, Value::DateTime),
        // DATE flows through the same 19-char rendering as DATETIME, at
        // midnight.
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .map_or(Value::Null, |d| Value::DateTime(d.and_time(NaiveTime::MIN))),
        "TIME" => match row.try_get::<Option<NaiveTime>, _>(idx) {
            Ok(v) => v.map_or(Value::Null, |t| Value::Text(t.format("%H:%M:%S").to_string())),
            Err(_) => fallback_text(row, idx)?,
        },
        "YEAR" | "BIT" => match row.try_get::<Option<u64>, _>(idx) {
            Ok(v) => v.map_or(Value::Null, Value::UInt),
            Err(_) => fallback_text(row, idx)?,
        },
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => row
            .try_get::<Option<String>, _>(idx)?
            .map_or(Value::Null, Value::Text),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map_or(Value::Null, Value::Bytes),
        // DECIMAL, ENUM, SET, JSON, GEOMETRY and anything the driver grows
        // later.
        _ => fallback_text(row, idx)?,
    };
    Ok(value)
}

fn fallback_text(row: &MySqlRow, idx: usize) -> std::result::Result<Value, sqlx::Error> {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return Ok(v.map_or(Value::Null, Value::Text));
    }
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .map(|v| v.map_or(Value::Null, Value::Bytes))
}
