// src/error.rs
// Error types for the table export engine.
//
// Every variant carries the identifying context (schema, table, path) an
// operator needs to diagnose a failed export without re-running.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the export engine.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Could not reach or authenticate to the database server.
    #[error("failed to connect to database at '{host}': {source}")]
    Connection {
        host: String,
        #[source]
        source: sqlx::Error,
    },

    /// A catalog metadata query (schemas, tables, columns) failed.
    #[error("catalog query failed for schema '{schema}': {source}")]
    Catalog {
        schema: String,
        #[source]
        source: sqlx::Error,
    },

    /// The row fetch for one table failed.
    #[error("row fetch failed for table '{schema}.{table}': {source}")]
    Fetch {
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    /// A worksheet for one table could not be built.
    #[error("failed to build workbook sheet for table '{table}': {source}")]
    Sheet {
        table: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// A workbook or CSV artifact could not be written to disk.
    #[error("failed to write '{}': {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The table subset passed to a selective export was invalid.
    #[error("invalid table selection: {0}")]
    Selection(#[from] SelectionError),

    /// The external raw dump utility failed.
    #[error("raw dump for schema '{schema}' failed: {message}")]
    Dump { schema: String, message: String },
}

impl ExportError {
    pub fn serialization(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ExportError::Serialization {
            path: path.into(),
            source: source.into(),
        }
    }

    /// True for errors scoped to a single table that the session-wide policy
    /// skips with a warning instead of aborting the export.
    pub fn is_per_table(&self) -> bool {
        matches!(self, ExportError::Catalog { .. } | ExportError::Fetch { .. })
    }
}

/// Rejections of the table subset passed to a selective export. Raised before
/// any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no tables were selected")]
    Empty,

    #[error("table '{0}' was selected more than once")]
    Duplicate(String),

    #[error("table '{0}' does not exist in the schema")]
    Unknown(String),
}

/// Result type alias for the export engine.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_error_converts_to_export_error() {
        let err: ExportError = SelectionError::Empty.into();
        assert!(matches!(err, ExportError::Selection(SelectionError::Empty)));
        assert!(!err.is_per_table());
    }

    #[test]
    fn per_table_errors_are_skippable() {
        let err = ExportError::Fetch {
            schema: "shop".into(),
            table: "orders".into(),
            source: sqlx::Error::RowNotFound,
        };
        assert!(err.is_per_table());
        assert!(err.to_string().contains("shop.orders"));
    }

    #[test]
    fn serialization_error_names_the_path() {
        let err = ExportError::serialization(
            "/tmp/out/shop_orders.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("shop_orders.csv"));
        assert!(!err.is_per_table());
    }
}
