// export/exporter.rs
// Session orchestration: enumerate tables, stream rows, hand them to the
// workbook and CSV writers, trigger the raw dump side channel.

use crate::db::catalog;
use crate::db::models::Row;
use crate::error::{ExportError, Result, SelectionError};
use crate::export::csv::{write_csv_file, CsvDocument};
use crate::export::dump::RawDumper;
use crate::export::normalize::{normalize_encoding, normalize_temporal};
use crate::export::width::WidthScheme;
use crate::export::workbook::WorkbookBuilder;
use sqlx::mysql::MySqlPool;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Which entry point produced an artifact. Selective exports carry a
/// `-selected` discriminator in every filename so the two modes never
/// overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    All,
    Selected,
}

impl ExportMode {
    pub fn workbook_filename(self, schema: &str) -> String {
        match self {
            ExportMode::All => format!("{}_all_tables.xlsx", schema),
            ExportMode::Selected => format!("{}_selected_tables.xlsx", schema),
        }
    }

    pub fn csv_filename(self, schema: &str, table: &str) -> String {
        match self {
            ExportMode::All => format!("{}_{}.csv", schema, table),
            ExportMode::Selected => format!("{}_{}_selected.csv", schema, table),
        }
    }
}

pub fn dump_filename(schema: &str) -> String {
    format!("{}_output.sql", schema)
}

/// What one export session produced. Skipped tables and dump failures are
/// warnings here, not errors: the caller decides how loudly to report them.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub workbook_path: PathBuf,
    pub csv_paths: Vec<PathBuf>,
    pub dump_path: Option<PathBuf>,
    pub skipped: Vec<SkippedTable>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// One export session: connection, target schema, output directory and width
/// strategy, owned for the duration of a single `export_all` or
/// `export_selected` call. Tables are processed strictly sequentially; the
/// workbook accumulator is serialized exactly once at the end.
pub struct ExportSession<'a> {
    pool: &'a MySqlPool,
    schema: String,
    output_dir: PathBuf,
    scheme: WidthScheme,
    dumper: Option<&'a dyn RawDumper>,
}

impl<'a> ExportSession<'a> {
    pub fn new(
        pool: &'a MySqlPool,
        schema: impl Into<String>,
        output_root: impl AsRef<Path>,
        scheme: WidthScheme,
    ) -> Self {
        let schema = schema.into();
        let output_dir = output_root.as_ref().join("output").join(&schema);
        Self {
            pool,
            schema,
            output_dir,
            scheme,
            dumper: None,
        }
    }

    pub fn with_dumper(mut self, dumper: &'a dyn RawDumper) -> Self {
        self.dumper = Some(dumper);
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// `<output-root>/output/<schema>/`, created on demand, never deleted.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Exports every table of the schema.
    pub async fn export_all(&self) -> Result<ExportReport> {
        let tables = catalog::list_tables(self.pool, &self.schema).await?;
        self.export_tables(&tables, ExportMode::All).await
    }

    /// Exports an explicit subset. The subset is validated (non-empty, no
    /// duplicates, every name present in the schema) before any file is
    /// touched.
    pub async fn export_selected(&self, tables: &[String]) -> Result<ExportReport> {
        validate_selection(tables)?;
        let known = catalog::list_tables(self.pool, &self.schema).await?;
        for table in tables {
            if !known.contains(table) {
                return Err(SelectionError::Unknown(table.clone()).into());
            }
        }
        self.export_tables(tables, ExportMode::Selected).await
    }

    async fn export_tables(&self, tables: &[String], mode: ExportMode) -> Result<ExportReport> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ExportError::serialization(&self.output_dir, e))?;
        let mut report = ExportReport::default();

        if let Some(dumper) = self.dumper {
            let dump_path = self.output_dir.join(dump_filename(&self.schema));
            match dumper.run(&self.schema, &dump_path).await {
                Ok(()) => report.dump_path = Some(dump_path),
                // The dump is a side artifact; its failure never blocks the
                // per-table export.
                Err(err) => report.warnings.push(err.to_string()),
            }
        }

        let mut workbook = WorkbookBuilder::new(self.scheme);
        for table in tables {
            match self.export_table(&mut workbook, table, mode).await {
                Ok(csv_path) => report.csv_paths.push(csv_path),
                Err(err) if err.is_per_table() => {
                    // Skip-and-continue policy: the failing table gets
                    // neither a sheet nor a CSV file, the rest of the
                    // session proceeds.
                    report.skipped.push(SkippedTable {
                        table: table.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let workbook_path = self.output_dir.join(mode.workbook_filename(&self.schema));
        workbook.save(&workbook_path)?;
        report.workbook_path = workbook_path;
        Ok(report)
    }

    async fn export_table(
        &self,
        workbook: &mut WorkbookBuilder,
        table: &str,
        mode: ExportMode,
    ) -> Result<PathBuf> {
        let data = catalog::fetch_table(self.pool, &self.schema, table).await?;
        let normalized: Vec<Row> = data.rows.into_iter().map(normalize_temporal).collect();

        workbook.add_table_sheet(table, &data.columns, &normalized)?;

        let encoded: Vec<Row> = normalized.into_iter().map(normalize_encoding).collect();
        let mut document = CsvDocument::new(&data.columns);
        document.add_rows(&encoded);
        let csv_path = self
            .output_dir
            .join(mode.csv_filename(&self.schema, table));
        write_csv_file(&document, &csv_path)?;
        Ok(csv_path)
    }
}

fn validate_selection(tables: &[String]) -> Result<()> {
    if tables.is_empty() {
        return Err(SelectionError::Empty.into());
    }
    let mut seen = HashSet::new();
    for table in tables {
        if !seen.insert(table.as_str()) {
            return Err(SelectionError::Duplicate(table.clone()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::mysql::MySqlPoolOptions;

    #[test]
    fn all_and_selected_paths_are_disjoint() {
        let all = ExportMode::All;
        let selected = ExportMode::Selected;
        assert_eq!(all.csv_filename("shop", "orders"), "shop_orders.csv");
        assert_eq!(
            selected.csv_filename("shop", "orders"),
            "shop_orders_selected.csv"
        );
        assert_eq!(all.workbook_filename("shop"), "shop_all_tables.xlsx");
        assert_eq!(
            selected.workbook_filename("shop"),
            "shop_selected_tables.xlsx"
        );
        assert_eq!(dump_filename("shop"), "shop_output.sql");
    }

    #[test]
    fn selection_validation_rejects_empty_and_duplicates() {
        assert!(matches!(
            validate_selection(&[]),
            Err(ExportError::Selection(SelectionError::Empty))
        ));
        let dup = vec!["orders".to_string(), "orders".to_string()];
        assert!(matches!(
            validate_selection(&dup),
            Err(ExportError::Selection(SelectionError::Duplicate(t))) if t == "orders"
        ));
        let ok = vec!["orders".to_string(), "customers".to_string()];
        assert!(validate_selection(&ok).is_ok());
    }

    #[tokio::test]
    async fn output_dir_derives_from_root_and_schema() {
        let pool = MySqlPoolOptions::new()
            .connect_lazy("mysql://user:pw@localhost")
            .unwrap();
        let session = ExportSession::new(&pool, "shop", "/backups", WidthScheme::Weighted);
        assert_eq!(session.output_dir(), Path::new("/backups/output/shop"));
        assert_eq!(session.schema(), "shop");
    }

    #[tokio::test]
    async fn empty_selection_fails_before_any_filesystem_write() {
        let dir = tempfile::tempdir().unwrap();
        let pool = MySqlPoolOptions::new()
            .connect_lazy("mysql://user:pw@localhost")
            .unwrap();
        let session = ExportSession::new(&pool, "shop", dir.path(), WidthScheme::Weighted);

        let err = session.export_selected(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::Selection(SelectionError::Empty)
        ));
        assert!(!dir.path().join("output").exists());
    }
}
