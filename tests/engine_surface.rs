// End-to-end checks over the library surface that need no live server:
// document construction, normalization, sizing and path derivation.

use chrono::NaiveDate;
use db_table_exporter::db::models::{Row, Value};
use db_table_exporter::export::csv::CsvDocument;
use db_table_exporter::export::exporter::{ExportMode, ExportSession};
use db_table_exporter::export::normalize::{normalize_encoding, normalize_temporal};
use db_table_exporter::export::width::{column_width, text_width, WidthScheme};
use sqlx::mysql::MySqlPoolOptions;

fn orders_columns() -> Vec<String> {
    vec!["id".to_string(), "name".to_string(), "created_at".to_string()]
}

fn orders_rows() -> Vec<Row> {
    let t1 = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let t2 = NaiveDate::from_ymd_opt(2024, 5, 2)
        .unwrap()
        .and_hms_opt(18, 30, 59)
        .unwrap();
    let mut r1 = Row::new();
    r1.insert("id".to_string(), Value::Int(1));
    r1.insert("name".to_string(), Value::Text("Alice".to_string()));
    r1.insert("created_at".to_string(), Value::DateTime(t1));
    let mut r2 = Row::new();
    r2.insert("id".to_string(), Value::Int(2));
    r2.insert("name".to_string(), Value::Text("Bob".to_string()));
    r2.insert("created_at".to_string(), Value::DateTime(t2));
    vec![r1, r2]
}

fn build_csv(columns: &[String], rows: Vec<Row>) -> Vec<u8> {
    let normalized: Vec<Row> = rows
        .into_iter()
        .map(normalize_temporal)
        .map(normalize_encoding)
        .collect();
    let mut document = CsvDocument::new(columns);
    document.add_rows(&normalized);
    document.to_bytes().unwrap()
}

#[test]
fn csv_round_trip_bom_header_and_timestamps() {
    let bytes = build_csv(&orders_columns(), orders_rows());

    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    let text = std::str::from_utf8(&bytes[3..]).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "id,name,created_at");
    assert_eq!(lines[1], "1,Alice,2024-05-01 09:00:00");
    assert_eq!(lines[2], "2,Bob,2024-05-02 18:30:59");
}

#[test]
fn repeated_export_of_unchanged_rows_is_byte_identical() {
    let first = build_csv(&orders_columns(), orders_rows());
    let second = build_csv(&orders_columns(), orders_rows());
    assert_eq!(first, second);
}

#[test]
fn all_and_selected_exports_never_share_paths() {
    let all_csv = ExportMode::All.csv_filename("shop", "orders");
    let selected_csv = ExportMode::Selected.csv_filename("shop", "orders");
    assert_eq!(all_csv, "shop_orders.csv");
    assert_eq!(selected_csv, "shop_orders_selected.csv");
    assert_ne!(all_csv, selected_csv);
    assert_ne!(
        ExportMode::All.workbook_filename("shop"),
        ExportMode::Selected.workbook_filename("shop")
    );
}

#[test]
fn width_properties_hold_for_ascii_and_wide_text() {
    let scheme = WidthScheme::Weighted;
    for s in ["orders2024", "abc", "x9"] {
        assert_eq!(text_width(s, scheme), s.len() as f64);
    }
    assert!((text_width("주문내역", scheme) - 4.0 * 1.8).abs() < 1e-9);

    // header + padding is a floor no row contents can undercut
    let rows = orders_rows();
    for column in orders_columns() {
        assert!(column_width(&rows, &column, 2.0, scheme) >= column.len() as f64 + 2.0);
    }
}

#[tokio::test]
async fn empty_selection_is_rejected_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let pool = MySqlPoolOptions::new()
        .connect_lazy("mysql://user:pw@localhost")
        .unwrap();
    let session = ExportSession::new(&pool, "shop", dir.path(), WidthScheme::Weighted);

    assert!(session.export_selected(&[]).await.is_err());
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
