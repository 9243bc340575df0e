use crate::export::dump::MysqldumpRunner;
use crate::export::exporter::ExportSession;
use crate::export::width::WidthScheme;
use anyhow::{anyhow, Result};

/// Orchestrates the export flow for the TUI, reusing the same engine the
/// direct CLI mode drives. Returns Ok(msg) on success, or Err(error) with
/// context on failure.
pub async fn tui_export_flow(state: &super::tui::TuiState) -> Result<String> {
    let pool = state
        .pool
        .as_ref()
        .ok_or_else(|| anyhow!("no database connection"))?;

    let dumper = MysqldumpRunner::new(&state.host, &state.username, &state.password);
    let session = ExportSession::new(
        pool,
        state.schema.as_str(),
        &state.output_root,
        WidthScheme::default(),
    )
    .with_dumper(&dumper);

    let report = if state.mode_index == 1 {
        let selected: Vec<String> = state
            .tables
            .iter()
            .zip(&state.table_checked)
            .filter(|(_, checked)| **checked)
            .map(|(table, _)| table.clone())
            .collect();
        session.export_selected(&selected).await?
    } else {
        session.export_all().await?
    };

    let mut message = format!(
        "Exported {} tables to {}",
        report.csv_paths.len(),
        session.output_dir().display()
    );
    if !report.skipped.is_empty() {
        message.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    for warning in &report.warnings {
        message.push_str(&format!("\nWarning: {}", warning));
    }
    Ok(message)
}
