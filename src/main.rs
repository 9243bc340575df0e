// src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use db_table_exporter::app::tui::run_tui;
use db_table_exporter::config::Config;
use db_table_exporter::db::catalog;
use db_table_exporter::export::dump::MysqldumpRunner;
use db_table_exporter::export::exporter::ExportSession;
use db_table_exporter::export::width::WidthScheme;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    schema: Option<String>,
    /// Comma-separated table subset; exports the whole schema when omitted
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Size workbook columns with the 2.0/0.5 multipliers of earlier releases
    #[arg(long, default_value_t = false)]
    legacy_widths: bool,
    /// Skip the mysqldump side artifact
    #[arg(long, default_value_t = false)]
    no_dump: bool,
    #[arg(long, default_value_t = false)]
    tui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.tui {
        run_tui().await?;
        return Ok(());
    }

    let config = Config::from_env();
    let host = args
        .host
        .or(config.host)
        .ok_or_else(|| anyhow!("Missing --host (or DB_HOST)"))?;
    let user = args
        .user
        .or(config.user)
        .ok_or_else(|| anyhow!("Missing --user (or DB_USER)"))?;
    let password = args
        .password
        .or(config.password)
        .ok_or_else(|| anyhow!("Missing --password (or DB_PW)"))?;
    let schema = args.schema.ok_or_else(|| anyhow!("Missing --schema"))?;
    let output_root = args.output_dir.unwrap_or(config.output_root);
    let scheme = if args.legacy_widths {
        WidthScheme::Legacy
    } else {
        WidthScheme::Weighted
    };

    println!("--- Database Table Export ---");
    println!("Host: {}", host);
    println!("Connection: [REDACTED]");
    println!("Schema: {}", schema);
    println!("Output Root: {}", output_root.display());
    println!("-----------------------------");

    let pool = catalog::connect(&host, &user, &password).await?;
    println!("✨ Connected.");

    let dumper = MysqldumpRunner::new(&host, &user, &password);
    let mut session = ExportSession::new(&pool, schema.as_str(), &output_root, scheme);
    if !args.no_dump {
        session = session.with_dumper(&dumper);
    }

    let report = if args.tables.is_empty() {
        session.export_all().await?
    } else {
        session.export_selected(&args.tables).await?
    };

    for warning in &report.warnings {
        println!("⚠️ {}", warning);
    }
    for skipped in &report.skipped {
        println!("⚠️ skipped table '{}': {}", skipped.table, skipped.reason);
    }
    if let Some(dump_path) = &report.dump_path {
        println!("✨ SQL dump saved: {}", dump_path.display());
    }
    for path in &report.csv_paths {
        println!("✨ CSV saved: {}", path.display());
    }
    println!("✨ Workbook saved: {}", report.workbook_path.display());
    println!("-----------------------------");
    println!("Export completed successfully!");
    Ok(())
}
