// app/tui.rs
// Terminal User Interface logic and state

use crate::config::Config;
use crate::db::catalog;
use crossterm::event::{self, Event, KeyCode};
use ratatui::prelude::*;
use ratatui::widgets::*;
use sqlx::mysql::MySqlPool;
use std::io;
use std::path::PathBuf;
pub use super::tui_export::tui_export_flow;

/// Schemas hidden from the selection menu. The catalog introspector filters
/// nothing; the exclusion lives here, in the menu layer.
pub const SYSTEM_SCHEMAS: [&str; 5] = [
    "information_schema",
    "mysql",
    "performance_schema",
    "sys",
    "test",
];

pub enum TuiStep {
    Welcome,
    EnterHost,
    EnterUsername,
    EnterPassword,
    ChooseSchema,
    ChooseMode,
    SelectTables,
    Confirm,
    Progress,
    Done(String),
}

pub struct TuiState {
    pub step: TuiStep,
    pub host: String,
    pub username: String,
    pub password: String,
    pub input_buffer: String,
    pub status: String,
    pub pool: Option<MySqlPool>,
    pub schemas: Vec<String>,
    pub schema_index: usize,
    pub schema: String,
    pub modes: Vec<&'static str>,
    pub mode_index: usize,
    pub tables: Vec<String>,
    pub table_cursor: usize,
    pub table_checked: Vec<bool>,
    pub output_root: PathBuf,
}

impl Default for TuiState {
    fn default() -> Self {
        let config = Config::from_env();
        Self {
            step: TuiStep::Welcome,
            host: String::new(),
            username: String::new(),
            password: String::new(),
            input_buffer: config.host.clone().unwrap_or_default(),
            status: String::new(),
            pool: None,
            schemas: Vec::new(),
            schema_index: 0,
            schema: String::new(),
            modes: vec![
                "Export all tables (xlsx, csv, sql)",
                "Export selected tables (xlsx, csv, sql)",
                "Choose another schema",
                "Quit",
            ],
            mode_index: 0,
            tables: Vec::new(),
            table_cursor: 0,
            table_checked: Vec::new(),
            output_root: config.output_root,
        }
    }
}

pub async fn run_tui() -> io::Result<()> {
    // Clear the terminal before starting TUI
    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        crossterm::cursor::MoveTo(0, 0)
    )?;
    crossterm::terminal::enable_raw_mode()?;
    let result = run_loop().await;
    crossterm::terminal::disable_raw_mode()?;
    result
}

async fn run_loop() -> io::Result<()> {
    let mut stdout = io::stdout();
    let backend = ratatui::backend::CrosstermBackend::new(&mut stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut state = TuiState::default();

    loop {
        terminal.draw(|f| {
            let size = f.size();
            match &state.step {
                TuiStep::Welcome => {
                    let title = format!("db-table-exporter v{}", env!("CARGO_PKG_VERSION"));
                    let block = Block::default().title(title).borders(Borders::ALL);
                    let text =
                        Paragraph::new("Welcome! Press any key to begin.").block(block);
                    f.render_widget(text, size);
                }
                TuiStep::EnterHost => {
                    render_input(f, size, "Enter Host (e.g. localhost or db:3306)", &state.input_buffer, &state.status);
                }
                TuiStep::EnterUsername => {
                    render_input(f, size, "Enter Username", &state.input_buffer, &state.status);
                }
                TuiStep::EnterPassword => {
                    let hidden = "*".repeat(state.input_buffer.len());
                    render_input(f, size, "Enter Password (hidden)", &hidden, &state.status);
                }
                TuiStep::ChooseSchema => {
                    let items: Vec<ListItem> = state
                        .schemas
                        .iter()
                        .enumerate()
                        .map(|(i, schema)| {
                            let style = if i == state.schema_index {
                                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            };
                            ListItem::new(schema.as_str()).style(style)
                        })
                        .collect();
                    let list = List::new(items).block(
                        Block::default()
                            .title("Select Schema to Back Up (↑/↓, Enter)")
                            .borders(Borders::ALL),
                    );
                    f.render_widget(list, size);
                }
                TuiStep::ChooseMode => {
                    let items: Vec<ListItem> = state
                        .modes
                        .iter()
                        .enumerate()
                        .map(|(i, &mode)| {
                            let style = if i == state.mode_index {
                                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            };
                            ListItem::new(mode).style(style)
                        })
                        .collect();
                    let list = List::new(items).block(
                        Block::default()
                            .title(format!("Schema '{}': choose an action", state.schema))
                            .borders(Borders::ALL),
                    );
                    f.render_widget(list, size);
                }
                TuiStep::SelectTables => {
                    let items: Vec<ListItem> = state
                        .tables
                        .iter()
                        .enumerate()
                        .map(|(i, table)| {
                            let mark = if state.table_checked[i] { "[x]" } else { "[ ]" };
                            let style = if i == state.table_cursor {
                                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            };
                            ListItem::new(format!("{} {}", mark, table)).style(style)
                        })
                        .collect();
                    let list = List::new(items).block(
                        Block::default()
                            .title("Select Tables (Space toggles, a = all, Enter confirms)")
                            .borders(Borders::ALL),
                    );
                    f.render_widget(list, size);
                }
                TuiStep::Confirm => {
                    let selection = if state.mode_index == 1 {
                        let picked = state.table_checked.iter().filter(|c| **c).count();
                        format!("{} selected tables", picked)
                    } else {
                        "all tables".to_string()
                    };
                    let block = Block::default().title("Confirm").borders(Borders::ALL);
                    let text = Paragraph::new(format!(
                        "Host: {}\nUser: {}\nSchema: {}\nExport: {}\nOutput: {}\nPress Enter to Export, Esc to Cancel",
                        state.host,
                        state.username,
                        state.schema,
                        selection,
                        state.output_root.join("output").join(&state.schema).display(),
                    ))
                    .block(block);
                    f.render_widget(text, size);
                }
                TuiStep::Progress => {
                    let block = Block::default().title("Exporting...").borders(Borders::ALL);
                    let text = Paragraph::new("Please wait...").block(block);
                    f.render_widget(text, size);
                }
                TuiStep::Done(msg) => {
                    let block = Block::default().title("Done").borders(Borders::ALL);
                    let text = Paragraph::new(msg.clone()).block(block);
                    f.render_widget(text, size);
                }
            }
        })?;

        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match &mut state.step {
                    TuiStep::Welcome => {
                        state.step = TuiStep::EnterHost;
                    }
                    TuiStep::EnterHost => match key.code {
                        KeyCode::Enter => {
                            if !state.input_buffer.is_empty() {
                                state.host = state.input_buffer.clone();
                                state.step = TuiStep::EnterUsername;
                                state.input_buffer =
                                    Config::from_env().user.unwrap_or_default();
                                state.status.clear();
                            }
                        }
                        KeyCode::Char(c) => state.input_buffer.push(c),
                        KeyCode::Backspace => {
                            state.input_buffer.pop();
                        }
                        KeyCode::Esc => return Ok(()),
                        _ => {}
                    },
                    TuiStep::EnterUsername => match key.code {
                        KeyCode::Enter => {
                            if !state.input_buffer.is_empty() {
                                state.username = state.input_buffer.clone();
                                state.step = TuiStep::EnterPassword;
                                state.input_buffer =
                                    Config::from_env().password.unwrap_or_default();
                                state.status.clear();
                            }
                        }
                        KeyCode::Char(c) => state.input_buffer.push(c),
                        KeyCode::Backspace => {
                            state.input_buffer.pop();
                        }
                        KeyCode::Esc => {
                            state.step = TuiStep::EnterHost;
                            state.input_buffer = state.host.clone();
                        }
                        _ => {}
                    },
                    TuiStep::EnterPassword => match key.code {
                        KeyCode::Enter => {
                            state.password = state.input_buffer.clone();
                            state.input_buffer.clear();
                            match connect_and_list_schemas(&state).await {
                                Ok((pool, schemas)) => {
                                    state.pool = Some(pool);
                                    state.schemas = schemas;
                                    state.schema_index = 0;
                                    state.status.clear();
                                    state.step = TuiStep::ChooseSchema;
                                }
                                Err(e) => {
                                    state.status = format!("Connection failed: {}", e);
                                    state.step = TuiStep::EnterUsername;
                                    state.input_buffer = state.username.clone();
                                }
                            }
                        }
                        KeyCode::Char(c) => state.input_buffer.push(c),
                        KeyCode::Backspace => {
                            state.input_buffer.pop();
                        }
                        KeyCode::Esc => {
                            state.step = TuiStep::EnterUsername;
                            state.input_buffer = state.username.clone();
                        }
                        _ => {}
                    },
                    TuiStep::ChooseSchema => match key.code {
                        KeyCode::Up => {
                            if state.schema_index > 0 {
                                state.schema_index -= 1;
                            }
                        }
                        KeyCode::Down => {
                            if state.schema_index + 1 < state.schemas.len() {
                                state.schema_index += 1;
                            }
                        }
                        KeyCode::Enter => {
                            if let Some(schema) = state.schemas.get(state.schema_index) {
                                state.schema = schema.clone();
                                state.mode_index = 0;
                                state.step = TuiStep::ChooseMode;
                            }
                        }
                        KeyCode::Esc => {
                            state.step = TuiStep::EnterPassword;
                            state.input_buffer.clear();
                        }
                        _ => {}
                    },
                    TuiStep::ChooseMode => match key.code {
                        KeyCode::Up => {
                            if state.mode_index > 0 {
                                state.mode_index -= 1;
                            }
                        }
                        KeyCode::Down => {
                            if state.mode_index + 1 < state.modes.len() {
                                state.mode_index += 1;
                            }
                        }
                        KeyCode::Enter => match state.mode_index {
                            0 => state.step = TuiStep::Confirm,
                            1 => match &state.pool {
                                Some(pool) => match catalog::list_tables(pool, &state.schema).await
                                {
                                    Ok(tables) => {
                                        state.table_checked = vec![false; tables.len()];
                                        state.tables = tables;
                                        state.table_cursor = 0;
                                        state.step = TuiStep::SelectTables;
                                    }
                                    Err(e) => {
                                        state.step =
                                            TuiStep::Done(format!("Export failed: {}", e));
                                    }
                                },
                                None => {
                                    state.step = TuiStep::EnterHost;
                                    state.input_buffer = state.host.clone();
                                }
                            },
                            2 => state.step = TuiStep::ChooseSchema,
                            _ => return Ok(()),
                        },
                        KeyCode::Esc => {
                            state.step = TuiStep::ChooseSchema;
                        }
                        _ => {}
                    },
                    TuiStep::SelectTables => match key.code {
                        KeyCode::Up => {
                            if state.table_cursor > 0 {
                                state.table_cursor -= 1;
                            }
                        }
                        KeyCode::Down => {
                            if state.table_cursor + 1 < state.tables.len() {
                                state.table_cursor += 1;
                            }
                        }
                        KeyCode::Char(' ') => {
                            if let Some(checked) = state.table_checked.get_mut(state.table_cursor) {
                                *checked = !*checked;
                            }
                        }
                        KeyCode::Char('a') => {
                            let all = state.table_checked.iter().all(|c| *c);
                            for checked in state.table_checked.iter_mut() {
                                *checked = !all;
                            }
                        }
                        KeyCode::Enter => {
                            if state.table_checked.iter().any(|c| *c) {
                                state.step = TuiStep::Confirm;
                            }
                        }
                        KeyCode::Esc => {
                            state.step = TuiStep::ChooseMode;
                        }
                        _ => {}
                    },
                    TuiStep::Confirm => match key.code {
                        KeyCode::Enter => {
                            state.step = TuiStep::Progress;
                            terminal.draw(|f| {
                                let block =
                                    Block::default().title("Exporting...").borders(Borders::ALL);
                                let text = Paragraph::new("Please wait...").block(block);
                                f.render_widget(text, f.size());
                            })?;
                            match tui_export_flow(&state).await {
                                Ok(msg) => {
                                    state.step = TuiStep::Done(msg);
                                }
                                Err(e) => {
                                    state.step = TuiStep::Done(format!("Export failed: {}", e));
                                }
                            }
                        }
                        KeyCode::Esc => {
                            state.step = TuiStep::ChooseMode;
                        }
                        _ => {}
                    },
                    TuiStep::Done(_) => match key.code {
                        KeyCode::Esc | KeyCode::Enter => return Ok(()),
                        _ => {}
                    },
                    TuiStep::Progress => {}
                }
            }
        }
    }
}

fn render_input(f: &mut Frame, size: Rect, title: &str, value: &str, status: &str) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let body = if status.is_empty() {
        value.to_string()
    } else {
        format!("{}\n{}", value, status)
    };
    let text = Paragraph::new(body).block(block);
    f.render_widget(text, size);
}

async fn connect_and_list_schemas(
    state: &TuiState,
) -> crate::error::Result<(MySqlPool, Vec<String>)> {
    let pool = catalog::connect(&state.host, &state.username, &state.password).await?;
    let schemas = catalog::list_schemas(&pool)
        .await?
        .into_iter()
        .filter(|schema| !SYSTEM_SCHEMAS.contains(&schema.as_str()))
        .collect();
    Ok((pool, schemas))
}
