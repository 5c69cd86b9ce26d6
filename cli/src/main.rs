//! Lico CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI wires [`lico_store`] (SQLite), [`lico_engine`] (application state) and
//! [`lico_tui`] (rendering), providing RAII-based terminal management with
//! guaranteed cleanup.
//!
//! ```text
//! main() -> ResolvedConfig -> ShoppingStore + Catalog -> App
//!        -> TerminalSession::new() -> run_app() -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! A fixed 16ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`lico_tui::InputPump`])
//! 3. Advance application state (`app.tick()`: list snapshots, due catalog lookups)
//! 4. Render frame

mod assets;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lico_config::{ResolvedConfig, data_dir};
use lico_engine::{App, ShoppingService};
use lico_store::{Catalog, ShoppingStore};
use lico_tui::{InputPump, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_lico_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_lico_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in lico_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn lico_log_file_candidates() -> Vec<PathBuf> {
    // Primary: ~/.lico/logs/lico.log
    let mut candidates = vec![data_dir().join("logs").join("lico.log")];

    // Fallback: ./.lico/logs/lico.log (useful in constrained environments)
    let local = PathBuf::from(".lico").join("logs").join("lico.log");
    if !candidates.contains(&local) {
        candidates.push(local);
    }

    candidates
}

/// The configured catalog file, or the bundled one if none is configured or it can't be opened.
///
/// The second value is a warning for the status line.
fn open_catalog(config: &ResolvedConfig) -> Result<(Catalog, Option<String>)> {
    let mut warning = None;
    if let Some(path) = &config.catalog {
        match Catalog::open_read_only(path) {
            Ok(catalog) => {
                tracing::info!(path = %path.display(), "Using configured product catalog");
                return Ok((catalog, None));
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "Falling back to bundled catalog: {err:#}");
                warning = Some(format!(
                    "No se pudo abrir el catálogo {}; se usa el catálogo incluido",
                    path.display()
                ));
            }
        }
    }

    let catalog =
        Catalog::from_seed(assets::CATALOG_SEED).context("failed to load bundled catalog")?;
    Ok((catalog, warning))
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages the terminal lifecycle including:
/// - Raw mode (disables line buffering and echo)
/// - Bracketed paste (detects pasted text vs typed input)
/// - Alternate screen
/// - Alternate scroll mode (maps scroll wheel to arrows without mouse capture)
///
/// On drop, all terminal state is restored to its original configuration,
/// ensuring the terminal remains usable even after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }
        // Enable alternate scroll mode: CSI ? 1007 h
        let _ = out.write_all(b"\x1b[?1007h");
        let _ = out.flush();

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                // Disable alternate scroll mode: CSI ? 1007 l
                let _ = out.write_all(b"\x1b[?1007l");
                let _ = out.flush();
                let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        // Disable alternate scroll mode: CSI ? 1007 l
        let _ = self.terminal.backend_mut().write_all(b"\x1b[?1007l");
        let _ = Write::flush(self.terminal.backend_mut());
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let (config, config_error) = ResolvedConfig::load();
    let store = ShoppingStore::open(&config.database).with_context(|| {
        format!(
            "failed to open shopping database at {}",
            config.database.display()
        )
    })?;
    let service = ShoppingService::new(store)?;
    let (catalog, catalog_warning) = open_catalog(&config)?;

    let mut app = App::new(service, catalog, &config);
    let config_warning = config_error
        .map(|err| format!("Configuración no válida, se usan los valores por defecto: {err}"));
    if let Some(warning) = startup_warning(config_warning, catalog_warning) {
        app.set_status_warning(warning);
    }

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = &result {
        tracing::error!("Exiting after error: {err:#}");
    }
    result
}

/// Every startup problem on one status line.
fn startup_warning(
    config_warning: Option<String>,
    catalog_warning: Option<String>,
) -> Option<String> {
    let warnings: Vec<String> = config_warning.into_iter().chain(catalog_warning).collect();
    (!warnings.is_empty()).then(|| warnings.join(" · "))
}

const FRAME_DURATION: Duration = Duration::from_millis(16);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        app.tick(Instant::now());

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
