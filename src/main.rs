//! dealfeed: a live list of time-limited offers in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  FeedMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  feed/   │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!                           │     ▲
//!               project()   │     │ handle_key_event()
//!                      ┌────▼───┐ ┌──────────┐
//!                      │ deal/  │ │ input.rs │
//!                      └────────┘ └──────────┘
//! ```
//!
//! * **`feed/`**: the `SnapshotSource` trait, HTTP and file sources, and the
//!   scoped polling subscription.
//! * **`deal/`**: normalization, expiry maths and list projection (pure).
//! * **`locale`**: every user-facing string, per language.
//! * **`state`**: loading / ready / error state and derived badges.
//! * **`export`**: turns the on-screen list into a document.
//! * **`app`**: the session: state, selection, subscription, export jobs.
//! * **`ui`** / **`input`**: rendering and key handling.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod deal;
mod error;
mod export;
mod feed;
mod input;
mod locale;
mod state;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::App;
use config::{AppConfig, Cli};
use export::{write_document, TableDocument};
use feed::{FeedMsg, FileSource, HttpSource, SnapshotSource};
use locale::{arg, Key, LocaleTable};
use state::PresentationState;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Log to a file: stdout belongs to the UI.  `RUST_LOG` overrides the
/// default `info` level.
fn init_tracing(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_locale(config: &AppConfig) -> Result<LocaleTable> {
    let table = match &config.locale_file {
        Some(path) => LocaleTable::load(path)
            .with_context(|| format!("loading locale file {}", path.display()))?,
        None => LocaleTable::builtin(),
    };
    table.validate()?;
    Ok(table)
}

fn build_source(config: &AppConfig) -> Result<Box<dyn SnapshotSource>> {
    if let Some(path) = &config.feed.file {
        return Ok(Box::new(FileSource::new(path)));
    }
    let Some(url) = &config.feed.url else {
        bail!("no feed configured: pass --url or --file, or set feed.url in config.json");
    };
    let source = HttpSource::new(url, &config.feed.path, config.feed.request_timeout())?;
    Ok(Box::new(source))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Headless modes
// ---------------------------------------------------------------------------

/// Fetch once and project, for `--print` and `--export`.
fn fetch_once(source: &dyn SnapshotSource, state: &mut PresentationState) -> Result<()> {
    let msg = match source.fetch() {
        Ok(value) => FeedMsg::Snapshot(value),
        Err(e) => FeedMsg::Error(e.to_string()),
    };
    state.apply(msg, today());
    if let Some(cause) = state.error_cause() {
        bail!("{}: {cause}", state.error_message().unwrap_or_default());
    }
    Ok(())
}

fn print_deals(state: &PresentationState) {
    if state.deals().is_empty() {
        println!("{}", state.text(Key::EmptyList));
        return;
    }
    for deal in state.deals() {
        let badge = state.badge(deal);
        println!(
            "{:<16} {:<12} {}",
            state.badge_text(&badge),
            state.expiry_text(deal),
            deal.title
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppConfig::default_log_path);
    init_tracing(&log_path)?;

    let mut config = AppConfig::load(cli.config.as_deref());
    config.apply_cli(&cli);

    let locale = load_locale(&config)?;
    let source = build_source(&config)?;
    let mut state = PresentationState::new(locale, config.language, today());

    if cli.print || cli.export.is_some() {
        fetch_once(source.as_ref(), &mut state)?;
        if let Some(path) = &cli.export {
            let written = write_document(&TableDocument, &state.export_request(today()), path)?;
            let done = state.resolve(Key::ExportDone, &[arg("path", written.display())]);
            println!("{done}");
        }
        if cli.print {
            print_deals(&state);
        }
        return Ok(());
    }

    install_panic_hook();

    let mut app = App::new(state, Arc::new(TableDocument), config.export_dir());
    app.subscribe(source, config.feed.poll_interval());
    info!(language = config.language.code(), "session started");

    // -- terminal setup (RAII, Drop restores on exit or panic) ---------------
    let mut guard = TerminalGuard::new()?;

    // ~10 fps.  Each iteration drains the feed and export channels, renders,
    // then waits up to one tick for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.drain_feed(today());
        app.poll_export();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, today());
            }
        }

        if app.quit {
            break;
        }
    }

    app.shutdown();
    info!("session ended");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
