//! Curtain demo binary.
//!
//! Bridges the readiness engine and the reveal surface over a simulated
//! asset load: the loading overlay runs until fonts and images report
//! ready (or the bounded wait expires), then fades into the content page.
//! First-time visitors see the full sequence; the persisted visit flag
//! makes every later run skip straight to the content.

mod demo;

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use curtain_engine::{
    CurtainConfig, GateSnapshot, JsonFileStore, ReadinessGate, RevealTask, driver,
};
use curtain_tui::{Glyphs, Palette, RevealSurface, draw_reveal};

const FRAME_DURATION: Duration = Duration::from_millis(8);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %path.display(), "Logging initialized");
        return;
    }

    // Without a log file, prefer "no logs" over corrupting the TUI by
    // writing to stdout.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let dir = dirs::config_dir()?.join("curtain").join("logs");
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("curtain.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    Some((path, file))
}

fn visit_store() -> JsonFileStore {
    let dir = match dirs::data_local_dir() {
        Some(dir) => dir.join("curtain"),
        None => {
            tracing::warn!("No platform data directory, keeping visit state in the working directory");
            PathBuf::from(".curtain")
        }
    };
    JsonFileStore::new(dir.join("state.json"))
}

fn reset_visit_flag(store: &JsonFileStore) -> Result<()> {
    match fs::remove_file(store.path()) {
        Ok(()) => {
            println!("Visit history cleared.");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("No visit history to clear.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_usage() {
    println!("Usage: curtain [--reset]");
    println!();
    println!("  --reset   Forget the persisted visit history and exit");
    println!("  --help    Show this message");
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut reset = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--reset" => reset = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                std::process::exit(2);
            }
        }
    }

    let store = visit_store();
    if reset {
        return reset_visit_flag(&store);
    }

    let config = match CurtainConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("Ignoring invalid config at {}: {err}", err.path().display());
            CurtainConfig::default()
        }
    };

    let gate = ReadinessGate::new(config.gate_config(), Box::new(store));
    let task = driver::spawn(gate, demo::DemoImages::begin(), demo::font_warmup());

    let mut session = TerminalSession::new()?;
    run_loop(&mut session.terminal, task, &config).await
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut task: RevealTask,
    config: &CurtainConfig,
) -> Result<()> {
    let palette = Palette::default();
    let glyphs = Glyphs::for_terminal(config.ascii_only());
    let mut reveal = RevealSurface::new(config.fade());
    let mut latest = GateSnapshot::open();

    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        frames.tick().await;

        if drain_input()? {
            return Ok(());
        }

        while let Some(snapshot) = task.try_next() {
            latest = snapshot;
            reveal.apply(snapshot);
        }

        let now = Instant::now();
        let delta = now.duration_since(last_frame);
        last_frame = now;
        if reveal.advance(delta) {
            tracing::debug!("Reveal transition complete");
        }

        terminal.draw(|frame| {
            draw_content(frame, latest, &palette);
            draw_reveal(frame, &reveal, &palette, &glyphs, "curtain");
        })?;
    }
}

// Non-blocking: drain whatever is queued, report whether to quit.
fn drain_input() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// The page behind the curtain.
fn draw_content(frame: &mut Frame, snapshot: GateSnapshot, palette: &Palette) {
    let area = frame.area();
    let backdrop = Block::default().style(Style::default().bg(palette.bg));
    frame.render_widget(backdrop, area);

    let greeting = if snapshot.is_first_visit {
        "Welcome. The surface is ready."
    } else {
        "Welcome back."
    };

    let lines = vec![
        Line::from(Span::styled(
            "curtain",
            Style::default().fg(palette.fill),
        )),
        Line::from(""),
        Line::from(Span::styled(greeting, Style::default().fg(palette.text))),
        Line::from(""),
        Line::from(Span::styled(
            "Press q to quit",
            Style::default().fg(palette.text_muted),
        )),
    ];

    let content = Paragraph::new(lines).alignment(Alignment::Center);
    let column = {
        let height = 5.min(area.height);
        let y = area.y + area.height.saturating_sub(height) / 2;
        ratatui::layout::Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        }
    };
    frame.render_widget(content, column);
}
