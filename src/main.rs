//! Stagewatch CLI
//!
//! Terminal dashboard for a live pipeline-state event stream.

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stagewatch::config::{generate_default_config, Config, LoggingConfig};
use stagewatch::render::{Board, DashboardRenderer};
use stagewatch::source::{SnapshotSource, SseSource, Subscription};
use stagewatch::tui::{self, StatusLine};
use stagewatch::Snapshot;

#[derive(Parser)]
#[command(name = "stagewatch", version, about = "Live pipeline dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to an event stream and show the dashboard
    Watch(WatchArgs),
    /// Print the default configuration file
    Config,
}

#[derive(Args)]
struct WatchArgs {
    /// Event stream endpoint (overrides config and STAGEWATCH_URL)
    #[arg(long)]
    url: Option<String>,

    /// Configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Print rendered snapshots as plain lines instead of drawing a terminal UI
    #[arg(long)]
    plain: bool,
}

type Renderer = DashboardRenderer<Board>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config => {
            print!("{}", generate_default_config());
            Ok(())
        }
        Command::Watch(args) => watch(args).await,
    }
}

async fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = args.url {
        config.source.url = url;
    }

    init_logging(&config.logging, args.plain)?;
    tracing::info!("Stagewatch v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(url = %config.source.url, "Event stream endpoint");

    let mut renderer = DashboardRenderer::new(Board::standard()).context("Dashboard layout is incomplete")?;
    let source = SseSource::new(config.source.sse_config())?;

    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = source.connect(move |snapshot: Snapshot| {
        // Receiver only goes away during shutdown
        let _ = tx.send(snapshot);
    });

    let result = if args.plain {
        let mut out = io::stdout();
        tui::run_plain(&mut renderer, rx, &mut out, tokio::signal::ctrl_c())
            .await
            .context("Failed to write plain output")
    } else {
        run_terminal(renderer, rx, &subscription, &config.source.url).await
    };

    subscription.close().await;
    tracing::info!("Stagewatch shutdown complete");
    result
}

fn init_logging(config: &LoggingConfig, to_stderr: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("stagewatch={}", config.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if to_stderr {
        let layer = fmt::layer().with_writer(io::stderr);
        if config.is_json() {
            registry.with(layer.json()).init();
        } else {
            registry.with(layer).init();
        }
    } else {
        // The terminal UI owns stdout and stderr
        let path = config.file_or_default();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
        if config.is_json() {
            registry.with(layer.json()).init();
        } else {
            registry.with(layer).init();
        }
    }

    Ok(())
}

/// Restores the terminal on every exit path
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
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

async fn run_terminal(
    mut renderer: Renderer,
    mut snapshots: mpsc::UnboundedReceiver<Snapshot>,
    subscription: &Subscription,
    endpoint: &str,
) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut status = StatusLine::new(endpoint);
    let mut states = subscription.state_changes();
    let mut events = EventStream::new();

    loop {
        status.state = *states.borrow();
        status.dropped = subscription.stats().dropped;
        guard
            .terminal
            .draw(|frame| tui::draw(frame, renderer.surface(), &status))?;

        tokio::select! {
            Some(snapshot) = snapshots.recv() => {
                renderer.on_snapshot(&snapshot);
                status.rendered_at(Local::now());
            }
            Ok(()) = states.changed() => {}
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if is_quit(&key) => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Terminal input failed"),
                None => break,
            },
        }
    }

    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
