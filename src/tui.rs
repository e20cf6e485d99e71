//! Terminal Front End
//!
//! Draws a [`Board`] with ratatui. Stages and workers share the top row,
//! queues and metrics the middle row, notifications run full width below,
//! and a one-line status bar shows connection health and freshness.

use chrono::{DateTime, Local};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use std::future::Future;
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::render::{Board, DashboardRenderer, Panel, Region};
use crate::snapshot::Snapshot;
use crate::source::ConnectionState;

/// Connection and freshness summary shown under the panels
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub endpoint: String,
    pub state: ConnectionState,
    pub rendered: u64,
    pub dropped: u64,
    pub last_render: Option<DateTime<Local>>,
}

impl StatusLine {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: ConnectionState::Connecting,
            rendered: 0,
            dropped: 0,
            last_render: None,
        }
    }

    /// Record a completed render
    pub fn rendered_at(&mut self, at: DateTime<Local>) {
        self.rendered += 1;
        self.last_render = Some(at);
    }

    pub fn text(&self) -> String {
        let last = self
            .last_render
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        format!(
            " {} | {} | snapshots: {} | dropped: {} | last update: {} | q to quit",
            self.endpoint, self.state, self.rendered, self.dropped, last
        )
    }

    fn color(&self) -> Color {
        match self.state {
            ConnectionState::Open => Color::Green,
            ConnectionState::Connecting => Color::Yellow,
            ConnectionState::Closed => Color::Red,
        }
    }
}

/// Draw the whole dashboard
pub fn draw(frame: &mut Frame, board: &Board, status: &StatusLine) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let top = split_pair(rows[0]);
    let middle = split_pair(rows[1]);

    draw_list(frame, board.panel(Region::Stages.id()), top[0]);
    draw_list(frame, board.panel(Region::Workers.id()), top[1]);
    draw_list(frame, board.panel(Region::EventQueues.id()), middle[0]);
    draw_list(frame, board.panel(Region::PerformanceMetrics.id()), middle[1]);
    draw_feed(frame, board.panel(Region::Notifications.id()), rows[2]);
    draw_status(frame, status, rows[3]);
}

fn split_pair(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn panel_block(panel: &Panel) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", panel.title(), panel.rows().len()))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
}

fn draw_list(frame: &mut Frame, panel: Option<&Panel>, area: Rect) {
    let Some(panel) = panel else { return };

    let items: Vec<ListItem> = panel
        .rows()
        .iter()
        .map(|row| ListItem::new(row.as_str()))
        .collect();

    frame.render_widget(List::new(items).block(panel_block(panel)), area);
}

fn draw_feed(frame: &mut Frame, panel: Option<&Panel>, area: Rect) {
    let Some(panel) = panel else { return };

    let lines: Vec<Line> = panel
        .rows()
        .iter()
        .map(|row| Line::from(row.as_str()))
        .collect();

    let feed = Paragraph::new(lines)
        .block(panel_block(panel))
        .wrap(Wrap { trim: false });
    frame.render_widget(feed, area);
}

fn draw_status(frame: &mut Frame, status: &StatusLine, area: Rect) {
    let line = Line::from(vec![Span::styled(
        status.text(),
        Style::default().fg(status.color()),
    )]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Plain-text rendering of a board, one `[region-id] row` line per row
pub fn plain_text(board: &Board) -> String {
    let mut out = String::new();
    for panel in board.panels() {
        for row in panel.rows() {
            out.push('[');
            out.push_str(panel.id());
            out.push_str("] ");
            out.push_str(row);
            out.push('\n');
        }
    }
    out
}

/// Print every rendered board to `out` until `shutdown` resolves.
///
/// The loop outlives the snapshot channel: a source that has given up leaves
/// the last board as the final output, and only `shutdown` ends the run.
pub async fn run_plain<W, F>(
    renderer: &mut DashboardRenderer<Board>,
    mut snapshots: mpsc::UnboundedReceiver<Snapshot>,
    out: &mut W,
    shutdown: F,
) -> io::Result<()>
where
    W: Write,
    F: Future,
{
    tokio::pin!(shutdown);
    let mut source_open = true;

    loop {
        tokio::select! {
            maybe_snapshot = snapshots.recv(), if source_open => {
                let Some(snapshot) = maybe_snapshot else {
                    tracing::warn!("Snapshot source closed; keeping the last board until shutdown");
                    source_open = false;
                    continue;
                };
                renderer.on_snapshot(&snapshot);
                writeln!(out, "{}", plain_text(renderer.surface()))?;
                out.flush()?;
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
