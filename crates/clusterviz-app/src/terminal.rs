//! Interactive watch dashboard.
//!
//! The loop runs on a blocking thread and drives the async [`Viewer`] through
//! a runtime handle. Each key is handled to completion before the next one is
//! read, so keys pressed during a fetch or render queue up in the terminal
//! input buffer and are processed in order.

use std::io::{self, Stdout};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clusterviz_core::Snapshot;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::{Viewer, ViewerError};

const POLL_MILLIS: u64 = 100;

#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Time between automatic refreshes.
    pub interval: Duration,
    /// Steps sent when `n` is pressed.
    pub step_size: NonZeroU32,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Quit,
    Advance,
    Refresh,
    FocalPrev,
    FocalNext,
}

/// Map a key event to a dashboard action. Only presses count, so terminals
/// reporting releases do not double-fire.
pub fn action_for(key: KeyEvent) -> Option<WatchAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(WatchAction::Quit),
        KeyCode::Char('n') => Some(WatchAction::Advance),
        KeyCode::Char('r') => Some(WatchAction::Refresh),
        KeyCode::Left => Some(WatchAction::FocalPrev),
        KeyCode::Right => Some(WatchAction::FocalNext),
        _ => None,
    }
}

/// One line of the cluster table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRow {
    pub index: usize,
    pub size: usize,
    pub color: Option<clusterviz_render::Color>,
}

pub fn cluster_rows(snapshot: &Snapshot, colors: &[clusterviz_render::Color]) -> Vec<ClusterRow> {
    snapshot
        .clusters
        .iter()
        .enumerate()
        .map(|(index, members)| ClusterRow {
            index,
            size: members.len(),
            color: colors.get(index).copied(),
        })
        .collect()
}

#[derive(Debug, Default)]
struct DashboardStatus {
    last_action: Option<&'static str>,
    last_error: Option<String>,
    saved: usize,
}

impl DashboardStatus {
    fn record(&mut self, action: &'static str, result: Result<usize, ViewerError>) {
        self.last_action = Some(action);
        match result {
            Ok(saved) => {
                self.saved = saved;
                self.last_error = None;
            }
            Err(err) => {
                debug!(action, error = %err, "dashboard action failed");
                self.last_error = Some(err.to_string());
            }
        }
    }
}

/// Run the dashboard until `q` or `Esc` is pressed. Must be called from a
/// thread that may block, with `handle` pointing at a live runtime.
pub fn run_watch(viewer: &mut Viewer, handle: &Handle, options: &WatchOptions) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
    let _cleanup = TerminalCleanup;

    let mut status = DashboardStatus::default();
    let mut last_refresh = Instant::now()
        .checked_sub(options.interval)
        .unwrap_or_else(Instant::now);

    loop {
        if last_refresh.elapsed() >= options.interval {
            let result = handle.block_on(viewer.refresh()).map(|_| ());
            status.record("refresh", result.and_then(|()| save(viewer, options)));
            last_refresh = Instant::now();
        }

        draw_dashboard(&mut terminal, viewer, &status, options)?;

        if !event::poll(Duration::from_millis(POLL_MILLIS))
            .context("failed to poll terminal events")?
        {
            continue;
        }
        let Event::Key(key) = event::read().context("failed to read terminal event")? else {
            continue;
        };
        let Some(action) = action_for(key) else {
            continue;
        };

        let (label, result) = match action {
            WatchAction::Quit => break,
            WatchAction::Advance => {
                let result = handle
                    .block_on(viewer.advance(options.step_size))
                    .map(|_| ());
                last_refresh = Instant::now();
                ("advance", result)
            }
            WatchAction::Refresh => {
                let result = handle.block_on(viewer.refresh()).map(|_| ());
                last_refresh = Instant::now();
                ("refresh", result)
            }
            WatchAction::FocalPrev => ("focal", viewer.shift_focal(-1).map(|_| ())),
            WatchAction::FocalNext => ("focal", viewer.shift_focal(1).map(|_| ())),
        };
        status.record(label, result.and_then(|()| save(viewer, options)));
    }

    terminal.show_cursor().ok();
    Ok(())
}

fn save(viewer: &Viewer, options: &WatchOptions) -> Result<usize, ViewerError> {
    viewer
        .save_frames(&options.output_dir)
        .map(|written| written.len())
}

fn draw_dashboard(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    viewer: &Viewer,
    status: &DashboardStatus,
    options: &WatchOptions,
) -> Result<()> {
    terminal
        .draw(|frame| {
            let outer = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(6), Constraint::Min(3)])
                .split(frame.area());
            draw_header(frame, outer[0], viewer, status, options);
            draw_clusters(frame, outer[1], viewer);
        })
        .context("failed to draw watch UI")?;
    Ok(())
}

fn draw_header(
    frame: &mut Frame<'_>,
    area: Rect,
    viewer: &Viewer,
    status: &DashboardStatus,
    options: &WatchOptions,
) {
    let pipeline = viewer.pipeline();
    let summary = match pipeline.snapshot() {
        Some(snapshot) => format!(
            "{} points · {} clusters · debug {} · focal {}",
            snapshot.point_count(),
            snapshot.cluster_count(),
            snapshot.debug.kind(),
            pipeline.focal_index()
        ),
        None => "no snapshot rendered yet".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                "ClusterViz ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(viewer.client().base_url().to_string()),
            Span::raw("  (n next, r refresh, ←/→ focal, q quit)"),
        ]),
        Line::from(Span::raw(summary)),
        Line::from(Span::styled(
            format!(
                "refresh every {} ms · {} step(s) per advance · {} file(s) in {}",
                options.interval.as_millis(),
                options.step_size,
                status.saved,
                options.output_dir.display()
            ),
            Style::default().fg(Color::Gray),
        )),
    ];
    if let Some(message) = status.last_error.as_deref() {
        lines.push(Line::from(Span::styled(
            format!("{} failed: {message}", status.last_action.unwrap_or("action")),
            Style::default().fg(Color::Red),
        )));
    }

    let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_clusters(frame: &mut Frame<'_>, area: Rect, viewer: &Viewer) {
    let pipeline = viewer.pipeline();
    let Some(snapshot) = pipeline.snapshot() else {
        let empty = Paragraph::new("Waiting for simulation data...")
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let rows: Vec<Row> = cluster_rows(snapshot, pipeline.colors())
        .into_iter()
        .map(|row| {
            let swatch = match row.color {
                Some(c) => Span::styled("████", Style::default().fg(Color::Rgb(c.r, c.g, c.b))),
                None => Span::raw("----"),
            };
            Row::new(vec![
                Span::raw(row.index.to_string()),
                swatch,
                Span::raw(row.size.to_string()),
            ])
        })
        .collect();

    let heading = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(6),
        ],
    )
    .header(Row::new(vec![
        Span::styled("CLUSTER", heading),
        Span::styled("COLOR", heading),
        Span::styled("SIZE", heading),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .column_spacing(2);

    frame.render_widget(table, area);
}

struct TerminalCleanup;

impl Drop for TerminalCleanup {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
    }
}
