//! Tokenscope terminal dashboard.
//!
//! Thin presentation layer over `tokenscope-client`: renders the visible
//! token set derived by the analytics pipeline, a connection status line and
//! an error banner. All state-machine logic, liveness and scoring live in
//! the client library.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use tokio::sync::Mutex;
use tokenscope_client::{
    assemble, ClientConfig, ConnectionState, FeedEvent, FeedHandle, FilterConfig, HoneypotMode,
    RiskLevel, ScoredToken, SortDirection, SortKey, TokenStore,
};

/// Get WebSocket URL from TOKENSCOPE_WS_URL (default: ws://127.0.0.1:8080/ws)
fn get_ws_url() -> String {
    std::env::var("TOKENSCOPE_WS_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string())
}

/// Get REST base URL from TOKENSCOPE_API_URL (default: http://127.0.0.1:8080)
fn get_api_url() -> String {
    std::env::var("TOKENSCOPE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

/// Feed-driven state shared between the event task and the render loop.
#[derive(Debug, Default)]
struct FeedState {
    connection: Option<ConnectionState>,
    last_error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Install rustls crypto provider for wss:// and https:// endpoints
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let store = TokenStore::new();
    let config = ClientConfig::new(get_ws_url(), get_api_url());
    let (handle, mut event_rx, mut status_rx, feed_task) = tokenscope_client::spawn(config, store.clone());

    let feed_state = Arc::new(Mutex::new(FeedState::default()));

    {
        let state = Arc::clone(&feed_state);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let mut guard = state.lock().await;
                match event {
                    FeedEvent::TokensRefreshed { .. } => {
                        guard.last_error = None;
                    }
                    FeedEvent::RefreshFailed(error) => {
                        guard.last_error = Some(error.to_string());
                    }
                    FeedEvent::Terminal(error) => {
                        guard.last_error =
                            Some(format!("{error} - press 'r' to reconnect"));
                    }
                }
            }
        });
    }

    {
        let state = Arc::clone(&feed_state);
        tokio::spawn(async move {
            loop {
                let connection = *status_rx.borrow_and_update();
                state.lock().await.connection = Some(connection);
                if status_rx.changed().await.is_err() {
                    break;
                }
            }
        });
    }

    let mut filter = FilterConfig::default();
    let tick_rate = Duration::from_millis(500);
    let mut last_tick = Instant::now();

    loop {
        if last_tick.elapsed() >= tick_rate {
            let snapshot = store.snapshot();
            let visible = assemble(&snapshot, &filter);
            let state = {
                let guard = feed_state.lock().await;
                (guard.connection, guard.last_error.clone())
            };
            let updated = store.last_updated();
            terminal.draw(|f| {
                render_ui(f, &visible, snapshot.len(), &filter, state.0, state.1.as_deref(), updated)
            })?;
            last_tick = Instant::now();
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('r') => spawn_control(&handle, ControlKey::Reconnect),
                    KeyCode::Char('f') => spawn_control(&handle, ControlKey::Refresh),
                    KeyCode::Char('h') => {
                        filter.honeypot_mode = match filter.honeypot_mode {
                            HoneypotMode::Show => HoneypotMode::Hide,
                            HoneypotMode::Hide => HoneypotMode::Only,
                            HoneypotMode::Only => HoneypotMode::Show,
                        };
                    }
                    KeyCode::Char('d') => filter.hide_dangerous = !filter.hide_dangerous,
                    KeyCode::Char('w') => filter.hide_warning = !filter.hide_warning,
                    KeyCode::Char('a') => filter.safe_only = !filter.safe_only,
                    KeyCode::Char('s') => {
                        filter.sort_key = match filter.sort_key {
                            SortKey::CreationTime => SortKey::Liquidity,
                            SortKey::Liquidity => SortKey::Holders,
                            SortKey::Holders => SortKey::SafetyScore,
                            SortKey::SafetyScore => SortKey::Age,
                            SortKey::Age => SortKey::Records,
                            SortKey::Records => SortKey::CreationTime,
                        };
                    }
                    KeyCode::Char('x') => {
                        filter.sort_direction = match filter.sort_direction {
                            SortDirection::Asc => SortDirection::Desc,
                            SortDirection::Desc => SortDirection::Asc,
                        };
                    }
                    _ => {}
                }
            }
        }
    }

    spawn_control(&handle, ControlKey::Disconnect);
    let _ = tokio::time::timeout(Duration::from_secs(2), feed_task).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

enum ControlKey {
    Reconnect,
    Refresh,
    Disconnect,
}

fn spawn_control(handle: &FeedHandle, key: ControlKey) {
    let handle = handle.clone();
    tokio::spawn(async move {
        match key {
            ControlKey::Reconnect => handle.reconnect().await,
            ControlKey::Refresh => handle.refresh().await,
            ControlKey::Disconnect => handle.disconnect().await,
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn render_ui(
    f: &mut Frame,
    visible: &[ScoredToken],
    total: usize,
    filter: &FilterConfig,
    connection: Option<ConnectionState>,
    error: Option<&str>,
    updated: Option<chrono::DateTime<chrono::Utc>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_status(f, chunks[0], visible.len(), total, connection, updated);
    render_table(f, chunks[1], visible);
    render_footer(f, chunks[2], filter, error);
}

fn render_status(
    f: &mut Frame,
    area: Rect,
    visible: usize,
    total: usize,
    connection: Option<ConnectionState>,
    updated: Option<chrono::DateTime<chrono::Utc>>,
) {
    let (label, color) = match connection {
        Some(ConnectionState::Open) => ("LIVE", Color::Green),
        Some(ConnectionState::Connecting) => ("CONNECTING", Color::Yellow),
        Some(ConnectionState::Closed) => ("RECONNECTING", Color::Yellow),
        Some(ConnectionState::Disconnected) | None => ("OFFLINE", Color::Red),
    };

    let updated_label = updated
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("{visible}/{total} tokens"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  updated "),
        Span::styled(updated_label, Style::default().fg(Color::Gray)),
    ]);

    let block = Block::default().title(" TOKENSCOPE ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_table(f: &mut Frame, area: Rect, visible: &[ScoredToken]) {
    let header = Row::new(
        ["TOKEN", "LIQUIDITY", "HOLDERS", "AGE(H)", "TAX B/S", "SCORE", "LEVEL"]
            .into_iter()
            .map(|h| {
                Cell::from(h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    )
    .height(1);

    let rows = visible.iter().map(|row| {
        let level_color = match row.score.level {
            RiskLevel::Danger => Color::Red,
            RiskLevel::Warning => Color::Yellow,
            RiskLevel::Safe => Color::Green,
        };
        Row::new(vec![
            Cell::from(row.record.label()),
            Cell::from(format!("${:.0}", row.record.liquidity)),
            Cell::from(row.record.gp_holder_count.to_string()),
            Cell::from(format!("{:.1}", row.record.age_hours)),
            Cell::from(format!(
                "{:.0}/{:.0}%",
                row.record.gp_buy_tax, row.record.gp_sell_tax
            )),
            Cell::from(format!("{:.0}", row.score.composite)),
            Cell::from(row.score.level.to_string().to_uppercase())
                .style(Style::default().fg(level_color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(Block::default().title(" SCANNED TOKENS ").borders(Borders::ALL));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, filter: &FilterConfig, error: Option<&str>) {
    let line = if let Some(error) = error {
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                format!(
                    "sort:{:?}/{:?} honeypots:{:?}",
                    filter.sort_key, filter.sort_direction, filter.honeypot_mode
                ),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(
                "q quit | r reconnect | f refresh | h honeypots | d/w/a risk | s/x sort",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };

    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}
