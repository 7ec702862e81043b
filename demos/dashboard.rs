//! Live terminal view of an Altitude's state.
//!
//! Usage: `cargo run --example dashboard -- <host>`
//!
//! Keys: `+`/`-` volume, `m` mute, `d` dim, `b` bypass, `j`/`k` source, `q` quit.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use trinnov_altitude::{AltitudeClient, ClientState, Timeout};

struct App {
    client: AltitudeClient,
    status_message: String,
}

impl App {
    async fn handle_key(&mut self, code: KeyCode) -> trinnov_altitude::Result<bool> {
        let state = self.client.state();
        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('+') => self.client.volume_adjust(0.5).await?,
            KeyCode::Char('-') => self.client.volume_adjust(-0.5).await?,
            KeyCode::Char('m') => self.client.mute_toggle().await?,
            KeyCode::Char('d') => self.client.dim_toggle().await?,
            KeyCode::Char('b') => self.client.bypass_toggle().await?,
            KeyCode::Char('j') => {
                if let Some(index) = next_source(&state, 1) {
                    self.client.source_set(index).await?;
                }
            }
            KeyCode::Char('k') => {
                if let Some(index) = next_source(&state, -1) {
                    self.client.source_set(index).await?;
                }
            }
            _ => {}
        }
        Ok(false)
    }
}

/// Neighbouring announced source index, wrapping around
fn next_source(state: &ClientState, step: isize) -> Option<u32> {
    let indices: Vec<u32> = state.sources.keys().copied().collect();
    if indices.is_empty() {
        return None;
    }
    let current = state
        .source_index
        .and_then(|i| indices.iter().position(|&x| x == i))
        .unwrap_or(0) as isize;
    let len = indices.len() as isize;
    Some(indices[((current + step).rem_euclid(len)) as usize])
}

fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "on".to_string(),
        Some(false) => "off".to_string(),
        None => "-".to_string(),
    }
}

fn ui(f: &mut Frame, app: &App) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.size());

    let inner_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer_chunks[0]);

    let state = app.client.state();
    render_status_panel(f, &state, inner_chunks[0]);
    render_sources(f, &state, inner_chunks[1]);
    render_footer(f, app, outer_chunks[1]);
}

fn render_status_panel(f: &mut Frame, state: &ClientState, area: Rect) {
    let block = Block::default()
        .title(" Altitude (+/- vol, m mute, d dim, b bypass, j/k source, q quit) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let label = Style::default().fg(Color::Yellow);
    let lines = vec![
        Line::from(vec![
            Span::styled("Device: ", label.add_modifier(Modifier::BOLD)),
            Span::raw(state.id.clone().unwrap_or_else(|| "-".into())),
            Span::raw(format!("  v{}", state.version.as_deref().unwrap_or("?"))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Volume: ", label),
            Span::styled(
                state
                    .volume
                    .map(|db| format!("{:.1} dB", db))
                    .unwrap_or_else(|| "-".into()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![Span::styled("Mute: ", label), Span::raw(flag(state.mute))]),
        Line::from(vec![Span::styled("Dim: ", label), Span::raw(flag(state.dim))]),
        Line::from(vec![Span::styled("Bypass: ", label), Span::raw(flag(state.bypass))]),
        Line::from(vec![Span::styled("Audiosync: ", label), Span::raw(flag(state.audiosync))]),
        Line::from(vec![
            Span::styled("Sample rate: ", label),
            Span::raw(
                state
                    .sampling_rate
                    .map(|r| format!("{} Hz", r))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Decoder: ", label),
            Span::raw(state.decoder.clone().unwrap_or_else(|| "-".into())),
            Span::styled("  Upmixer: ", label),
            Span::raw(state.upmixer.clone().unwrap_or_else(|| "-".into())),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_sources(f: &mut Frame, state: &ClientState, area: Rect) {
    let block = Block::default()
        .title(" Sources ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = state
        .sources
        .iter()
        .map(|(index, name)| {
            let style = if state.source_index == Some(*index) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(format!("{:>2}  {}", index, name)).style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.client.connected() {
        app.status_message.clone()
    } else {
        "Disconnected".to_string()
    };
    let footer = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key.code).await {
                        Ok(true) => return Ok(()),
                        Ok(false) => {}
                        Err(e) => app.status_message = format!("Error: {}", e),
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let host = std::env::args().nth(1).ok_or("usage: dashboard <host>")?;

    let client = AltitudeClient::with_host(host);
    client.connect(Timeout::Default).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        client,
        status_message: "Connected".to_string(),
    };
    let res = run_app(&mut terminal, &mut app).await;

    let _ = app.client.disconnect(Timeout::Default).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {}", err);
    }

    Ok(())
}
