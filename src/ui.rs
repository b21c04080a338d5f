use crate::forecast::daily::{daily_summaries, samples_by_date, DailySummary};
use crate::forecast::hourly::{hourly_points, HourlyPoint};
use crate::forecast::suggest::suggestions;
use crate::forecast::types::{Condition, RawSample};
use crate::forecast::WeatherBundle;
use crate::service::{spawn_fetch, FetchResult, WeatherService};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::*,
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Current,
    Hourly,
    Daily,
}

impl Tab {
    fn all() -> &'static [Tab] {
        &[Tab::Current, Tab::Hourly, Tab::Daily]
    }

    fn title(self) -> &'static str {
        match self {
            Tab::Current => "Current",
            Tab::Hourly => "Hourly",
            Tab::Daily => "5-Day",
        }
    }
}

/// Raw 3-hourly breakdown behind a selected forecast day.
struct DayDetail {
    title: String,
    samples: Vec<RawSample>,
}

struct App {
    service: Arc<WeatherService>,
    tx: mpsc::Sender<FetchResult>,
    tab: Tab,
    search: String,
    editing: bool,
    loading: bool,
    status: String,
    bundle: Option<Arc<WeatherBundle>>,
    hourly: Vec<HourlyPoint>,
    daily: Vec<DailySummary>,
    suggestions: Vec<String>,
    day_table: TableState,
    day_detail: Option<DayDetail>,
    tz_offset: i32,
    quit: bool,
}

impl App {
    fn new(service: Arc<WeatherService>, tx: mpsc::Sender<FetchResult>, city: String) -> Self {
        Self {
            service,
            tx,
            tab: Tab::Current,
            search: city,
            editing: false,
            loading: false,
            status: "Ready".to_string(),
            bundle: None,
            hourly: Vec::new(),
            daily: Vec::new(),
            suggestions: Vec::new(),
            day_table: TableState::default(),
            day_detail: None,
            tz_offset: 0,
            quit: false,
        }
    }

    /// A search issued while a fetch is in flight is dropped silently; only
    /// one fetch runs at a time.
    fn request_fetch(&mut self) {
        if self.loading {
            return;
        }
        let city = self.search.trim().to_string();
        if city.is_empty() {
            return;
        }
        self.loading = true;
        self.status = format!("Loading {city}...");
        spawn_fetch(Arc::clone(&self.service), city, self.tx.clone());
    }

    fn on_fetch(&mut self, outcome: FetchResult) {
        self.loading = false;
        match outcome {
            Ok(bundle) => {
                self.tz_offset = bundle.tz_offset_secs();
                let samples = bundle.samples();
                let now = Utc::now();
                self.hourly = hourly_points(&samples, self.tz_offset, now);
                self.daily = daily_summaries(&samples, self.tz_offset, now);
                self.suggestions = suggestions(&bundle.current, &samples);
                self.day_table
                    .select(if self.daily.is_empty() { None } else { Some(0) });
                self.status = format!(
                    "Updated {}",
                    local_time(bundle.fetched_at.timestamp(), self.tz_offset, "%I:%M %p")
                );
                self.bundle = Some(bundle);
            }
            Err(err) => {
                tracing::error!(%err, "fetch failed");
                self.status = err.user_message();
            }
        }
    }

    fn cycle_tab(&mut self, step: isize) {
        let tabs = Tab::all();
        let i = tabs.iter().position(|t| *t == self.tab).unwrap_or(0) as isize;
        let n = tabs.len() as isize;
        self.tab = tabs[((i + step).rem_euclid(n)) as usize];
    }

    fn move_day_selection(&mut self, step: isize) {
        if self.daily.is_empty() {
            return;
        }
        let i = self.day_table.selected().unwrap_or(0) as isize;
        let n = self.daily.len() as isize;
        self.day_table.select(Some(((i + step).rem_euclid(n)) as usize));
    }

    fn open_day_detail(&mut self) {
        let Some(bundle) = &self.bundle else { return };
        let Some(idx) = self.day_table.selected() else { return };
        let Some(day) = self.daily.get(idx) else { return };

        let grouped = samples_by_date(&bundle.samples(), self.tz_offset);
        let Some(samples) = grouped.get(&day.date) else {
            self.status = "No hourly data available for this day.".to_string();
            return;
        };
        self.day_detail = Some(DayDetail {
            title: format!("{} {}", day.day_name, day.date),
            samples: samples.clone(),
        });
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.day_detail.is_some() {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.day_detail = None;
            }
            return;
        }

        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => {
                    self.editing = false;
                    self.request_fetch();
                }
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Char(c) => self.search.push(c),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit = true,
            KeyCode::Char('/') => {
                self.search.clear();
                self.editing = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_fetch(),
            KeyCode::Left => self.cycle_tab(-1),
            KeyCode::Right | KeyCode::Tab => self.cycle_tab(1),
            KeyCode::Up if self.tab == Tab::Daily => self.move_day_selection(-1),
            KeyCode::Down if self.tab == Tab::Daily => self.move_day_selection(1),
            KeyCode::Enter if self.tab == Tab::Daily => self.open_day_detail(),
            _ => {}
        }
    }
}

pub async fn run(service: Arc<WeatherService>, initial_city: String) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<FetchResult>(4);
    let mut app = App::new(service, tx, initial_city);
    app.request_fetch();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &mut rx).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<FetchResult>,
) -> Result<()> {
    loop {
        // Background fetch results arrive as messages; the UI never shares
        // mutable state with the fetch task.
        while let Ok(outcome) = rx.try_recv() {
            app.on_fetch(outcome);
        }

        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press {
                    app.handle_key(k.code);
                }
            }
        }

        if app.quit {
            return Ok(());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, EnableLineWrap, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, rows[0], app);
    render_tabs(f, rows[1], app);
    match app.tab {
        Tab::Current => render_current(f, rows[2], app),
        Tab::Hourly => render_hourly(f, rows[2], app),
        Tab::Daily => render_daily(f, rows[2], app),
    }
    render_footer(f, rows[3], app);

    if app.day_detail.is_some() {
        render_day_detail(f, app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(14)])
        .split(area);

    let title = if app.editing {
        "Search (Enter to go, Esc to cancel)"
    } else {
        "WeatherScope — / to search"
    };
    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.search.clone()),
        Span::styled(
            if app.editing { "▏" } else { "" },
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, cols[0]);

    // Live clock in the location's local time.
    let clock = Paragraph::new(local_time(Utc::now().timestamp(), app.tz_offset, "%I:%M:%S %p"))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(clock, cols[1]);
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| Line::from(Span::raw(t.title())))
        .collect();
    let idx = Tab::all().iter().position(|t| *t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(idx)
        .block(Block::default().borders(Borders::ALL).title("View"))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ");
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let style = if app.loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit  "),
        Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" tabs  "),
        Span::styled("/", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" search  "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" refresh   "),
        Span::styled(app.status.clone(), style),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Status")),
        area,
    );
}

fn render_current(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Current");
    let Some(bundle) = &app.bundle else {
        render_placeholder(f, area, block, app);
        return;
    };

    let current = &bundle.current;
    let condition = current
        .weather
        .first()
        .map(|w| Condition::from_name(&w.main))
        .unwrap_or(Condition::Default);
    let description = current
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default();
    let country = current.sys.country.as_deref().unwrap_or("");
    let tz = app.tz_offset;

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}, {}", current.name, country),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} {:.0}°C", condition.icon(), current.main.temp),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {description}")),
        ]),
        Line::from(format!("Feels like {:.0}°C", current.main.feels_like)),
        Line::from(""),
        Line::from(format!(
            "Humidity: {:.0}%   Pressure: {:.0} hPa   Wind: {:.1} m/s",
            current.main.humidity, current.main.pressure, current.wind.speed
        )),
        Line::from(format!(
            "Sunrise: {}   Sunset: {}",
            local_time(current.sys.sunrise, tz, "%I:%M %p"),
            local_time(current.sys.sunset, tz, "%I:%M %p"),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Last updated: {}",
                local_time(bundle.fetched_at.timestamp(), tz, "%I:%M %p")
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if !app.suggestions.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Suggestions",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for suggestion in &app.suggestions {
            lines.push(Line::from(format!("• {suggestion}")));
        }
    }

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_hourly(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Next 24 Hours");
    if app.hourly.is_empty() {
        render_placeholder(f, area, block, app);
        return;
    }

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let points: Vec<(f64, f64)> = app
        .hourly
        .iter()
        .enumerate()
        .map(|(i, h)| (i as f64, h.temp))
        .collect();
    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() - 1.0;
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() + 1.0;

    let x_labels: Vec<Span> = app
        .hourly
        .iter()
        .step_by(6)
        .map(|h| Span::raw(h.label.clone()))
        .collect();
    let y_labels = vec![
        Span::raw(format!("{min:.0}°")),
        Span::raw(format!("{:.0}°", (min + max) / 2.0)),
        Span::raw(format!("{max:.0}°")),
    ];

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, (app.hourly.len().max(2) - 1) as f64])
                .labels(x_labels)
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([min, max])
                .labels(y_labels)
                .style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(chart, halves[0]);

    let rows: Vec<Row> = app
        .hourly
        .iter()
        .map(|h| {
            Row::new(vec![
                Cell::from(h.label.clone()),
                Cell::from(h.condition.icon()),
                Cell::from(format!("{:.1}°C", h.temp)),
                Cell::from(h.condition.name()),
            ])
        })
        .collect();
    let header = Row::new(vec!["Time", "", "Temp", "Conditions"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL))
    .column_spacing(1);
    f.render_widget(table, halves[1]);
}

fn render_daily(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("5-Day Forecast (Enter for details)");
    if app.daily.is_empty() {
        render_placeholder(f, area, block, app);
        return;
    }

    let rows: Vec<Row> = app
        .daily
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.day_name.clone()),
                Cell::from(d.date.format("%Y-%m-%d").to_string()),
                Cell::from(d.icon),
                Cell::from(format!("{:.0}° / {:.0}°", d.temp_max, d.temp_min)),
                Cell::from(d.condition.name()),
            ])
        })
        .collect();
    let header = Row::new(vec!["Day", "Date", "", "Max / Min", "Conditions"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(3),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .column_spacing(1);
    f.render_stateful_widget(table, area, &mut app.day_table);
}

fn render_day_detail(f: &mut Frame, app: &App) {
    let Some(detail) = &app.day_detail else { return };

    let area = centered_rect(f.size(), 50, 70);
    f.render_widget(Clear, area);

    let rows: Vec<Row> = detail
        .samples
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(local_time(s.dt, app.tz_offset, "%H:%M")),
                Cell::from(s.condition.icon()),
                Cell::from(format!("{:.1}°C", s.temp)),
                Cell::from(
                    s.pop
                        .map(|p| format!("{:.0}%", p * 100.0))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(s.condition.name()),
            ])
        })
        .collect();
    let header = Row::new(vec!["Time", "", "Temp", "PoP", "Conditions"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} — Esc to close ", detail.title)),
    )
    .column_spacing(1);
    f.render_widget(table, area);
}

fn render_placeholder(f: &mut Frame, area: Rect, block: Block, app: &App) {
    let text = if app.loading {
        "Loading..."
    } else {
        "No data available."
    };
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .block(block),
        area,
    );
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn local_time(ts: i64, tz_offset_secs: i32, fmt: &str) -> String {
    localize(ts, tz_offset_secs)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn localize(ts: i64, tz_offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(tz_offset_secs)?;
    Some(DateTime::from_timestamp(ts, 0)?.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::sync::mpsc::error::TryRecvError;

    fn test_app() -> (App, mpsc::Receiver<FetchResult>) {
        let config = Config {
            openweather_api_key: "test-key".to_string(),
            // Unroutable; any fetch that does go out fails fast with a
            // network error rather than hitting the real provider.
            openweather_base_url: "http://127.0.0.1:9".to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            request_timeout_secs: 1,
            cache_ttl_secs: 300,
            prefs_path: "/dev/null".to_string(),
        };
        let service = Arc::new(WeatherService::new(config).unwrap());
        let (tx, rx) = mpsc::channel(4);
        (App::new(service, tx, "London".to_string()), rx)
    }

    #[tokio::test]
    async fn fetch_request_while_loading_is_a_silent_no_op() {
        let (mut app, mut rx) = test_app();
        app.loading = true;

        app.request_fetch();

        // Nothing spawned: the status is untouched and no outcome ever
        // arrives on the channel.
        assert_eq!(app.status, "Ready");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn fetch_request_when_idle_spawns_and_delivers() {
        let (mut app, mut rx) = test_app();

        app.request_fetch();
        assert!(app.loading);
        assert_eq!(app.status, "Loading London...");

        let outcome = rx.recv().await.unwrap();
        assert!(outcome.is_err());
        app.on_fetch(outcome);
        assert!(!app.loading);
    }

    #[test]
    fn local_time_applies_the_offset() {
        // 22:13:20 UTC is 23:13 at UTC+1.
        assert_eq!(local_time(1_700_000_000, 3600, "%H:%M"), "23:13");
    }

    #[test]
    fn local_time_survives_a_bad_offset() {
        assert_eq!(local_time(1_700_000_000, i32::MAX, "%H:%M"), "--:--");
    }

    #[test]
    fn tab_cycle_wraps_both_ways() {
        let tabs = Tab::all();
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].title(), "Current");
    }
}
