//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a history source, forecast
//! horizon, body encoding, and weekend policy, then invokes the remote
//! deployment and renders the forecast table and chart.
//!
//! The invocation is a single blocking call: the UI is busy until the remote
//! service answers or fails, matching the one-in-flight-request model.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, RunOutput};
use crate::cli::ForecastArgs;
use crate::data::{RuntimeClient, resolve};
use crate::domain::{
    DeploymentProfile, ForecastConfig, Horizon, HistorySource, PayloadEncoding, WeekendPolicy,
};
use crate::error::{AppError, ErrorKind};

mod plotters_chart;

use plotters_chart::ForecastChart;

/// Start the TUI.
pub fn run(args: ForecastArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| {
            AppError::new(ErrorKind::Config, format!("Failed to enable raw mode: {e}"))
        })?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                ErrorKind::Config,
                format!("Failed to enter alternate screen: {e}"),
            ));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Where the next prediction's history comes from.
enum SourceChoice {
    Demo,
    Inline(String),
    File(PathBuf),
}

impl SourceChoice {
    fn label(&self) -> String {
        match self {
            SourceChoice::Demo => "demo (synthetic)".to_string(),
            SourceChoice::Inline(_) => "inline JSON".to_string(),
            SourceChoice::File(path) => path.display().to_string(),
        }
    }
}

struct App {
    horizon: Horizon,
    encoding: PayloadEncoding,
    weekend: WeekendPolicy,
    sources: Vec<SourceChoice>,
    source_idx: usize,
    seed: u64,
    sample_days: usize,
    selected_field: usize,
    status: String,
    client: RuntimeClient,
    run: Option<RunOutput>,
}

const FIELD_COUNT: usize = 4;

impl App {
    fn new(args: ForecastArgs) -> Result<Self, AppError> {
        let client = RuntimeClient::from_env()?;

        let mut sources = vec![SourceChoice::Demo];
        if let Some(data) = &args.data {
            sources.push(SourceChoice::Inline(data.clone()));
        }
        for path in crate::cli::picker::discover_history_files() {
            sources.push(SourceChoice::File(path));
        }

        // An explicit -f selection goes to the front of the list.
        let mut source_idx = 0;
        if let Some(file) = &args.file {
            sources.insert(1, SourceChoice::File(file.clone()));
            source_idx = 1;
        } else if args.data.is_some() {
            source_idx = 1;
        }

        Ok(Self {
            horizon: args.horizon,
            encoding: args.encoding,
            weekend: args.weekend,
            sources,
            source_idx,
            seed: args.seed,
            sample_days: args.sample_days,
            selected_field: 0,
            status: "Press p to request a forecast.".to_string(),
            client,
            run: None,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| {
                        AppError::new(
                            ErrorKind::Config,
                            format!("Terminal draw error: {e}"),
                        )
                    })?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| {
                AppError::new(ErrorKind::Config, format!("Event poll error: {e}"))
            })? {
                continue;
            }

            match event::read().map_err(|e| {
                AppError::new(ErrorKind::Config, format!("Event read error: {e}"))
            })? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter | KeyCode::Char('p') => self.predict(),
            KeyCode::Char('d') => {
                if let Some(run) = &self.run {
                    match crate::debug::write_debug_bundle(run, &self.current_config()) {
                        Ok(path) => {
                            self.status = format!("Wrote debug bundle: {}", path.display());
                        }
                        Err(err) => {
                            self.status = format!("Debug write failed: {err}");
                        }
                    }
                } else {
                    self.status = "No forecast to dump yet.".to_string();
                }
            }
            _ => {}
        }

        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            0 => {
                let n = self.sources.len();
                self.source_idx = if delta >= 0 {
                    (self.source_idx + 1) % n
                } else {
                    (self.source_idx + n - 1) % n
                };
                self.status = format!("source: {}", self.sources[self.source_idx].label());
            }
            1 => {
                self.horizon = self.horizon.toggle();
                self.status = format!("horizon: {}", self.horizon.display_name());
            }
            2 => {
                self.encoding = self.encoding.toggle();
                self.status = format!("encoding: {}", self.encoding.content_type());
            }
            3 => {
                self.weekend = self.weekend.cycle();
                self.status = format!("weekend: {}", self.weekend.display_name());
            }
            _ => {}
        }
    }

    fn current_config(&self) -> ForecastConfig {
        let source = match &self.sources[self.source_idx] {
            SourceChoice::Demo => HistorySource::Sample {
                seed: self.seed,
                days: self.sample_days,
            },
            SourceChoice::Inline(data) => HistorySource::Inline(data.clone()),
            SourceChoice::File(path) => HistorySource::File(path.clone()),
        };

        let mut profile = DeploymentProfile::for_horizon(self.horizon);
        profile.encoding = self.encoding;
        profile.weekend_policy = self.weekend;

        ForecastConfig {
            source,
            horizon: self.horizon,
            profile,
            limit: None,
            plot: false,
            plot_width: 0,
            plot_height: 0,
            export_csv: None,
            export_json: None,
        }
    }

    /// One blocking invocation. An error keeps the previous (complete)
    /// forecast on screen and reports via the status line; the user retries.
    fn predict(&mut self) {
        let target = resolve(self.horizon, self.client.region());
        self.status = format!("Invoking {}…", target.deployment);

        match pipeline::run_forecast_with_client(&self.client, &self.current_config()) {
            Ok(run) => {
                self.status = format!(
                    "{} rows from {}.",
                    run.forecast.rows.len(),
                    run.target.deployment
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Error: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(10),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_lower(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("stockcast", Style::default().fg(Color::Cyan)),
            Span::raw(" — managed-endpoint stock forecasts"),
        ]));

        let deployment = resolve(self.horizon, self.client.region()).deployment;
        lines.push(Line::from(Span::styled(
            format!(
                "horizon: {} | deployment: {deployment} | encoding: {} | weekend: {}",
                self.horizon.display_name(),
                self.encoding.content_type(),
                self.weekend.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "last run: {} rows | source: {}",
                    run.forecast.rows.len(),
                    run.history
                        .as_ref()
                        .map(|h| format!("{} history rows", h.stats.n_rows))
                        .unwrap_or_else(|| "inline payload".to_string()),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No forecast yet. Press p to invoke the endpoint.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some(series) = chart_series(run) else {
            let msg = Paragraph::new("Forecast has no numeric rows to chart.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let widget = ForecastChart {
            mean: &series.mean,
            p10: &series.p10,
            p50: &series.p50,
            p90: &series.p90,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "day",
            y_label: "price",
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, inner);
    }

    fn draw_lower(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Source: {}", self.sources[self.source_idx].label())),
            ListItem::new(format!("Horizon: {}", self.horizon.display_name())),
            ListItem::new(format!("Encoding: {}", self.encoding.content_type())),
            ListItem::new(format!("Weekend: {}", self.weekend.display_name())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Rows").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.run else {
            return;
        };

        let limit = inner.height.saturating_sub(1) as usize;
        let table = crate::report::format_forecast_table(&run.forecast, Some(limit));
        let p = Paragraph::new(table);
        frame.render_widget(p, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  p/Enter predict  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

struct ChartSeries {
    mean: Vec<(f64, f64)>,
    p10: Vec<(f64, f64)>,
    p50: Vec<(f64, f64)>,
    p90: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters. Masked weekend rows simply contribute no
/// points, leaving visible gaps over market closures.
fn chart_series(run: &RunOutput) -> Option<ChartSeries> {
    let rows = &run.forecast.rows;

    let mut mean = Vec::with_capacity(rows.len());
    let mut p10 = Vec::with_capacity(rows.len());
    let mut p50 = Vec::with_capacity(rows.len());
    let mut p90 = Vec::with_capacity(rows.len());

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for row in rows {
        let x = row.ordinal as f64;
        for (cell, series) in [
            (row.mean, &mut mean),
            (row.p10, &mut p10),
            (row.p50, &mut p50),
            (row.p90, &mut p90),
        ] {
            if let Some(v) = cell.as_value() {
                series.push((x, v));
                y_min = y_min.min(v);
                y_max = y_max.max(v);
            }
        }
    }

    if mean.len() < 2 || !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        return None;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(ChartSeries {
        mean,
        p10,
        p50,
        p90,
        x_bounds: [1.0, rows.len() as f64],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}
