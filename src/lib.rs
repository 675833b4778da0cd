use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, ListState, Paragraph};

pub mod chart;
pub mod cli;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod filter;
pub mod insights;
pub mod stats;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager, Theme};
pub use dataset::{CarDatasets, LoadOptions};

use chart::{build_chart, AnalysisMode, ChartData, ChartRequest, MultivariateMethod};
use columns::ColumnPartition;
use filter::FilterState;
use insights::Insights;
use stats::series_mean;
use widgets::chart_view::ChartView;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::insights_view::InsightsView;
use widgets::intro::{Intro, IntroMetrics, PreviewSource};
use widgets::sidebar::{AnalysisFocus, Sidebar};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "cardash";

pub enum AppEvent {
    Key(KeyEvent),
    /// Read both CSVs and build the initial session.
    Load(PathBuf, PathBuf, LoadOptions),
    Exit,
    Crash(String),
    Resize(u16, u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Intro,
    Analysis,
    Insights,
}

/// Everything derived from a loaded pair of datasets. Recomputed pieces
/// (working view, chart) live here next to the inputs that drive them.
struct Session {
    datasets: CarDatasets,
    filter: FilterState,
    metrics: IntroMetrics,
    insights: Insights,
    working: DataFrame,
    chart: ChartData,
    columns: Vec<String>,
    mode: AnalysisMode,
    method: MultivariateMethod,
    primary_index: usize,
    secondary_index: usize,
    focus: AnalysisFocus,
    brand_list_state: ListState,
    preview: PreviewSource,
}

impl Session {
    fn new(datasets: CarDatasets) -> Result<Self> {
        let partition = ColumnPartition::from_frame(&datasets.clean);
        let columns = partition.all_columns();
        let brands = datasets.brands()?;
        let year_bounds = datasets.year_bounds()?.unwrap_or((0, 0));
        let filter = FilterState::new(brands, year_bounds);
        let metrics = IntroMetrics::compute(&datasets.clean)?;
        let insights = Insights::compute(&datasets.clean)?;

        let primary_index = columns.iter().position(|c| c == "Price").unwrap_or(0);
        let secondary_index = columns
            .iter()
            .position(|c| c == "Power_value")
            .unwrap_or_else(|| if columns.len() > 1 { 1 } else { 0 });

        let mut brand_list_state = ListState::default();
        if !filter.brands.is_empty() {
            brand_list_state.select(Some(0));
        }

        let mut session = Session {
            datasets,
            filter,
            metrics,
            insights,
            working: DataFrame::empty(),
            chart: ChartData::NoData {
                reason: "No data loaded".to_string(),
            },
            columns,
            mode: AnalysisMode::Univariate,
            method: MultivariateMethod::CorrelationHeatmap,
            primary_index,
            secondary_index,
            focus: AnalysisFocus::Brands,
            brand_list_state,
            preview: PreviewSource::Clean,
        };
        session.refresh()?;
        Ok(session)
    }

    fn request(&self) -> ChartRequest {
        let fallback = String::new();
        ChartRequest {
            mode: self.mode,
            primary: self
                .columns
                .get(self.primary_index)
                .cloned()
                .unwrap_or_else(|| fallback.clone()),
            secondary: self
                .columns
                .get(self.secondary_index)
                .cloned()
                .unwrap_or(fallback),
            method: self.method,
        }
    }

    /// Recompute the working view and the chart for the current controls.
    /// The insight summary is not touched; it always reflects the full
    /// dataset.
    fn refresh(&mut self) -> Result<()> {
        self.working = self.filter.apply(&self.datasets.clean)?;
        self.chart = build_chart(&self.working, &self.request())?;
        Ok(())
    }

    fn brand_select_next(&mut self) {
        let len = self.filter.brands.len();
        if len == 0 {
            return;
        }
        let next = match self.brand_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.brand_list_state.select(Some(next));
    }

    fn brand_select_previous(&mut self) {
        if self.filter.brands.is_empty() {
            return;
        }
        let previous = match self.brand_list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.brand_list_state.select(Some(previous));
    }

    fn cycle_mode(&mut self) {
        self.mode = match self.mode {
            AnalysisMode::Univariate => AnalysisMode::Bivariate,
            AnalysisMode::Bivariate => AnalysisMode::Multivariate,
            AnalysisMode::Multivariate => AnalysisMode::Univariate,
        };
        self.focus = AnalysisFocus::Mode;
    }

    fn cycle_method(&mut self) {
        self.method = match self.method {
            MultivariateMethod::CorrelationHeatmap => MultivariateMethod::FuelVsPrice,
            MultivariateMethod::FuelVsPrice => MultivariateMethod::CorrelationHeatmap,
        };
    }

    fn cycle_column(&mut self, secondary: bool, delta: isize) {
        let len = self.columns.len();
        if len == 0 {
            return;
        }
        let index = if secondary {
            &mut self.secondary_index
        } else {
            &mut self.primary_index
        };
        *index = (*index as isize + delta).rem_euclid(len as isize) as usize;
    }
}

pub struct App {
    events: Sender<AppEvent>,
    page: Page,
    session: Option<Session>,
    theme: Theme,
    config: AppConfig,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to create default theme: {e}. Using fallback.");
            Theme {
                colors: std::collections::HashMap::new(),
            }
        });
        Self::new_with_config(events, theme, config)
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        App {
            events,
            page: Page::Intro,
            session: None,
            theme,
            config,
            debug: DebugState::default(),
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Rows surviving the current filters, once data is loaded.
    pub fn working_rows(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.working.height())
    }

    /// Handle one event, optionally producing a follow-up event for the
    /// main loop to enqueue.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.record_event();
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Load(raw, clean, options) => {
                match CarDatasets::load(raw, clean, options).and_then(Session::new) {
                    Ok(session) => {
                        self.session = Some(session);
                        None
                    }
                    Err(e) => Some(AppEvent::Crash(format!("{e:#}"))),
                }
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if self.debug.enabled {
            self.debug.record_key(format!("{:?}", event.code));
        }
        if !event.is_press() {
            return None;
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Char('1') => {
                self.page = Page::Intro;
                return None;
            }
            KeyCode::Char('2') => {
                self.page = Page::Analysis;
                return None;
            }
            KeyCode::Char('3') => {
                self.page = Page::Insights;
                return None;
            }
            _ => {}
        }

        let Some(session) = self.session.as_mut() else {
            return None;
        };

        if self.page == Page::Intro {
            if event.code == KeyCode::Char('p') {
                session.preview = session.preview.toggle();
            }
            return None;
        }
        if self.page != Page::Analysis {
            return None;
        }

        let needs_refresh = match event.code {
            KeyCode::Tab => {
                session.focus = session.focus.next(session.mode);
                false
            }
            KeyCode::Down if session.focus == AnalysisFocus::Brands => {
                session.brand_select_next();
                false
            }
            KeyCode::Up if session.focus == AnalysisFocus::Brands => {
                session.brand_select_previous();
                false
            }
            KeyCode::Char(' ') if session.focus == AnalysisFocus::Brands => {
                if let Some(index) = session.brand_list_state.selected() {
                    session.filter.toggle_brand(index);
                    true
                } else {
                    false
                }
            }
            KeyCode::Char('a') if session.focus == AnalysisFocus::Brands => {
                session.filter.select_all_brands();
                true
            }
            KeyCode::Char('n') if session.focus == AnalysisFocus::Brands => {
                session.filter.clear_brands();
                true
            }
            KeyCode::Left | KeyCode::Right => {
                let delta: i64 = if event.code == KeyCode::Left { -1 } else { 1 };
                match session.focus {
                    AnalysisFocus::YearStart => {
                        session.filter.adjust_year_start(delta);
                        true
                    }
                    AnalysisFocus::YearEnd => {
                        session.filter.adjust_year_end(delta);
                        true
                    }
                    AnalysisFocus::Mode => {
                        session.cycle_mode();
                        true
                    }
                    AnalysisFocus::Primary => {
                        session.cycle_column(false, delta as isize);
                        true
                    }
                    AnalysisFocus::Secondary => {
                        session.cycle_column(true, delta as isize);
                        true
                    }
                    AnalysisFocus::Method => {
                        session.cycle_method();
                        true
                    }
                    AnalysisFocus::Brands => false,
                }
            }
            _ => false,
        };

        if needs_refresh {
            if let Err(e) = session.refresh() {
                return Some(AppEvent::Crash(format!("{e:#}")));
            }
        }
        None
    }

    fn render_kpi_tile(theme: &Theme, area: Rect, buf: &mut Buffer, label: &str, value: String) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.get("dimmed")));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(format!("{label}: {value}"))
            .style(
                Style::default()
                    .fg(theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(inner, buf);
    }

    fn render_kpi_row(theme: &Theme, session: &Session, area: Rect, buf: &mut Buffer) {
        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let fmt = |value: Option<f64>| match value {
            Some(v) => format!("{v:.2}"),
            None => "-".to_string(),
        };
        let mean_of = |column: &str| {
            session
                .working
                .column(column)
                .ok()
                .and_then(|c| series_mean(c.as_materialized_series()))
        };
        Self::render_kpi_tile(
            theme,
            tiles[0],
            buf,
            "Selected cars",
            session.working.height().to_string(),
        );
        Self::render_kpi_tile(theme, tiles[1], buf, "Mean price", fmt(mean_of("Price")));
        Self::render_kpi_tile(theme, tiles[2], buf, "Mean power", fmt(mean_of("Power_value")));
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        match self.page {
            Page::Intro => vec![("1-3", "Page"), ("p", "Preview"), ("q", "Quit")],
            Page::Analysis => vec![
                ("1-3", "Page"),
                ("Tab", "Focus"),
                ("Space", "Toggle"),
                ("</>", "Adjust"),
                ("q", "Quit"),
            ],
            Page::Insights => vec![("1-3", "Page"), ("q", "Quit")],
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.record_render();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let tab_style = |page: Page| {
            if self.page == page {
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.get("text_secondary"))
            }
        };
        let header = ratatui::text::Line::from(vec![
            ratatui::text::Span::styled(
                " Used Car Explorer ",
                Style::default()
                    .fg(self.theme.get("text_inverse"))
                    .bg(self.theme.get("primary")),
            ),
            ratatui::text::Span::raw("  "),
            ratatui::text::Span::styled("[1] Overview", tab_style(Page::Intro)),
            ratatui::text::Span::raw("  "),
            ratatui::text::Span::styled("[2] Analysis", tab_style(Page::Analysis)),
            ratatui::text::Span::raw("  "),
            ratatui::text::Span::styled("[3] Insights", tab_style(Page::Insights)),
        ]);
        Paragraph::new(header).render(layout[0], buf);

        match (&mut self.session, self.page) {
            (None, _) => {
                Paragraph::new("Loading datasets...")
                    .style(Style::default().fg(self.theme.get("text_secondary")))
                    .centered()
                    .render(layout[1], buf);
            }
            (Some(session), Page::Intro) => {
                let intro = Intro {
                    metrics: &session.metrics,
                    raw: &session.datasets.raw,
                    clean: &session.datasets.clean,
                    preview: session.preview,
                    preview_rows: self.config.display.preview_rows,
                    theme: &self.theme,
                };
                (&intro).render(layout[1], buf);
            }
            (Some(session), Page::Analysis) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(36), Constraint::Min(30)])
                    .split(layout[1]);

                let request = session.request();
                let mut sidebar = Sidebar {
                    filter: &session.filter,
                    focus: session.focus,
                    mode: session.mode,
                    primary: Some(request.primary.as_str()),
                    secondary: Some(request.secondary.as_str()),
                    method: session.method,
                    brand_list_state: &mut session.brand_list_state,
                    theme: &self.theme,
                };
                (&mut sidebar).render(columns[0], buf);

                let right = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(5)])
                    .split(columns[1]);
                App::render_kpi_row(&self.theme, session, right[0], buf);
                let chart_view = ChartView {
                    data: &session.chart,
                    theme: &self.theme,
                };
                (&chart_view).render(right[1], buf);
            }
            (Some(session), Page::Insights) => {
                let view = InsightsView {
                    insights: &session.insights,
                    theme: &self.theme,
                };
                (&view).render(layout[1], buf);
            }
        }

        let mut controls = Controls::new(self.hints());
        if self.page == Page::Analysis {
            if let Some(rows) = self.working_rows() {
                controls = controls.with_row_count(rows);
            }
        }
        (&controls).render(layout[2], buf);

        self.debug.render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    const RAW_CSV: &str = "\
Price,Company_Name,Kilometers_Driven,Year,Power_value,Fuel_Type,Transmission,Notes
5.0,BrandA,40000,2018,88.0,Petrol,Manual,ok
10.0,BrandB,52000,2019,102.0,Diesel,Automatic,ok
7.0,BrandA,31000,2020,95.0,Petrol,Manual,ok
";

    const CLEAN_CSV: &str = "\
Price,Company_Name,Kilometers_Driven,Year,Power_value,Fuel_Type,Transmission
5.0,BrandA,40000,2018,88.0,Petrol,Manual
10.0,BrandB,52000,2019,102.0,Diesel,Automatic
7.0,BrandA,31000,2020,95.0,Petrol,Manual
";

    fn loaded_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("raw.csv");
        let clean_path = dir.path().join("clean.csv");
        std::fs::write(&raw_path, RAW_CSV).unwrap();
        std::fs::write(&clean_path, CLEAN_CSV).unwrap();

        let (tx, _rx) = channel::<AppEvent>();
        let mut app = App::new(tx);
        let follow_up = app.event(&AppEvent::Load(
            raw_path,
            clean_path,
            LoadOptions::default(),
        ));
        assert!(follow_up.is_none(), "load should not produce a crash event");
        app
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_key_produces_exit() {
        let (tx, _rx) = channel::<AppEvent>();
        let mut app = App::new(tx);
        assert!(matches!(
            app.event(&press(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
    }

    #[test]
    fn test_page_navigation() {
        let mut app = loaded_app();
        assert_eq!(app.page(), Page::Intro);
        app.event(&press(KeyCode::Char('2')));
        assert_eq!(app.page(), Page::Analysis);
        app.event(&press(KeyCode::Char('3')));
        assert_eq!(app.page(), Page::Insights);
        app.event(&press(KeyCode::Char('1')));
        assert_eq!(app.page(), Page::Intro);
    }

    #[test]
    fn test_load_selects_everything() {
        let app = loaded_app();
        assert_eq!(app.working_rows(), Some(3));
    }

    #[test]
    fn test_brand_toggle_shrinks_working_view() {
        let mut app = loaded_app();
        app.event(&press(KeyCode::Char('2')));
        // First brand in first-appearance order is BrandA.
        app.event(&press(KeyCode::Char(' ')));
        assert_eq!(app.working_rows(), Some(1));
        app.event(&press(KeyCode::Char('a')));
        assert_eq!(app.working_rows(), Some(3));
        app.event(&press(KeyCode::Char('n')));
        assert_eq!(app.working_rows(), Some(0));
    }

    #[test]
    fn test_year_adjustment_filters_rows() {
        let mut app = loaded_app();
        app.event(&press(KeyCode::Char('2')));
        app.event(&press(KeyCode::Tab)); // YearStart
        app.event(&press(KeyCode::Right));
        assert_eq!(app.working_rows(), Some(2));
        app.event(&press(KeyCode::Left));
        assert_eq!(app.working_rows(), Some(3));
    }

    #[test]
    fn test_render_smoke_all_pages() {
        let mut app = loaded_app();
        let area = Rect::new(0, 0, 120, 30);
        for code in [KeyCode::Char('1'), KeyCode::Char('2'), KeyCode::Char('3')] {
            app.event(&press(code));
            let mut buf = Buffer::empty(area);
            (&mut app).render(area, &mut buf);
        }
    }
}
