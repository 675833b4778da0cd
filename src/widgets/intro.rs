use std::borrow::Cow;

use color_eyre::Result;
use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::config::Theme;
use crate::stats::series_mean;

/// Which dataset the preview table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSource {
    Raw,
    Clean,
}

impl PreviewSource {
    pub fn toggle(self) -> Self {
        match self {
            PreviewSource::Raw => PreviewSource::Clean,
            PreviewSource::Clean => PreviewSource::Raw,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PreviewSource::Raw => "Raw data",
            PreviewSource::Clean => "Cleaned data",
        }
    }
}

/// Headline figures for the overview page, computed once from the cleaned
/// dataset at load time.
#[derive(Debug, Clone)]
pub struct IntroMetrics {
    pub total_cars: usize,
    pub mean_price: Option<f64>,
    pub mean_kilometers: Option<f64>,
    pub brand_count: usize,
}

impl IntroMetrics {
    pub fn compute(clean: &DataFrame) -> Result<Self> {
        let brand_count = clean
            .column("Company_Name")?
            .as_materialized_series()
            .n_unique()?;
        Ok(IntroMetrics {
            total_cars: clean.height(),
            mean_price: series_mean(clean.column("Price")?.as_materialized_series()),
            mean_kilometers: series_mean(
                clean.column("Kilometers_Driven")?.as_materialized_series(),
            ),
            brand_count,
        })
    }
}

/// The landing page: four metric tiles over a head() preview of either
/// dataset.
pub struct Intro<'a> {
    pub metrics: &'a IntroMetrics,
    pub raw: &'a DataFrame,
    pub clean: &'a DataFrame,
    pub preview: PreviewSource,
    pub preview_rows: usize,
    pub theme: &'a Theme,
}

impl Intro<'_> {
    fn render_tile(&self, area: Rect, buf: &mut Buffer, label: &str, value: String) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("dimmed")));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        Paragraph::new(value)
            .style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(rows[0], buf);
        Paragraph::new(label)
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .render(rows[1], buf);
    }

    fn render_preview(&self, area: Rect, buf: &mut Buffer) {
        let df = match self.preview {
            PreviewSource::Raw => self.raw,
            PreviewSource::Clean => self.clean,
        };
        let head = df.head(Some(self.preview_rows));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} (p to switch) ", self.preview.title()))
            .border_style(Style::default().fg(self.theme.get("dimmed")));
        let inner = block.inner(area);
        block.render(area, buf);

        let names = head.get_column_names();
        let mut widths: Vec<u16> = names
            .iter()
            .map(|name| name.chars().count() as u16)
            .collect();

        let mut cells: Vec<Vec<Cell>> = vec![vec![]; head.height()];
        for (col_index, series) in head.get_columns().iter().enumerate() {
            for (row_index, row) in cells.iter_mut().enumerate() {
                let value = series.get(row_index).unwrap();
                let val_str: Cow<str> = if matches!(value, AnyValue::Null) {
                    Cow::Borrowed("")
                } else {
                    value.str_value()
                };
                widths[col_index] = widths[col_index].max(val_str.chars().count() as u16);
                row.push(Cell::from(Line::from(val_str.into_owned())));
            }
        }

        let header = Row::new(
            names
                .iter()
                .map(|name| Cell::from(name.to_string()))
                .collect::<Vec<_>>(),
        )
        .style(
            Style::default()
                .fg(self.theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        );
        let rows: Vec<Row> = cells.into_iter().map(Row::new).collect();
        let constraints: Vec<Constraint> = widths.into_iter().map(Constraint::Length).collect();
        Table::new(rows, constraints)
            .header(header)
            .column_spacing(2)
            .render(inner, buf);
    }
}

fn format_mean(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

/// Whole-kilometer average, truncated rather than rounded.
fn format_mean_truncated(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v.trunc() as i64),
        None => "-".to_string(),
    }
}

impl Widget for &Intro<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
            ])
            .split(layout[0]);

        self.render_tile(
            tiles[0],
            buf,
            "Total cars",
            self.metrics.total_cars.to_string(),
        );
        self.render_tile(
            tiles[1],
            buf,
            "Average price",
            format_mean(self.metrics.mean_price, 2),
        );
        self.render_tile(
            tiles[2],
            buf,
            "Average km driven",
            format_mean_truncated(self.metrics.mean_kilometers),
        );
        self.render_tile(
            tiles[3],
            buf,
            "Brands",
            self.metrics.brand_count.to_string(),
        );

        self.render_preview(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_clean() -> DataFrame {
        df!(
            "Company_Name" => ["BrandA", "BrandB", "BrandA"],
            "Price" => [5.0, 10.0, 7.0],
            "Kilometers_Driven" => [40000i64, 52000, 31000],
            "Year" => [2018i64, 2019, 2020],
            "Power_value" => [88.0, 102.0, 95.0],
            "Fuel_Type" => ["Petrol", "Diesel", "Petrol"],
            "Transmission" => ["Manual", "Automatic", "Manual"],
        )
        .unwrap()
    }

    #[test]
    fn test_metrics() {
        let metrics = IntroMetrics::compute(&sample_clean()).unwrap();
        assert_eq!(metrics.total_cars, 3);
        assert_eq!(metrics.brand_count, 2);
        assert!((metrics.mean_price.unwrap() - 22.0 / 3.0).abs() < 1e-9);
        assert!((metrics.mean_kilometers.unwrap() - 41000.0).abs() < 1e-9);
    }

    #[test]
    fn test_km_average_truncates() {
        assert_eq!(format_mean_truncated(Some(41000.9)), "41000");
        assert_eq!(format_mean_truncated(None), "-");
    }

    #[test]
    fn test_preview_toggle() {
        assert_eq!(PreviewSource::Raw.toggle(), PreviewSource::Clean);
        assert_eq!(PreviewSource::Clean.toggle(), PreviewSource::Raw);
    }

    #[test]
    fn test_render_shows_metrics_and_preview() {
        let clean = sample_clean();
        let metrics = IntroMetrics::compute(&clean).unwrap();
        let intro = Intro {
            metrics: &metrics,
            raw: &clean,
            clean: &clean,
            preview: PreviewSource::Clean,
            preview_rows: 10,
            theme: &Theme::default(),
        };
        let area = Rect::new(0, 0, 120, 20);
        let mut buf = Buffer::empty(area);
        (&intro).render(area, &mut buf);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Total cars"));
        assert!(content.contains("Cleaned data"));
        assert!(content.contains("Company_Name"));
    }
}
