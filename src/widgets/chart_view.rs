use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, Widget,
    },
};

use crate::chart::{BoxStats, ChartData};
use crate::config::Theme;
use crate::stats::CorrelationMatrix;

/// Renders whichever chart archetype the selector produced.
pub struct ChartView<'a> {
    pub data: &'a ChartData,
    pub theme: &'a Theme,
}

fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn correlation_color(correlation: f64, theme: &Theme) -> Color {
    let abs_corr = correlation.abs();
    if correlation.is_nan() || abs_corr < 0.05 {
        theme.get("dimmed")
    } else if abs_corr < 0.3 {
        theme.get("text_primary")
    } else if correlation > 0.0 {
        theme.get("primary")
    } else {
        theme.get("negative")
    }
}

/// One text row of a box plot: whiskers from min to max, a filled box from
/// q1 to q3 and the median marked inside it. `lo`/`hi` are the shared scale
/// across all groups.
fn box_row(stats: &BoxStats, lo: f64, hi: f64, width: usize) -> String {
    if width < 3 || hi <= lo {
        return "─".repeat(width.max(1));
    }
    let span = hi - lo;
    let pos = |v: f64| {
        (((v - lo) / span) * (width - 1) as f64)
            .round()
            .clamp(0.0, (width - 1) as f64) as usize
    };
    let (p_min, p_q1, p_med, p_q3, p_max) = (
        pos(stats.min),
        pos(stats.q1),
        pos(stats.median),
        pos(stats.q3),
        pos(stats.max),
    );

    let mut chars = vec![' '; width];
    for c in chars.iter_mut().take(p_max + 1).skip(p_min) {
        *c = '─';
    }
    for c in chars.iter_mut().take(p_q3 + 1).skip(p_q1) {
        *c = '█';
    }
    chars[p_min] = '├';
    chars[p_max] = '┤';
    chars[p_med] = '┃';
    chars.into_iter().collect()
}

impl ChartView<'_> {
    fn render_no_data(&self, reason: &str, area: Rect, buf: &mut Buffer) {
        Paragraph::new(reason.to_string())
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .centered()
            .render(area, buf);
    }

    fn render_category_counts(
        &self,
        column: &str,
        entries: &[(String, u64)],
        area: Rect,
        buf: &mut Buffer,
    ) {
        let bars: Vec<Bar> = entries
            .iter()
            .map(|(label, count)| {
                Bar::default()
                    .value(*count)
                    .label(Line::from(label.as_str()))
                    .style(Style::default().fg(self.theme.get("chart_series_1")))
                    .value_style(
                        Style::default()
                            .fg(self.theme.get("text_inverse"))
                            .bg(self.theme.get("chart_series_1")),
                    )
            })
            .collect();
        BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Count of {column} ")),
            )
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }

    fn render_histogram(
        &self,
        column: &str,
        bins: &[(f64, u64)],
        bin_width: f64,
        density: &[(f64, f64)],
        area: Rect,
        buf: &mut Buffer,
    ) {
        if bins.is_empty() {
            self.render_no_data("No numeric values to bin", area, buf);
            return;
        }
        // Bars draw at bin centers so they sit inside their bin boundaries.
        let bar_points: Vec<(f64, f64)> = bins
            .iter()
            .map(|&(lower, count)| (lower + bin_width / 2.0, count as f64))
            .collect();

        let x_min = bins[0].0;
        let x_max = bins[bins.len() - 1].0 + bin_width;
        let y_max = bar_points
            .iter()
            .map(|&(_, y)| y)
            .chain(density.iter().map(|&(_, y)| y))
            .fold(1.0_f64, f64::max);

        let mut datasets = vec![Dataset::default()
            .name("count")
            .marker(symbols::Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(self.theme.get("chart_series_1")))
            .data(&bar_points)];
        if !density.is_empty() {
            datasets.push(
                Dataset::default()
                    .name("density")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.get("chart_series_2")))
                    .data(density),
            );
        }

        let axis_label_style = Style::default().fg(self.theme.get("text_primary"));
        let x_labels = vec![
            Span::styled(format_axis_label(x_min), axis_label_style),
            Span::styled(format_axis_label((x_min + x_max) / 2.0), axis_label_style),
            Span::styled(format_axis_label(x_max), axis_label_style),
        ];
        let y_labels = vec![
            Span::styled("0", axis_label_style),
            Span::styled(format_axis_label(y_max / 2.0), axis_label_style),
            Span::styled(format_axis_label(y_max), axis_label_style),
        ];

        Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Distribution of {column} ")),
            )
            .x_axis(
                Axis::default()
                    .bounds([x_min, x_max])
                    .style(axis_label_style)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .style(axis_label_style)
                    .labels(y_labels),
            )
            .render(area, buf);
    }

    fn render_scatter(
        &self,
        x: &str,
        y: &str,
        points: &[(f64, f64)],
        correlation: Option<f64>,
        area: Rect,
        buf: &mut Buffer,
    ) {
        if points.is_empty() {
            self.render_no_data("No paired numeric values", area, buf);
            return;
        }
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in points {
            x_min = x_min.min(px);
            x_max = x_max.max(px);
            y_min = y_min.min(py);
            y_max = y_max.max(py);
        }
        if x_max <= x_min {
            x_min -= 0.5;
            x_max += 0.5;
        }
        if y_max <= y_min {
            y_min -= 0.5;
            y_max += 0.5;
        }

        let title = match correlation {
            Some(r) => format!(" {x} vs {y} (r = {r:.3}) "),
            None => format!(" {x} vs {y} "),
        };
        let axis_label_style = Style::default().fg(self.theme.get("text_primary"));
        let x_labels = vec![
            Span::styled(format_axis_label(x_min), axis_label_style),
            Span::styled(format_axis_label((x_min + x_max) / 2.0), axis_label_style),
            Span::styled(format_axis_label(x_max), axis_label_style),
        ];
        let y_labels = vec![
            Span::styled(format_axis_label(y_min), axis_label_style),
            Span::styled(format_axis_label((y_min + y_max) / 2.0), axis_label_style),
            Span::styled(format_axis_label(y_max), axis_label_style),
        ];

        let datasets = vec![Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(self.theme.get("chart_series_1")))
            .data(points)];
        Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .bounds([x_min, x_max])
                    .style(axis_label_style)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .bounds([y_min, y_max])
                    .style(axis_label_style)
                    .labels(y_labels),
            )
            .render(area, buf);
    }

    fn render_box_plot(&self, x: &str, y: &str, groups: &[BoxStats], area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {y} by {x} "));
        let inner = block.inner(area);
        block.render(area, buf);
        if groups.is_empty() {
            self.render_no_data("No groups with numeric values", inner, buf);
            return;
        }

        let lo = groups.iter().map(|g| g.min).fold(f64::INFINITY, f64::min);
        let hi = groups
            .iter()
            .map(|g| g.max)
            .fold(f64::NEG_INFINITY, f64::max);
        let label_width = groups
            .iter()
            .map(|g| g.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(inner.width as usize / 3);
        let plot_width = (inner.width as usize).saturating_sub(label_width + 2);

        let mut lines: Vec<Line> = Vec::new();
        for group in groups {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:>label_width$}  ", group.label),
                    Style::default().fg(self.theme.get("text_primary")),
                ),
                Span::styled(
                    box_row(group, lo, hi, plot_width),
                    Style::default().fg(self.theme.get("chart_series_1")),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "{:>label_width$}  median {} (n={})",
                    "",
                    format_axis_label(group.median),
                    group.count
                ),
                Style::default().fg(self.theme.get("text_secondary")),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "{:>label_width$}  {} .. {}",
                "",
                format_axis_label(lo),
                format_axis_label(hi)
            ),
            Style::default().fg(self.theme.get("dimmed")),
        )));
        Paragraph::new(lines).render(inner, buf);
    }

    fn render_grouped_bars(
        &self,
        title: String,
        group_labels: &[String],
        series_labels: &[String],
        values: &[Vec<(u64, Option<String>)>],
        area: Rect,
        buf: &mut Buffer,
    ) {
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(inner);

        let series_keys = ["chart_series_1", "chart_series_2", "chart_series_3"];
        let series_color =
            |i: usize| self.theme.get(series_keys[i.min(series_keys.len() - 1)]);

        let mut legend: Vec<Span> = Vec::new();
        for (i, label) in series_labels.iter().enumerate() {
            if i > 0 {
                legend.push(Span::raw("  "));
            }
            legend.push(Span::styled(
                format!("■ {label}"),
                Style::default().fg(series_color(i)),
            ));
        }
        Paragraph::new(Line::from(legend)).render(layout[0], buf);

        let group_count = group_labels.len().max(1) as u16;
        let series_count = series_labels.len().max(1) as u16;
        let bar_width = (layout[1].width / (group_count * (series_count + 1))).clamp(1, 9);
        let mut chart = BarChart::default()
            .bar_width(bar_width)
            .bar_gap(1)
            .group_gap(2);
        for (label, row) in group_labels.iter().zip(values.iter()) {
            let bars: Vec<Bar> = row
                .iter()
                .enumerate()
                .map(|(i, (value, text))| {
                    let mut bar = Bar::default()
                        .value(*value)
                        .style(Style::default().fg(series_color(i)))
                        .value_style(
                            Style::default()
                                .fg(self.theme.get("text_inverse"))
                                .bg(series_color(i)),
                        );
                    if let Some(text) = text {
                        bar = bar.text_value(text.clone());
                    }
                    bar
                })
                .collect();
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(Span::styled(
                        label.as_str(),
                        Style::default().fg(self.theme.get("text_primary")),
                    )))
                    .bars(&bars),
            );
        }
        chart.render(layout[1], buf);
    }

    fn render_heatmap(&self, matrix: &CorrelationMatrix, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Correlation matrix ");
        let inner = block.inner(area);
        block.render(area, buf);

        if matrix.columns.is_empty() {
            self.render_no_data("Need at least 2 numeric columns", inner, buf);
            return;
        }

        let row_header_width = matrix
            .columns
            .iter()
            .map(|c| c.chars().count() as u16)
            .max()
            .unwrap_or(0)
            .clamp(6, 20);
        let cell_width = 7u16;

        let header_style = Style::default()
            .fg(self.theme.get("table_header"))
            .add_modifier(Modifier::BOLD);
        let mut header_cells = vec![Cell::from("")];
        for name in &matrix.columns {
            header_cells.push(Cell::from(name.as_str()).style(header_style));
        }
        let header_row = Row::new(header_cells);

        let mut rows = Vec::new();
        for (i, name) in matrix.columns.iter().enumerate() {
            let mut cells = vec![Cell::from(name.as_str()).style(header_style)];
            for (j, &correlation) in matrix.correlations[i].iter().enumerate() {
                let text = if i == j {
                    "1.00".to_string()
                } else if correlation.is_nan() {
                    "-".to_string()
                } else {
                    format!("{correlation:.2}")
                };
                cells.push(
                    Cell::from(text)
                        .style(Style::default().fg(correlation_color(correlation, self.theme))),
                );
            }
            rows.push(Row::new(cells));
        }

        let mut constraints = vec![Constraint::Length(row_header_width)];
        constraints.extend(vec![Constraint::Length(cell_width); matrix.columns.len()]);
        Table::new(rows, constraints)
            .header(header_row)
            .column_spacing(1)
            .render(inner, buf);
    }
}

impl Widget for &ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.data {
            ChartData::NoData { reason } => self.render_no_data(reason, area, buf),
            ChartData::CategoryCounts { column, entries } => {
                self.render_category_counts(column, entries, area, buf)
            }
            ChartData::Histogram {
                column,
                bins,
                bin_width,
                density,
            } => self.render_histogram(column, bins, *bin_width, density, area, buf),
            ChartData::Scatter {
                x,
                y,
                points,
                correlation,
            } => self.render_scatter(x, y, points, *correlation, area, buf),
            ChartData::BoxPlot { x, y, groups } => self.render_box_plot(x, y, groups, area, buf),
            ChartData::GroupedCounts {
                x,
                hue,
                x_labels,
                hue_labels,
                counts,
            } => {
                let values: Vec<Vec<(u64, Option<String>)>> = counts
                    .iter()
                    .map(|row| row.iter().map(|&c| (c, None)).collect())
                    .collect();
                self.render_grouped_bars(
                    format!(" Count of {x} by {hue} "),
                    x_labels,
                    hue_labels,
                    &values,
                    area,
                    buf,
                );
            }
            ChartData::CorrelationHeatmap { matrix } => self.render_heatmap(matrix, area, buf),
            ChartData::FuelVsPrice {
                fuels,
                transmissions,
                mean_price,
            } => {
                let values: Vec<Vec<(u64, Option<String>)>> = mean_price
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|mean| match mean {
                                Some(v) => (v.round().max(0.0) as u64, Some(format!("{v:.2}"))),
                                None => (0, Some("-".to_string())),
                            })
                            .collect()
                    })
                    .collect();
                self.render_grouped_bars(
                    " Mean price by fuel and transmission ".to_string(),
                    fuels,
                    transmissions,
                    &values,
                    area,
                    buf,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_contains(data: &ChartData, needle: &str) -> bool {
        let theme = Theme::default();
        let view = ChartView { data, theme: &theme };
        let area = Rect::new(0, 0, 100, 24);
        let mut buf = Buffer::empty(area);
        (&view).render(area, &mut buf);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        content.contains(needle)
    }

    #[test]
    fn test_box_row_positions() {
        let stats = BoxStats {
            label: "Petrol".to_string(),
            min: 0.0,
            q1: 2.5,
            median: 5.0,
            q3: 7.5,
            max: 10.0,
            count: 10,
        };
        let row = box_row(&stats, 0.0, 10.0, 21);
        assert_eq!(row.chars().count(), 21);
        let chars: Vec<char> = row.chars().collect();
        assert_eq!(chars[0], '├');
        assert_eq!(chars[20], '┤');
        assert_eq!(chars[10], '┃');
        assert_eq!(chars[5], '█');
        assert_eq!(chars[15], '█');
        assert_eq!(chars[2], '─');
    }

    #[test]
    fn test_box_row_degenerate_scale() {
        let stats = BoxStats {
            label: "x".to_string(),
            min: 3.0,
            q1: 3.0,
            median: 3.0,
            q3: 3.0,
            max: 3.0,
            count: 4,
        };
        assert_eq!(box_row(&stats, 3.0, 3.0, 10).chars().count(), 10);
    }

    #[test]
    fn test_no_data_renders_reason() {
        let data = ChartData::NoData {
            reason: "No rows match the current filters".to_string(),
        };
        assert!(view_contains(&data, "No rows match"));
    }

    #[test]
    fn test_scatter_title_shows_correlation() {
        let data = ChartData::Scatter {
            x: "Power_value".to_string(),
            y: "Price".to_string(),
            points: vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)],
            correlation: Some(1.0),
        };
        assert!(view_contains(&data, "r = 1.000"));
    }

    #[test]
    fn test_heatmap_diagonal() {
        let data = ChartData::CorrelationHeatmap {
            matrix: CorrelationMatrix {
                columns: vec!["Price".to_string(), "Year".to_string()],
                correlations: vec![vec![1.0, 0.42], vec![0.42, 1.0]],
            },
        };
        assert!(view_contains(&data, "0.42"));
    }

    #[test]
    fn test_fuel_vs_price_missing_combination() {
        let data = ChartData::FuelVsPrice {
            fuels: vec!["Petrol".to_string()],
            transmissions: vec!["Manual".to_string(), "Automatic".to_string()],
            mean_price: vec![vec![Some(6.0), None]],
        };
        assert!(view_contains(&data, "6.00"));
    }
}
