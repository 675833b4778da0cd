use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::config::Theme;
use crate::insights::Insights;

/// The summary page: headline facts over the full cleaned dataset plus the
/// written takeaways. Always computed from the unfiltered data.
pub struct InsightsView<'a> {
    pub insights: &'a Insights,
    pub theme: &'a Theme,
}

const CONCLUSIONS: &[&str] = &[
    "Engine power is the strongest lever on asking price; listings with high \
     power values command a clear premium.",
    "Newer model years hold their value; price falls off steadily with age \
     and with kilometers driven.",
    "Automatic transmissions are concentrated in the upper price bands, while \
     manual cars dominate the budget segment.",
    "A small set of brands accounts for most of the premium listings; the \
     long tail of brands competes on price.",
];

impl InsightsView<'_> {
    fn fact_line<'b>(&self, label: &'b str, value: Option<&'b str>) -> Line<'b> {
        Line::from(vec![
            Span::styled(
                format!("{label}: "),
                Style::default().fg(self.theme.get("text_secondary")),
            ),
            Span::styled(
                value.unwrap_or("no data").to_string(),
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

impl Widget for &InsightsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(4)])
            .split(area);

        let facts_block = Block::default()
            .borders(Borders::ALL)
            .title(" Key insights (full dataset) ")
            .border_style(Style::default().fg(self.theme.get("dimmed")));
        let facts_inner = facts_block.inner(layout[0]);
        facts_block.render(layout[0], buf);

        let total = self.insights.total_records.to_string();
        let facts = vec![
            self.fact_line("Records analyzed", Some(&total)),
            self.fact_line(
                "Most expensive brand",
                self.insights.most_expensive_brand.as_deref(),
            ),
            self.fact_line(
                "Most common fuel type",
                self.insights.most_common_fuel.as_deref(),
            ),
            self.fact_line(
                "Strongest price driver",
                self.insights.strongest_price_driver.as_deref(),
            ),
        ];
        Paragraph::new(facts).render(facts_inner, buf);

        let conclusions_block = Block::default()
            .borders(Borders::ALL)
            .title(" Takeaways ")
            .border_style(Style::default().fg(self.theme.get("dimmed")));
        let conclusions_inner = conclusions_block.inner(layout[1]);
        conclusions_block.render(layout[1], buf);

        let mut lines: Vec<Line> = Vec::new();
        for conclusion in CONCLUSIONS {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(self.theme.get("secondary"))),
                Span::styled(
                    *conclusion,
                    Style::default().fg(self.theme.get("text_primary")),
                ),
            ]));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(conclusions_inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_facts_and_fallbacks() {
        let insights = Insights {
            total_records: 120,
            most_expensive_brand: Some("BrandA".to_string()),
            most_common_fuel: None,
            strongest_price_driver: Some("Power_value".to_string()),
        };
        let theme = Theme::default();
        let view = InsightsView {
            insights: &insights,
            theme: &theme,
        };
        let area = Rect::new(0, 0, 100, 20);
        let mut buf = Buffer::empty(area);
        (&view).render(area, &mut buf);
        let content: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("120"));
        assert!(content.contains("BrandA"));
        assert!(content.contains("no data"));
        assert!(content.contains("Power_value"));
    }
}
