use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::chart::{AnalysisMode, MultivariateMethod};
use crate::config::Theme;
use crate::filter::FilterState;

/// Which sidebar control receives key input on the analysis page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisFocus {
    Brands,
    YearStart,
    YearEnd,
    Mode,
    Primary,
    Secondary,
    Method,
}

impl AnalysisFocus {
    /// Cycle order matches the visual top-to-bottom order of the sidebar.
    /// Selector rows that the current mode does not use are skipped.
    pub fn next(self, mode: AnalysisMode) -> Self {
        match (self, mode) {
            (AnalysisFocus::Brands, _) => AnalysisFocus::YearStart,
            (AnalysisFocus::YearStart, _) => AnalysisFocus::YearEnd,
            (AnalysisFocus::YearEnd, _) => AnalysisFocus::Mode,
            (AnalysisFocus::Mode, AnalysisMode::Multivariate) => AnalysisFocus::Method,
            (AnalysisFocus::Mode, _) => AnalysisFocus::Primary,
            (AnalysisFocus::Primary, AnalysisMode::Bivariate) => AnalysisFocus::Secondary,
            (AnalysisFocus::Primary, _) => AnalysisFocus::Brands,
            (AnalysisFocus::Secondary, _) => AnalysisFocus::Brands,
            (AnalysisFocus::Method, _) => AnalysisFocus::Brands,
        }
    }
}

/// Filter and chart controls for the analysis page.
pub struct Sidebar<'a> {
    pub filter: &'a FilterState,
    pub focus: AnalysisFocus,
    pub mode: AnalysisMode,
    pub primary: Option<&'a str>,
    pub secondary: Option<&'a str>,
    pub method: MultivariateMethod,
    pub brand_list_state: &'a mut ListState,
    pub theme: &'a Theme,
}

impl Sidebar<'_> {
    fn border_color(&self, control: AnalysisFocus) -> ratatui::style::Color {
        if self.focus == control {
            self.theme.get("modal_border_active")
        } else {
            self.theme.get("dimmed")
        }
    }

    fn render_value_row(
        &self,
        area: Rect,
        buf: &mut Buffer,
        control: AnalysisFocus,
        title: &str,
        value: &str,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color(control)))
            .title(format!(" {title} "));
        let inner = block.inner(area);
        block.render(area, buf);

        let style = if self.focus == control {
            Style::default()
                .fg(self.theme.get("primary"))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.get("text_primary"))
        };
        Paragraph::new(Line::from(Span::styled(format!("< {value} >"), style)))
            .render(inner, buf);
    }

    fn render_brands(&mut self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color(AnalysisFocus::Brands)))
            .title(" Brands (space toggle, a all, n none) ");
        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = self
            .filter
            .brands
            .iter()
            .map(|(name, selected)| {
                let marker = if *selected { "[x]" } else { "[ ]" };
                let style = if *selected {
                    Style::default().fg(self.theme.get("primary"))
                } else {
                    Style::default().fg(self.theme.get("text_secondary"))
                };
                ListItem::new(Line::from(Span::styled(format!("{marker} {name}"), style)))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = std::mem::take(self.brand_list_state);
        StatefulWidget::render(list, inner, buf, &mut list_state);
        *self.brand_list_state = list_state;
    }
}

impl Widget for &mut Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let selector_count = match self.mode {
            AnalysisMode::Univariate => 1,
            AnalysisMode::Bivariate => 2,
            AnalysisMode::Multivariate => 1,
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3 * selector_count),
            ])
            .split(area);

        self.render_brands(layout[0], buf);

        let (start, end) = self.filter.year_selected;
        self.render_value_row(
            layout[1],
            buf,
            AnalysisFocus::YearStart,
            "Year from",
            &start.to_string(),
        );
        self.render_value_row(
            layout[2],
            buf,
            AnalysisFocus::YearEnd,
            "Year to",
            &end.to_string(),
        );
        self.render_value_row(layout[3], buf, AnalysisFocus::Mode, "Mode", self.mode.title());

        let selectors = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); selector_count as usize])
            .split(layout[4]);
        match self.mode {
            AnalysisMode::Univariate => {
                self.render_value_row(
                    selectors[0],
                    buf,
                    AnalysisFocus::Primary,
                    "Column",
                    self.primary.unwrap_or("-"),
                );
            }
            AnalysisMode::Bivariate => {
                self.render_value_row(
                    selectors[0],
                    buf,
                    AnalysisFocus::Primary,
                    "X column",
                    self.primary.unwrap_or("-"),
                );
                self.render_value_row(
                    selectors[1],
                    buf,
                    AnalysisFocus::Secondary,
                    "Y column",
                    self.secondary.unwrap_or("-"),
                );
            }
            AnalysisMode::Multivariate => {
                self.render_value_row(
                    selectors[0],
                    buf,
                    AnalysisFocus::Method,
                    "View",
                    self.method.title(),
                );
            }
        }
    }
}
