use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Operational counters shown when `--debug` is passed. Log output would
/// corrupt the TUI, so diagnostics render on screen instead.
#[derive(Default)]
pub struct DebugState {
    pub enabled: bool,
    pub events: u64,
    pub renders: u64,
    pub last_key: Option<String>,
}

impl DebugState {
    pub fn record_event(&mut self) {
        self.events += 1;
    }

    pub fn record_render(&mut self) {
        self.renders += 1;
    }

    pub fn record_key(&mut self, key: String) {
        self.last_key = Some(key);
    }

    /// Render the overlay into the top-right corner of `area`.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if !self.enabled {
            return;
        }
        let width = 28u16.min(area.width);
        let height = 5u16.min(area.height);
        let overlay = Rect::new(area.right().saturating_sub(width), area.top(), width, height);

        let text = format!(
            "events: {}\nrenders: {}\nlast key: {}",
            self.events,
            self.renders,
            self.last_key.as_deref().unwrap_or("-")
        );
        Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(" debug "))
            .render(overlay, buf);
    }
}
