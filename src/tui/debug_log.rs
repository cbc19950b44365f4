//! Debug log pane: captured tracing output, toggled with F12.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing::Level;

use super::log_capture::LogBuffer;

/// Scrollback kept by the pane.
const MAX_LINES: usize = 1000;

/// Rows the pane takes when visible.
pub const DEBUG_LOG_HEIGHT: u16 = 8;

pub struct DebugLogState {
    source: LogBuffer,
    lines: Vec<String>,
    pub visible: bool,
    /// Lines scrolled up from the newest entry.
    scroll_offset: usize,
}

impl DebugLogState {
    pub fn new(source: LogBuffer) -> Self {
        Self {
            source,
            lines: Vec::new(),
            visible: false,
            scroll_offset: 0,
        }
    }

    /// Pull new lines from the capture buffer. Call once per frame.
    pub fn refresh(&mut self) {
        self.lines.extend(self.source.drain());
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
            self.scroll_offset = self.scroll_offset.saturating_sub(excess);
        }
    }

    /// Show or hide the pane. Opening jumps to the newest line.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll_offset = 0;
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max_offset = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max_offset);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }
}

pub fn render(area: Rect, buf: &mut Buffer, state: &DebugLogState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Debug Log ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let end = state.lines.len().saturating_sub(state.scroll_offset);
    let start = end.saturating_sub(inner.height as usize);

    let lines: Vec<Line> = state.lines[start..end]
        .iter()
        .map(|line| {
            let color = match line_level(line) {
                Some(Level::ERROR) => Color::Red,
                Some(Level::WARN) => Color::Yellow,
                Some(Level::INFO) => Color::Green,
                Some(_) => Color::DarkGray,
                None => Color::White,
            };
            Line::from(Span::styled(line.clone(), Style::default().fg(color)))
        })
        .collect();

    Paragraph::new(lines).render(inner, buf);
}

/// Level of a fmt-layer line such as "2024-01-15T10:30:00Z  WARN message".
fn line_level(line: &str) -> Option<Level> {
    line.split_whitespace().take(3).find_map(|word| match word {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    })
}
