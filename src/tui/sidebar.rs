//! Conversation history panel: new-conversation field plus the conversation list.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Frame,
};

use super::input::{self, InputView, TextInput, INPUT_HEIGHT};
use crate::models::Conversation;

/// Width of the history panel when shown.
pub const SIDEBAR_WIDTH: u16 = 30;

/// Sidebar state: the user's conversations and the list cursor.
#[derive(Debug, Default)]
pub struct HistoryState {
    pub conversations: Vec<Conversation>,
    /// Index into `conversations`.
    pub selected: usize,
    /// Whether the panel is shown. Starts hidden.
    pub visible: bool,
}

impl HistoryState {
    /// Replace the list with a fresh server copy.
    pub fn replace(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.clamp_selection();
    }

    /// Append a newly created conversation.
    pub fn push(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.conversations.len() {
            self.selected += 1;
        }
    }

    /// Id of the conversation under the cursor.
    pub fn selected_id(&self) -> Option<i64> {
        self.conversations.get(self.selected).map(|c| c.id)
    }

    pub fn title_of(&self, conversation_id: i64) -> Option<&str> {
        self.conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .map(|c| c.title.as_str())
    }

    /// Clamp selected index to valid range after structural changes.
    fn clamp_selection(&mut self) {
        if self.selected >= self.conversations.len() {
            self.selected = self.conversations.len().saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What the panel needs besides its own state.
pub struct SidebarView<'a> {
    pub title_input: &'a TextInput,
    pub title_focused: bool,
    pub list_focused: bool,
    pub current: Option<i64>,
}

/// Render the history panel into the given area.
pub fn render(area: Rect, frame: &mut Frame, state: &HistoryState, view: &SidebarView) {
    let focused = view.title_focused || view.list_focused;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(border_style)
        .title(Span::styled(
            " Conversation History ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let [title_area, list_area] =
        Layout::vertical([Constraint::Length(INPUT_HEIGHT), Constraint::Fill(1)]).areas(inner);

    input::render(
        title_area,
        frame,
        view.title_input,
        &InputView {
            title: "+",
            placeholder: "New Conversation",
            focused: view.title_focused,
            masked: false,
            disabled: false,
        },
    );

    render_list(list_area, frame.buffer_mut(), state, view);
}

fn render_list(area: Rect, buf: &mut Buffer, state: &HistoryState, view: &SidebarView) {
    let available_height = area.height as usize;
    if available_height == 0 || area.width == 0 {
        return;
    }

    if state.conversations.is_empty() {
        let line = Line::from(Span::styled(
            " (no conversations)",
            Style::default().fg(Color::DarkGray),
        ));
        Paragraph::new(line).render(Rect::new(area.x, area.y, area.width, 1), buf);
        return;
    }

    let scroll_offset =
        compute_scroll_offset(state.selected, available_height, state.conversations.len());

    for (row_idx, idx) in (scroll_offset..state.conversations.len())
        .take(available_height)
        .enumerate()
    {
        let conv = &state.conversations[idx];
        let selected = view.list_focused && idx == state.selected;
        let is_current = view.current == Some(conv.id);

        let cursor = if selected { "\u{25BA}" } else { " " };
        let marker = if is_current { "*" } else { " " };
        let label = format!("{}{} {}", cursor, marker, conv.title);
        let badge = if selected { "[d]" } else { "" };

        let style = if selected {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else if is_current {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        let badge_style = style.fg(Color::Red);

        let row_area = Rect::new(area.x, area.y + row_idx as u16, area.width, 1);
        render_row(buf, row_area, &label, badge, style, badge_style);
    }
}

/// Simple scroll offset: keep selected item visible.
fn compute_scroll_offset(selected: usize, height: usize, total: usize) -> usize {
    if total <= height || selected < height {
        return 0;
    }
    let max_offset = total.saturating_sub(height);
    selected.saturating_sub(height - 1).min(max_offset)
}

/// Render a row with left-aligned text and an optional right-aligned badge.
fn render_row(
    buf: &mut Buffer,
    area: Rect,
    left: &str,
    badge: &str,
    text_style: Style,
    badge_style: Style,
) {
    let width = area.width as usize;
    if width == 0 {
        return;
    }

    let badge_len = badge.chars().count();
    let max_left = if badge_len > 0 {
        width.saturating_sub(badge_len + 1)
    } else {
        width
    };

    let left_truncated: String = left.chars().take(max_left).collect();
    let pad = width.saturating_sub(left_truncated.chars().count() + badge_len);

    let line = Line::from(vec![
        Span::styled(left_truncated, text_style),
        Span::styled(" ".repeat(pad), text_style),
        Span::styled(badge.to_string(), badge_style),
    ]);

    Paragraph::new(line).render(area, buf);
}
