//! Single-line text input used by every form in the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// State for one text field.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    value: String,
    /// Cursor position (character offset into `value`).
    cursor_pos: usize,
    /// Maximum number of characters, if limited.
    max_len: Option<usize>,
}

impl TextInput {
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when the value is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Replace the whole value and put the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.value = match self.max_len {
            Some(max) => value.chars().take(max).collect(),
            None => value.to_string(),
        };
        self.cursor_pos = self.value.chars().count();
    }

    /// Insert a character at the current cursor position.
    pub fn insert_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            return;
        }
        if let Some(max) = self.max_len {
            if self.value.chars().count() >= max {
                return;
            }
        }
        let byte_pos = self.char_to_byte(self.cursor_pos);
        self.value.insert(byte_pos, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let byte_pos = self.char_to_byte(self.cursor_pos);
            let prev_byte_pos = self.char_to_byte(self.cursor_pos - 1);
            self.value.drain(prev_byte_pos..byte_pos);
            self.cursor_pos -= 1;
        }
    }

    /// Delete the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor_pos < self.value.chars().count() {
            let byte_pos = self.char_to_byte(self.cursor_pos);
            let next_byte_pos = self.char_to_byte(self.cursor_pos + 1);
            self.value.drain(byte_pos..next_byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.value.chars().count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_pos = 0;
    }

    /// Apply an editing key. Returns false if the key is not an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('a') if ctrl => self.move_home(),
            KeyCode::Char('e') if ctrl => self.move_end(),
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    /// Convert a char-based cursor position to a byte offset.
    fn char_to_byte(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Height of a bordered input: border + text line + border.
pub const INPUT_HEIGHT: u16 = 3;

/// How an input should be drawn.
pub struct InputView<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
    /// Render every character as '*'.
    pub masked: bool,
    /// Greyed out and not editable.
    pub disabled: bool,
}

/// Render a bordered input and place the terminal cursor when focused.
pub fn render(area: Rect, frame: &mut Frame, input: &TextInput, view: &InputView) {
    let border_style = if view.disabled {
        Style::default().fg(Color::DarkGray)
    } else if view.focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let border_type = if view.focused && !view.disabled {
        BorderType::Double
    } else {
        BorderType::Plain
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", view.title), border_style));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }
    let line_area = Rect::new(inner.x, inner.y, inner.width, 1);

    if input.value.is_empty() {
        // Placeholder is hidden while focused.
        if !view.focused {
            let truncated: String = view.placeholder.chars().take(inner.width as usize).collect();
            let line = Line::from(Span::styled(truncated, Style::default().fg(Color::DarkGray)));
            frame.render_widget(Paragraph::new(line), line_area);
        }
    } else {
        let shown = if view.masked {
            "*".repeat(input.value.chars().count())
        } else {
            input.value.clone()
        };
        let display = visible_window(&shown, input.cursor_pos, line_area.width as usize);
        let color = if view.disabled { Color::DarkGray } else { Color::White };
        let line = Line::from(Span::styled(display.visible, Style::default().fg(color)));
        frame.render_widget(Paragraph::new(line), line_area);

        if view.focused && !view.disabled {
            frame.set_cursor_position((line_area.x + display.cursor_offset as u16, line_area.y));
        }
        return;
    }

    if view.focused && !view.disabled {
        frame.set_cursor_position((line_area.x, line_area.y));
    }
}

/// The slice of text that fits the field, and the cursor column within it.
struct DisplayText {
    visible: String,
    cursor_offset: usize,
}

/// Scroll horizontally so the cursor stays inside `width` columns.
fn visible_window(text: &str, cursor_pos: usize, width: usize) -> DisplayText {
    if width == 0 {
        return DisplayText {
            visible: String::new(),
            cursor_offset: 0,
        };
    }

    let chars: Vec<char> = text.chars().collect();
    let col = |c: &char| c.width().unwrap_or(0);
    let cursor_col: usize = chars.iter().take(cursor_pos).map(col).sum();

    // Leave one column for the cursor past the last character.
    let avail = width.saturating_sub(1).max(1);

    // Drop characters from the left until the cursor fits.
    let mut start = 0;
    let mut skipped = 0;
    while cursor_col - skipped > avail && start < chars.len() {
        skipped += col(&chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = col(c);
        if used + w > width {
            break;
        }
        visible.push(*c);
        used += w;
    }

    DisplayText {
        visible,
        cursor_offset: cursor_col - skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = TextInput::default();
        for c in "héllo".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.value(), "héllo");
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.value(), "hélo");
        input.delete();
        assert_eq!(input.value(), "héo");
    }

    #[test]
    fn test_max_len() {
        let mut input = TextInput::with_max_len(3);
        for c in "abcdef".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.value(), "abc");
        input.set("0123456");
        assert_eq!(input.value(), "012");
    }

    #[test]
    fn test_is_blank() {
        let mut input = TextInput::default();
        assert!(input.is_blank());
        input.set("  ");
        assert!(input.is_blank());
        input.set(" x ");
        assert!(!input.is_blank());
    }

    #[test]
    fn test_newlines_ignored() {
        let mut input = TextInput::default();
        input.insert_char('a');
        input.insert_char('\n');
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_visible_window_scrolls_to_cursor() {
        let short = visible_window("abc", 3, 10);
        assert_eq!(short.visible, "abc");
        assert_eq!(short.cursor_offset, 3);

        let long = visible_window("abcdefghij", 10, 5);
        assert_eq!(long.cursor_offset, 4);
        assert!(long.visible.starts_with("ghij"));
    }
}
