//! Chat view: message log, compose box and the conversation history panel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::backend::BackendCommand;
use super::input::{self, InputView, TextInput, INPUT_HEIGHT};
use super::sidebar::{self, HistoryState, SidebarView, SIDEBAR_WIDTH};
use crate::api::ApiError;
use crate::models::{ChatMessage, Conversation, ConversationContext, MessageKind};

/// Longest conversation title the form accepts.
pub const MAX_TITLE_LEN: usize = 20;

/// Lines scrolled per PageUp/PageDown.
const PAGE_SCROLL: usize = 10;

/// Which part of the chat view receives keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    #[default]
    Compose,
    History,
    Title,
}

#[derive(Debug)]
pub struct ChatState {
    pub user_id: i64,
    /// Conversation whose messages are shown.
    pub current_conversation: Option<i64>,
    pub chat_log: Vec<ChatMessage>,
    pub history: HistoryState,
    pub compose: TextInput,
    pub title: TextInput,
    /// Set while a send is in flight; blocks a second send.
    pub is_loading: bool,
    pub focus: ChatFocus,
    /// Lines scrolled up from the newest message (0 = follow the bottom).
    pub scroll_offset: usize,
}

impl ChatState {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            current_conversation: None,
            chat_log: Vec::new(),
            history: HistoryState::default(),
            compose: TextInput::default(),
            title: TextInput::with_max_len(MAX_TITLE_LEN),
            is_loading: false,
            focus: ChatFocus::default(),
            scroll_offset: 0,
        }
    }

    /// Entering the view loads the context unless a conversation is already open.
    pub fn mount(&self) -> Option<BackendCommand> {
        if self.current_conversation.is_some() {
            return None;
        }
        Some(self.reload())
    }

    fn reload(&self) -> BackendCommand {
        BackendCommand::LoadContext {
            user_id: self.user_id,
        }
    }

    /// Apply a full reload. Failures fall back to an empty view.
    pub fn apply_context(&mut self, result: Result<ConversationContext, ApiError>) {
        match result {
            Ok(ctx) => {
                self.current_conversation = ctx.latest.map(|c| c.id);
                self.set_log(ctx.messages);
                self.history.replace(ctx.conversations);
            }
            Err(e) => {
                tracing::warn!("Loading conversations failed: {}", e);
                self.current_conversation = None;
                self.set_log(Vec::new());
                self.history.replace(Vec::new());
            }
        }
    }

    fn set_log(&mut self, messages: Vec<ChatMessage>) {
        self.chat_log = messages;
        self.scroll_offset = 0;
    }

    fn append(&mut self, message: ChatMessage) {
        self.chat_log.push(message);
        self.scroll_offset = 0;
    }

    /// Start a send: store the message, then request a reply.
    ///
    /// Ignored while a send is in flight, for blank input, and when no
    /// conversation is open.
    pub fn submit_message(&mut self) -> Option<BackendCommand> {
        if self.is_loading || self.compose.is_blank() {
            return None;
        }
        let conversation_id = match self.current_conversation {
            Some(id) => id,
            None => {
                tracing::warn!("No conversation selected; create one first");
                return None;
            }
        };

        self.is_loading = true;
        Some(BackendCommand::SendMessage {
            conversation_id,
            body: self.compose.value().to_string(),
        })
    }

    /// First half of a send. A failed store shows as a placeholder message.
    pub fn message_stored(&mut self, conversation_id: i64, result: Result<ChatMessage, ApiError>) {
        let message = result.unwrap_or_else(|e| {
            tracing::warn!("Storing message failed: {}", e);
            ChatMessage::missing(conversation_id)
        });
        self.append(message);
    }

    /// Second half of a send: append the reply and release the input.
    pub fn reply_received(&mut self, conversation_id: i64, result: Result<ChatMessage, ApiError>) {
        let message = result.unwrap_or_else(|e| {
            tracing::warn!("Generating response failed: {}", e);
            ChatMessage::missing(conversation_id)
        });
        self.append(message);
        self.compose.clear();
        self.is_loading = false;
    }

    /// Create a conversation from the title field, if it isn't blank.
    pub fn submit_title(&mut self) -> Option<BackendCommand> {
        if self.title.is_blank() {
            return None;
        }
        Some(BackendCommand::CreateConversation {
            user_id: self.user_id,
            title: self.title.value().to_string(),
        })
    }

    pub fn conversation_created(&mut self, result: Result<Conversation, ApiError>) {
        match result {
            Ok(conv) => {
                tracing::info!("Created conversation {} ({})", conv.title, conv.id);
                self.history.push(conv);
            }
            Err(e) => tracing::warn!("Creating conversation failed: {}", e),
        }
        self.title.clear();
    }

    /// Delete the conversation under the history cursor.
    pub fn delete_selected(&self) -> Option<BackendCommand> {
        self.history
            .selected_id()
            .map(|conversation_id| BackendCommand::DeleteConversation { conversation_id })
    }

    /// A successful delete reloads everything from the server.
    pub fn conversation_deleted(
        &mut self,
        conversation_id: i64,
        result: Result<(), ApiError>,
    ) -> Option<BackendCommand> {
        match result {
            Ok(()) => {
                tracing::info!("Deleted conversation {}", conversation_id);
                Some(self.reload())
            }
            Err(e) => {
                tracing::warn!("Deleting conversation {} failed: {}", conversation_id, e);
                None
            }
        }
    }

    /// Open the conversation under the history cursor.
    pub fn switch_to_selected(&mut self) -> Option<BackendCommand> {
        let conversation_id = self.history.selected_id()?;
        self.current_conversation = Some(conversation_id);
        Some(BackendCommand::LoadMessages { conversation_id })
    }

    /// Replace the log on success; keep it on failure.
    pub fn messages_loaded(&mut self, conversation_id: i64, result: Result<Vec<ChatMessage>, ApiError>) {
        match result {
            Ok(messages) => self.set_log(messages),
            Err(e) => tracing::warn!("Loading conversation {} failed: {}", conversation_id, e),
        }
    }

    pub fn toggle_history(&mut self) {
        self.history.toggle();
        if !self.history.visible {
            self.focus = ChatFocus::Compose;
        }
    }

    fn cycle_focus(&mut self) {
        self.focus = match (self.focus, self.history.visible) {
            (ChatFocus::Compose, true) => ChatFocus::History,
            (ChatFocus::History, _) => ChatFocus::Title,
            _ => ChatFocus::Compose,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('h') if ctrl => {
                self.toggle_history();
                return None;
            }
            KeyCode::Tab => {
                self.cycle_focus();
                return None;
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(PAGE_SCROLL);
                return None;
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_SCROLL);
                return None;
            }
            _ => {}
        }

        match self.focus {
            ChatFocus::Compose => {
                if key.code == KeyCode::Enter {
                    return self.submit_message();
                }
                if !self.is_loading {
                    self.compose.handle_key(key);
                }
                None
            }
            ChatFocus::History => match key.code {
                KeyCode::Up => {
                    self.history.move_up();
                    None
                }
                KeyCode::Down => {
                    self.history.move_down();
                    None
                }
                KeyCode::Enter => self.switch_to_selected(),
                KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
                _ => None,
            },
            ChatFocus::Title => {
                if key.code == KeyCode::Enter {
                    return self.submit_title();
                }
                self.title.handle_key(key);
                None
            }
        }
    }

    fn conversation_header(&self) -> String {
        match self.current_conversation {
            Some(id) => self
                .history
                .title_of(id)
                .map(String::from)
                .unwrap_or_else(|| format!("Conversation {}", id)),
            None => "(no conversation)".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(area: Rect, frame: &mut Frame, state: &ChatState) {
    let content_area = if state.history.visible {
        let [sidebar_area, content_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
                .areas(area);
        sidebar::render(
            sidebar_area,
            frame,
            &state.history,
            &SidebarView {
                title_input: &state.title,
                title_focused: state.focus == ChatFocus::Title,
                list_focused: state.focus == ChatFocus::History,
                current: state.current_conversation,
            },
        );
        content_area
    } else {
        area
    };

    let [messages_area, compose_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(INPUT_HEIGHT)])
            .areas(content_area);

    render_messages(messages_area, frame.buffer_mut(), state);

    let title = if state.is_loading {
        "DocGenie is thinking..."
    } else {
        "Message"
    };
    input::render(
        compose_area,
        frame,
        &state.compose,
        &InputView {
            title,
            placeholder: "Enter your message",
            focused: state.focus == ChatFocus::Compose,
            masked: false,
            disabled: state.is_loading,
        },
    );
}

/// Render the message log with the conversation title on top.
fn render_messages(area: Rect, buf: &mut Buffer, state: &ChatState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let header_area = Rect::new(inner.x, inner.y, inner.width, 1);
    let header = Line::from(Span::styled(
        format!(" {} ", state.conversation_header()),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    Paragraph::new(header)
        .style(Style::default().bg(Color::DarkGray))
        .render(header_area, buf);

    let log_area = Rect::new(
        inner.x,
        inner.y + 1,
        inner.width,
        inner.height.saturating_sub(1),
    );
    if log_area.height == 0 {
        return;
    }

    let lines = build_message_lines(&state.chat_log, log_area.width as usize);
    let visible = log_area.height as usize;

    // scroll_offset counts from the bottom.
    let max_offset = lines.len().saturating_sub(visible);
    let offset = state.scroll_offset.min(max_offset);
    let end = lines.len() - offset;
    let start = end.saturating_sub(visible);

    for (row, line) in lines[start..end].iter().enumerate() {
        let line_area = Rect::new(log_area.x, log_area.y + row as u16, log_area.width, 1);
        Paragraph::new(line.clone()).render(line_area, buf);
    }

    if start > 0 {
        let x = log_area.x + log_area.width.saturating_sub(1);
        let cell = &mut buf[(x, log_area.y)];
        cell.set_char('^');
        cell.set_style(Style::default().fg(Color::DarkGray));
    }
}

/// Style for a message body, by who wrote it.
pub fn message_style(kind: MessageKind) -> Style {
    match kind {
        MessageKind::User => Style::default().fg(Color::White),
        MessageKind::Generated => Style::default().fg(Color::LightGreen),
    }
}

/// Flatten the log into display lines: a sender label, the wrapped body, a blank line.
fn build_message_lines(messages: &[ChatMessage], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let body_width = width.saturating_sub(2);
    if body_width == 0 {
        return lines;
    }

    for msg in messages {
        let (kind, text) = msg.display();
        let (label, label_color) = match kind {
            MessageKind::User => ("You", Color::Cyan),
            MessageKind::Generated => ("DocGenie", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", label),
            Style::default()
                .fg(label_color)
                .add_modifier(Modifier::BOLD),
        )));

        let style = message_style(kind);
        for wrapped in wrap_text(text, body_width) {
            lines.push(Line::from(Span::styled(format!("  {}", wrapped), style)));
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Greedy word wrap by display width. Words longer than a line are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_w = 0;
        for word in paragraph.split_whitespace() {
            let word_w: usize = word.chars().map(|c| c.width().unwrap_or(0)).sum();
            let sep = usize::from(!line.is_empty());
            if line_w + sep + word_w <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_w += sep + word_w;
                continue;
            }
            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
                line_w = 0;
            }
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if line_w + w > width {
                    out.push(std::mem::take(&mut line));
                    line_w = 0;
                }
                line.push(c);
                line_w += w;
            }
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MISSING_BODY_PLACEHOLDER;
    use ratatui::{backend::TestBackend, Terminal};

    fn conv(id: i64, title: &str) -> Conversation {
        Conversation {
            id,
            title: title.to_string(),
            user_id: Some(123),
            last_modified_date: None,
        }
    }

    fn msg(id: i64, body: &str) -> ChatMessage {
        ChatMessage {
            id: Some(id),
            body: Some(body.to_string()),
            conversation_id: Some(1),
            last_modified_date: None,
        }
    }

    fn not_ok() -> ApiError {
        ApiError::Status {
            status: 500,
            url: "http://127.0.0.1:8888/x".to_string(),
            body: String::new(),
        }
    }

    fn loaded() -> ChatState {
        let mut state = ChatState::new(123);
        state.apply_context(Ok(ConversationContext {
            latest: Some(conv(1, "Latest")),
            messages: vec![msg(10, "User message"), msg(11, "Response: Bot response")],
            conversations: vec![conv(1, "Conversation 1"), conv(2, "Conversation 2")],
        }));
        state
    }

    #[test]
    fn test_mount_loads_context_once() {
        let state = ChatState::new(123);
        assert_eq!(state.mount(), Some(BackendCommand::LoadContext { user_id: 123 }));
        assert_eq!(loaded().mount(), None);
    }

    #[test]
    fn test_apply_context() {
        let state = loaded();
        assert_eq!(state.current_conversation, Some(1));
        assert_eq!(state.chat_log.len(), 2);
        assert_eq!(state.history.conversations.len(), 2);
    }

    #[test]
    fn test_failed_context_falls_back_to_empty() {
        let mut state = loaded();
        state.apply_context(Err(not_ok()));
        assert_eq!(state.current_conversation, None);
        assert!(state.chat_log.is_empty());
        assert!(state.history.conversations.is_empty());
    }

    #[test]
    fn test_send_flow_clears_input_after_reply() {
        let mut state = loaded();
        state.compose.set("hello");

        let cmd = state.submit_message();
        assert_eq!(
            cmd,
            Some(BackendCommand::SendMessage {
                conversation_id: 1,
                body: "hello".to_string(),
            })
        );
        assert!(state.is_loading);

        // A second submit while loading does nothing.
        assert_eq!(state.submit_message(), None);

        state.message_stored(1, Ok(msg(12, "hello")));
        assert_eq!(state.chat_log.len(), 3);
        assert_eq!(state.compose.value(), "hello");
        assert!(state.is_loading);

        state.reply_received(1, Ok(msg(13, "Response:hi")));
        assert_eq!(state.chat_log.len(), 4);
        assert_eq!(state.compose.value(), "");
        assert!(!state.is_loading);
    }

    #[test]
    fn test_failed_send_calls_append_placeholders() {
        let mut state = loaded();
        state.compose.set("hello");
        state.submit_message();
        state.message_stored(1, Err(not_ok()));
        state.reply_received(1, Err(not_ok()));

        let shown: Vec<&str> = state.chat_log[2..].iter().map(|m| m.display().1).collect();
        assert_eq!(shown, vec![MISSING_BODY_PLACEHOLDER, MISSING_BODY_PLACEHOLDER]);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_blank_message_not_sent() {
        let mut state = loaded();
        state.compose.set("   ");
        assert_eq!(state.submit_message(), None);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_send_without_conversation() {
        let mut state = ChatState::new(123);
        state.compose.set("hello");
        assert_eq!(state.submit_message(), None);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_create_conversation() {
        let mut state = loaded();
        assert_eq!(state.submit_title(), None);

        state.title.set("Quarterly numbers");
        assert_eq!(
            state.submit_title(),
            Some(BackendCommand::CreateConversation {
                user_id: 123,
                title: "Quarterly numbers".to_string(),
            })
        );

        state.conversation_created(Ok(conv(3, "Quarterly numbers")));
        assert_eq!(state.history.conversations.len(), 3);
        assert_eq!(state.title.value(), "");
    }

    #[test]
    fn test_title_limited_to_twenty_chars() {
        let mut state = ChatState::new(1);
        state.title.set("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(state.title.value().chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_delete_success_reloads_everything() {
        let mut state = loaded();
        state.history.move_down();
        assert_eq!(
            state.delete_selected(),
            Some(BackendCommand::DeleteConversation { conversation_id: 2 })
        );

        // No local splice: the list is untouched until the reload lands.
        let next = state.conversation_deleted(2, Ok(()));
        assert_eq!(next, Some(BackendCommand::LoadContext { user_id: 123 }));
        assert_eq!(state.history.conversations.len(), 2);

        assert_eq!(state.conversation_deleted(2, Err(not_ok())), None);
    }

    #[test]
    fn test_switch_conversation() {
        let mut state = loaded();
        state.history.move_down();
        assert_eq!(
            state.switch_to_selected(),
            Some(BackendCommand::LoadMessages { conversation_id: 2 })
        );
        assert_eq!(state.current_conversation, Some(2));

        state.messages_loaded(2, Err(not_ok()));
        assert_eq!(state.chat_log.len(), 2);

        state.messages_loaded(2, Ok(vec![msg(20, "other")]));
        assert_eq!(state.chat_log.len(), 1);
    }

    #[test]
    fn test_history_toggle_resets_focus() {
        let mut state = loaded();
        state.toggle_history();
        state.cycle_focus();
        assert_eq!(state.focus, ChatFocus::History);
        state.toggle_history();
        assert_eq!(state.focus, ChatFocus::Compose);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
        assert_eq!(wrap_text("hello world", 7), vec!["hello", "world"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
    }

    fn buffer_lines(state: &ChatState) -> Vec<(String, Vec<Color>)> {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(frame.area(), frame, state)).unwrap();
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| {
                let text: String = (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect();
                let colors = (0..buf.area.width).map(|x| buf[(x, y)].fg).collect();
                (text, colors)
            })
            .collect()
    }

    #[test]
    fn test_render_strips_prefix_and_styles_generated() {
        let mut state = loaded();
        state.chat_log.push(ChatMessage::missing(1));
        let rows = buffer_lines(&state);

        let bot = rows
            .iter()
            .find(|(text, _)| text.contains("Bot response"))
            .expect("generated message rendered");
        assert!(!bot.0.contains("Response:"));
        assert!(bot.1.contains(&Color::LightGreen));

        let user = rows
            .iter()
            .find(|(text, _)| text.contains("User message"))
            .expect("user message rendered");
        assert!(user.1.contains(&Color::White));
        assert!(!user.1.contains(&Color::LightGreen));

        assert!(rows
            .iter()
            .any(|(text, _)| text.contains(MISSING_BODY_PLACEHOLDER)));
    }
}
