//! Login view: email/password form.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::backend::BackendCommand;
use super::input::{self, InputView, TextInput, INPUT_HEIGHT};
use crate::api::ApiError;
use crate::models::{Credentials, User};

/// Which field has focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginState {
    pub email: TextInput,
    pub password: TextInput,
    pub focus: LoginField,
    /// Local validation error ("Email is missing", "Password is missing").
    pub error: Option<String>,
    pub success: bool,
}

impl LoginState {
    /// Validate the form and build the login command.
    ///
    /// Invalid input sets `error` and issues nothing.
    pub fn submit(&mut self) -> Option<BackendCommand> {
        self.error = None;
        self.success = false;

        match Credentials::validate(self.email.value(), self.password.value()) {
            Ok(credentials) => Some(BackendCommand::Login(credentials)),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Apply the login response. Returns the user id to navigate to.
    ///
    /// A rejected login leaves the form as it is, with no error text.
    pub fn login_completed(&mut self, result: Result<User, ApiError>) -> Option<i64> {
        match result {
            Ok(user) => {
                tracing::info!("Logged in as {} ({})", user.username, user.id);
                self.success = true;
                Some(user.id)
            }
            Err(e) => {
                tracing::debug!("Login rejected: {}", e);
                None
            }
        }
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            _ => {
                self.focused_input().handle_key(key);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const FORM_WIDTH: u16 = 50;
const FORM_HEIGHT: u16 = 2 + 1 + INPUT_HEIGHT * 2 + 1 + 1 + 1;

pub fn render(area: Rect, frame: &mut Frame, state: &LoginState) {
    let form_area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Login ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let [_, email_area, password_area, message_area, _, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    input::render(
        email_area,
        frame,
        &state.email,
        &InputView {
            title: "Email",
            placeholder: "you@example.com",
            focused: state.focus == LoginField::Email,
            masked: false,
            disabled: false,
        },
    );
    input::render(
        password_area,
        frame,
        &state.password,
        &InputView {
            title: "Password",
            placeholder: "",
            focused: state.focus == LoginField::Password,
            masked: true,
            disabled: false,
        },
    );

    if let Some(ref error) = state.error {
        let line = Line::from(Span::styled(format!(" {}", error), Style::default().fg(Color::Red)));
        frame.render_widget(Paragraph::new(line), message_area);
    } else if state.success {
        let line = Line::from(Span::styled(
            " Login successful!",
            Style::default().fg(Color::Green),
        ));
        frame.render_widget(Paragraph::new(line), message_area);
    }

    let hint = Line::from(Span::styled(
        " Tab: switch field   Enter: log in",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hint), hint_area);
}

/// Return a centered sub-rect of the given size within `area`.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(email: &str, password: &str) -> LoginState {
        let mut state = LoginState::default();
        state.email.set(email);
        state.password.set(password);
        state
    }

    fn user(id: i64) -> User {
        User {
            id,
            username: "ada".to_string(),
            email: "ada@x.io".to_string(),
            is_admin: false,
            permissions: vec![],
        }
    }

    #[test]
    fn test_empty_email_blocks_submit() {
        let mut state = filled("", "pw");
        assert_eq!(state.submit(), None);
        assert_eq!(state.error.as_deref(), Some("Email is missing"));

        let mut state = filled("   ", "pw");
        assert_eq!(state.submit(), None);
        assert_eq!(state.error.as_deref(), Some("Email is missing"));
    }

    #[test]
    fn test_empty_password_blocks_submit() {
        let mut state = filled("ada@x.io", "");
        assert_eq!(state.submit(), None);
        assert_eq!(state.error.as_deref(), Some("Password is missing"));
    }

    #[test]
    fn test_valid_submit_clears_error() {
        let mut state = filled("", "pw");
        state.submit();
        state.email.set("ada@x.io");

        let cmd = state.submit();
        assert_eq!(
            cmd,
            Some(BackendCommand::Login(Credentials {
                email: "ada@x.io".to_string(),
                password: "pw".to_string(),
            }))
        );
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_login_success_navigates() {
        let mut state = filled("ada@x.io", "pw");
        assert_eq!(state.login_completed(Ok(user(123))), Some(123));
        assert!(state.success);
    }

    #[test]
    fn test_login_rejected_stays_silent() {
        let mut state = filled("ada@x.io", "pw");
        let err = ApiError::Status {
            status: 404,
            url: "http://127.0.0.1:8888/user/login".to_string(),
            body: String::new(),
        };
        assert_eq!(state.login_completed(Err(err)), None);
        assert!(!state.success);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_enter_submits_and_tab_switches() {
        use crossterm::event::KeyModifiers;
        let mut state = LoginState::default();
        for c in "a@b".chars() {
            state.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        state.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        state.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(state.email.value(), "a@b");
        assert_eq!(state.password.value(), "x");

        let cmd = state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(cmd, Some(BackendCommand::Login(_))));
    }
}
