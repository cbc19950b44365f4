//! Admin view: look up a user and tabulate their profile and permissions.

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::backend::BackendCommand;
use super::input::{self, InputView, TextInput, INPUT_HEIGHT};
use crate::api::ApiError;
use crate::models::User;

#[derive(Debug, Default)]
pub struct AdminState {
    /// Id from the route.
    pub user_id: Option<i64>,
    /// Search box contents.
    pub search: TextInput,
    /// Last successfully fetched profile.
    pub user: Option<User>,
    pub loading: bool,
}

impl AdminState {
    /// Entering the view (or changing the routed id) fetches the profile.
    pub fn open(&mut self, user_id: i64) -> BackendCommand {
        self.user_id = Some(user_id);
        self.search.set(&user_id.to_string());
        self.loading = true;
        BackendCommand::FetchUser { user_id }
    }

    /// Apply a fetch result. Any failure clears the table.
    pub fn user_loaded(&mut self, user_id: i64, result: Result<User, ApiError>) {
        self.user = match result {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Fetching user {} failed: {}", user_id, e);
                None
            }
        };
        self.loading = false;
    }

    /// Parse the search box. An unparsable id clears the table.
    pub fn submit_search(&mut self) -> Option<i64> {
        match self.search.value().trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!("Not a user id: {:?}", self.search.value());
                self.user = None;
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.search.handle_key(key);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(area: Rect, frame: &mut Frame, state: &AdminState) {
    let [search_area, loading_area, table_area] = Layout::vertical([
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    input::render(
        search_area,
        frame,
        &state.search,
        &InputView {
            title: "User ID (Enter to search)",
            placeholder: "Enter User ID",
            focused: true,
            masked: false,
            disabled: false,
        },
    );

    if state.loading {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " Loading...",
                Style::default().fg(Color::DarkGray),
            ))),
            loading_area,
        );
    }

    if let Some(ref user) = state.user {
        frame.render_widget(user_table(user), table_area);
    }
}

/// Field/value table for one user. Permissions are one list item per line.
fn user_table(user: &User) -> Table<'static> {
    let cell_style = Style::default().fg(Color::White);
    let field = |name: &'static str| Cell::from(name).style(Style::default().fg(Color::Cyan));

    let permissions: Vec<Line> = user
        .permissions
        .iter()
        .map(|p| Line::from(format!("\u{2022} {}", p.permission_name)))
        .collect();
    let permission_rows = permissions.len().max(1) as u16;

    let rows = vec![
        Row::new(vec![field("ID"), Cell::from(user.id.to_string())]),
        Row::new(vec![field("Username"), Cell::from(user.username.clone())]),
        Row::new(vec![field("Email"), Cell::from(user.email.clone())]),
        Row::new(vec![field("Admin"), Cell::from(user.is_admin.to_string())]),
        Row::new(vec![field("Permissions"), Cell::from(Text::from(permissions))])
            .height(permission_rows),
    ];

    let header = Row::new(vec![Cell::from("Field"), Cell::from("Value")]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    Table::new(rows, [Constraint::Length(14), Constraint::Fill(1)])
        .header(header)
        .style(cell_style)
        .block(Block::default().borders(Borders::ALL).title(" User "))
}
