//! Frame layout: header, routed view, optional debug log, status bar.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};

use super::admin;
use super::app::{App, Route};
use super::chat;
use super::debug_log::{self, DEBUG_LOG_HEIGHT};
use super::help;
use super::login;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let log_height = if app.debug_log.visible {
        DEBUG_LOG_HEIGHT
    } else {
        0
    };

    let [header_area, main_area, log_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(log_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(header_area, frame.buffer_mut(), app);

    match app.route {
        Route::Login => login::render(main_area, frame, &app.login),
        Route::Chat { .. } => chat::render(main_area, frame, &app.chat),
        Route::Admin { .. } => admin::render(main_area, frame, &app.admin),
    }

    if app.debug_log.visible {
        debug_log::render(log_area, frame.buffer_mut(), &app.debug_log);
    }

    render_status(status_area, frame.buffer_mut(), app);

    if app.show_help {
        help::render_help_popup(frame);
    }
}

/// Render the header bar
fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = " DocGenie";
    let right = match app.route {
        Route::Login => format!("{}  [F1] Help ", app.server_url),
        Route::Chat { user_id } => format!("Chat  user {}  [F1] Help ", user_id),
        Route::Admin { user_id } => format!("Admin  user {}  [F1] Help ", user_id),
    };

    let padding_width = (area.width as usize).saturating_sub(title.len() + right.len());

    let header_line = Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding_width)),
        Span::styled(right, Style::default().fg(Color::Cyan)),
    ]);

    Paragraph::new(header_line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

/// Render the status bar
fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    if let Some(ref msg) = app.status_message {
        let style = if app.status_is_error {
            Style::default().fg(Color::Red).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green).bg(Color::DarkGray)
        };
        Paragraph::new(Line::from(Span::styled(format!(" {} ", msg), style)))
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
        return;
    }

    let hints = match app.route {
        Route::Login => " Enter: log in | Tab: next field | Ctrl+C: quit",
        Route::Chat { .. } => {
            " Enter: send | Tab: focus | C-h: history | C-a: admin | F12: log | Esc: back"
        }
        Route::Admin { .. } => " Enter: search | Esc: back | Ctrl+C: quit",
    };

    Paragraph::new(Line::from(Span::styled(hints, Style::default().fg(Color::Gray))))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}
