//! Help popup overlay: keyboard shortcuts grouped by view.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::login::centered_rect;

const POPUP_WIDTH: u16 = 76;
const POPUP_HEIGHT: u16 = 22;

/// A shortcut entry: key binding and its description.
struct Shortcut {
    key: &'static str,
    desc: &'static str,
}

/// A category of shortcuts with a title.
struct Category {
    title: &'static str,
    shortcuts: &'static [Shortcut],
}

const GLOBAL: Category = Category {
    title: "GLOBAL",
    shortcuts: &[
        Shortcut {
            key: "F1",
            desc: "Toggle this help",
        },
        Shortcut {
            key: "F12",
            desc: "Toggle debug log",
        },
        Shortcut {
            key: "Ctrl+Up/Dn",
            desc: "Scroll debug log",
        },
        Shortcut {
            key: "Esc",
            desc: "Go back",
        },
        Shortcut {
            key: "Ctrl+C",
            desc: "Quit",
        },
    ],
};

const LOGIN: Category = Category {
    title: "LOGIN",
    shortcuts: &[
        Shortcut {
            key: "Tab",
            desc: "Switch field",
        },
        Shortcut {
            key: "Enter",
            desc: "Log in",
        },
    ],
};

const ADMIN: Category = Category {
    title: "ADMIN",
    shortcuts: &[Shortcut {
        key: "Enter",
        desc: "Look up user id",
    }],
};

const CHAT: Category = Category {
    title: "CHAT",
    shortcuts: &[
        Shortcut {
            key: "Enter",
            desc: "Send message",
        },
        Shortcut {
            key: "Tab",
            desc: "Cycle focus",
        },
        Shortcut {
            key: "Ctrl+H",
            desc: "Show/hide history",
        },
        Shortcut {
            key: "Ctrl+A",
            desc: "Admin view",
        },
        Shortcut {
            key: "PgUp/PgDn",
            desc: "Scroll messages",
        },
    ],
};

const HISTORY: Category = Category {
    title: "HISTORY",
    shortcuts: &[
        Shortcut {
            key: "Up/Down",
            desc: "Select conversation",
        },
        Shortcut {
            key: "Enter",
            desc: "Open conversation",
        },
        Shortcut {
            key: "d / Del",
            desc: "Delete conversation",
        },
        Shortcut {
            key: "Enter",
            desc: "Create (title field)",
        },
    ],
};

/// Render the help popup centered over the whole frame.
pub fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts (F1 to close) ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let [left_col, right_col] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);

    let left = Paragraph::new(build_column_lines(&[&GLOBAL, &LOGIN, &ADMIN]));
    frame.render_widget(left, inset(left_col, 1, 1));

    let right = Paragraph::new(build_column_lines(&[&CHAT, &HISTORY]));
    frame.render_widget(right, inset(right_col, 1, 1));
}

fn build_column_lines(categories: &[&Category]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, cat) in categories.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            cat.title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        for sc in cat.shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<12}", sc.key), Style::default().fg(Color::Yellow)),
                Span::styled(sc.desc, Style::default().fg(Color::Gray)),
            ]));
        }
    }

    lines
}

/// Inset a rect by the given horizontal and vertical margins.
fn inset(area: Rect, h: u16, v: u16) -> Rect {
    Rect::new(
        area.x + h,
        area.y + v,
        area.width.saturating_sub(h * 2),
        area.height.saturating_sub(v * 2),
    )
}
