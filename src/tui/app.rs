//! TUI Application state and main event loop

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use std::time::Duration;

use super::admin::AdminState;
use super::backend::{Backend, BackendCommand, BackendResponse};
use super::chat::ChatState;
use super::debug_log::DebugLogState;
use super::log_capture::LogBuffer;
use super::login::LoginState;
use super::ui;
use crate::api::{ApiError, DocGenieClient};
use crate::config::Config;

/// Target frame rate for UI updates (~30 fps)
const FRAME_DURATION_MS: u64 = 33;

/// Debug log lines moved per Ctrl+Up/Ctrl+Down.
const LOG_SCROLL: usize = 3;

/// Which view is on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    #[default]
    Login,
    Chat {
        user_id: i64,
    },
    Admin {
        user_id: i64,
    },
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_exit: bool,
    pub route: Route,
    /// Previous routes, most recent last. Esc pops one.
    history: Vec<Route>,
    pub login: LoginState,
    pub chat: ChatState,
    pub admin: AdminState,
    pub debug_log: DebugLogState,
    pub show_help: bool,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    /// Backend origin, shown in the header.
    pub server_url: String,
    /// Set by a successful login until the caller persists it.
    logged_in: Option<i64>,
}

impl App {
    pub fn new(server_url: String, log_buffer: LogBuffer) -> Self {
        Self {
            should_exit: false,
            route: Route::Login,
            history: Vec::new(),
            login: LoginState::default(),
            chat: ChatState::new(0),
            admin: AdminState::default(),
            debug_log: DebugLogState::new(log_buffer),
            show_help: false,
            status_message: None,
            status_is_error: false,
            server_url,
            logged_in: None,
        }
    }

    /// Go to a new route, remembering the current one.
    pub fn navigate(&mut self, route: Route) -> Option<BackendCommand> {
        tracing::debug!("Navigate {:?} -> {:?}", self.route, route);
        self.history.push(self.route);
        self.route = route;
        self.enter()
    }

    /// Return to the previous route. Exits when there is none.
    pub fn back(&mut self) -> Option<BackendCommand> {
        match self.history.pop() {
            Some(route) => {
                self.route = route;
                self.enter()
            }
            None => {
                self.should_exit = true;
                None
            }
        }
    }

    /// Run the entry effect of the current route.
    fn enter(&mut self) -> Option<BackendCommand> {
        match self.route {
            Route::Login => {
                self.login = LoginState::default();
                None
            }
            Route::Chat { user_id } => {
                if self.chat.user_id != user_id {
                    self.chat = ChatState::new(user_id);
                }
                self.chat.mount()
            }
            Route::Admin { user_id } => Some(self.admin.open(user_id)),
        }
    }

    /// User id from a login that has not been persisted yet.
    pub fn take_login(&mut self) -> Option<i64> {
        self.logged_in.take()
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status_message = Some(message);
        self.status_is_error = is_error;
    }

    /// Surface failures the views don't show themselves.
    fn note_error<T>(&mut self, result: &Result<T, ApiError>) {
        if let Err(e) = result {
            if e.is_transport() {
                self.set_status(format!("Cannot reach {}", self.server_url), true);
            }
        }
    }

    /// Handle a key press. Returns a command for the backend, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        self.status_message = None;

        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_exit = true;
                return None;
            }
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return None;
            }
            KeyCode::F(12) => {
                self.debug_log.toggle();
                return None;
            }
            KeyCode::Up if ctrl => {
                self.debug_log.scroll_up(LOG_SCROLL);
                return None;
            }
            KeyCode::Down if ctrl => {
                self.debug_log.scroll_down(LOG_SCROLL);
                return None;
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                    return None;
                }
                return self.back();
            }
            _ => {}
        }

        if self.show_help {
            return None;
        }

        match self.route {
            Route::Login => self.login.handle_key(key),
            Route::Chat { user_id } => {
                if ctrl && key.code == KeyCode::Char('a') {
                    return self.navigate(Route::Admin { user_id });
                }
                self.chat.handle_key(key)
            }
            Route::Admin { .. } => {
                if key.code == KeyCode::Enter {
                    return match self.admin.submit_search() {
                        Some(user_id) => self.navigate(Route::Admin { user_id }),
                        None => None,
                    };
                }
                self.admin.handle_key(key);
                None
            }
        }
    }

    /// Apply a backend response. Returns a follow-up command, if any.
    pub fn handle_response(&mut self, resp: BackendResponse) -> Option<BackendCommand> {
        match resp {
            BackendResponse::LoggedIn(result) => {
                self.note_error(&result);
                let user_id = self.login.login_completed(result)?;
                self.logged_in = Some(user_id);
                self.navigate(Route::Chat { user_id })
            }
            BackendResponse::Context(result) => {
                self.note_error(&result);
                self.chat.apply_context(result);
                None
            }
            BackendResponse::ConversationCreated(result) => {
                self.note_error(&result);
                self.chat.conversation_created(result);
                None
            }
            BackendResponse::ConversationDeleted {
                conversation_id,
                result,
            } => {
                self.note_error(&result);
                self.chat.conversation_deleted(conversation_id, result)
            }
            BackendResponse::Messages {
                conversation_id,
                result,
            } => {
                self.note_error(&result);
                if self.chat.current_conversation == Some(conversation_id) {
                    self.chat.messages_loaded(conversation_id, result);
                }
                None
            }
            BackendResponse::MessageStored {
                conversation_id,
                result,
            } => {
                self.note_error(&result);
                if self.chat.is_loading {
                    self.chat.message_stored(conversation_id, result);
                }
                None
            }
            BackendResponse::ReplyReceived {
                conversation_id,
                result,
            } => {
                self.note_error(&result);
                // A send from a previous session has nothing to land in.
                if self.chat.is_loading {
                    self.chat.reply_received(conversation_id, result);
                }
                None
            }
            BackendResponse::User { user_id, result } => {
                self.note_error(&result);
                // Drop answers for a lookup the user has already moved past.
                if self.admin.user_id == Some(user_id) {
                    self.admin.user_loaded(user_id, result);
                }
                None
            }
        }
    }
}

/// Run the TUI. Starts in the chat view when `start_user` is known.
pub async fn run(
    mut config: Config,
    server_url: String,
    start_user: Option<i64>,
    log_buffer: LogBuffer,
) -> Result<()> {
    let client = DocGenieClient::new(&server_url)?;
    let mut backend = Backend::start(client);
    let mut app = App::new(server_url, log_buffer);

    if let Some(user_id) = start_user {
        if let Some(cmd) = app.navigate(Route::Chat { user_id }) {
            backend.send(cmd);
        }
    }

    // ratatui::init installs a panic hook that restores the terminal.
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app, &mut backend, &mut config).await;
    ratatui::restore();
    result
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    backend: &mut Backend,
    config: &mut Config,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));

    while !app.should_exit {
        app.debug_log.refresh();
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            _ = tick.tick() => {}
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = app.handle_key(key) {
                        backend.send(cmd);
                    }
                }
                // Resize and the rest are picked up by the next draw.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => app.should_exit = true,
            },
            resp = backend.recv() => match resp {
                Some(resp) => {
                    if let Some(cmd) = app.handle_response(resp) {
                        backend.send(cmd);
                    }
                    if let Some(user_id) = app.take_login() {
                        if let Err(e) = config.remember_user(user_id) {
                            tracing::warn!("Could not save config: {:#}", e);
                        }
                    }
                }
                None => {
                    tracing::error!("Backend stopped");
                    app.should_exit = true;
                }
            },
        }
    }

    Ok(())
}
