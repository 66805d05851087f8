//! Application state machine.
//!
//! [`App`] is the Presentation Adapter. It consumes [`crate::AppEvent`]
//! inputs and produces [`crate::AppAction`] instructions for the runtime, and
//! it observes the session to keep a [`ViewState`] for rendering.
//!
//! # Responsibilities
//!
//! - Line editing and command parsing for the input line.
//! - Defaults for `/join`: last known room and the configured username.
//! - Scrollback and terminal dimensions.
//! - The latest notice, shown in the status bar.

use chatsphere_core::SessionSnapshot;
use chatsphere_proto::Intent;

use crate::{
    AppAction, AppEvent, Edit, InputState, KeyInput, Notice, Observer, ViewState,
    command::{self, Command},
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Endpoint of the coordination service, for display.
    endpoint: String,
    /// Username used when `/join` omits one.
    username: Option<String>,
    /// Last room the session reported, used when `/join` omits one.
    last_room: Option<String>,
    /// State the renderer draws.
    view: ViewState,
    /// Input line.
    input: InputState,
    /// Lines scrolled back from the newest message.
    scroll: usize,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl App {
    /// Create a new App for `endpoint`.
    pub fn new(endpoint: impl Into<String>, username: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username,
            last_room: None,
            view: ViewState::default(),
            input: InputState::new(),
            scroll: 0,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Key(KeyInput::Esc) => vec![AppAction::Quit],
            AppEvent::Key(KeyInput::Up) => self.scroll_by(1),
            AppEvent::Key(KeyInput::Down) => self.scroll_by(-1),
            AppEvent::Key(key) => match self.input.handle_key(key) {
                Edit::Unchanged => vec![],
                Edit::Changed => vec![AppAction::Render],
                Edit::Submitted(line) => {
                    let mut actions = self.submit(&line);
                    actions.push(AppAction::Render);
                    actions
                },
            },
        }
    }

    fn submit(&mut self, line: &str) -> Vec<AppAction> {
        self.view.notice = None;

        match command::parse(line) {
            Command::Create => vec![AppAction::Submit(Intent::Create)],
            Command::Join { room_id, username } => {
                if username.is_some() {
                    self.username.clone_from(&username);
                }

                let room_id = room_id.or_else(|| self.last_room.clone()).unwrap_or_default();
                let username = username.or_else(|| self.username.clone()).unwrap_or_default();
                vec![AppAction::Submit(Intent::Join { room_id, username })]
            },
            Command::Connect => vec![AppAction::Connect],
            Command::Quit => vec![AppAction::Quit],
            Command::Help => {
                self.set_notice(&Notice::Info(command::HELP.to_string()));
                vec![]
            },
            Command::Message(text) => {
                self.scroll = 0;
                vec![AppAction::Submit(Intent::Send { text })]
            },
            Command::Unknown(name) => {
                self.view.notice = Some(format!("unknown command /{name}, try /help"));
                self.view.notice_is_error = true;
                vec![]
            },
        }
    }

    fn scroll_by(&mut self, delta: isize) -> Vec<AppAction> {
        let max = self.view.lines.len().saturating_sub(1);
        let scroll = self.scroll.saturating_add_signed(delta).min(max);

        if scroll == self.scroll {
            return vec![];
        }
        self.scroll = scroll;
        vec![AppAction::Render]
    }

    fn set_notice(&mut self, notice: &Notice) {
        self.view.notice = Some(notice.to_string());
        self.view.notice_is_error = notice.is_error();
    }

    /// Endpoint of the coordination service.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Username used when `/join` omits one.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Room used when `/join` omits one.
    pub fn last_room(&self) -> Option<&str> {
        self.last_room.as_deref()
    }

    /// State to render.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Lines scrolled back from the newest message. 0 follows the tail.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}

impl Observer for App {
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot<'_>) {
        self.view.apply(snapshot);

        if let Some(room) = &self.view.room_id {
            self.last_room = Some(room.clone());
        }
        self.scroll = self.scroll.min(self.view.lines.len().saturating_sub(1));
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.set_notice(notice);
    }
}

#[cfg(test)]
mod tests {
    use chatsphere_core::{ConnectionState, Session, SessionError};
    use chatsphere_proto::InboundEvent;

    use super::*;

    fn type_line(app: &mut App, line: &str) -> Vec<AppAction> {
        for c in line.chars() {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        app.handle(AppEvent::Key(KeyInput::Enter))
    }

    fn joined_session(room: &str) -> Session {
        let mut session = Session::default();
        session.on_open();
        session
            .handle_intent(Intent::Join { room_id: room.into(), username: "alice".into() })
            .unwrap();
        session.handle_event(InboundEvent::Joined);
        session
    }

    #[test]
    fn text_submits_send_intent() {
        let mut app = App::new("ws://localhost:8080", None);
        let actions = type_line(&mut app, "hello");

        assert_eq!(actions, [
            AppAction::Submit(Intent::Send { text: "hello".into() }),
            AppAction::Render
        ]);
        assert_eq!(app.input().buffer(), "");
    }

    #[test]
    fn create_and_connect_commands() {
        let mut app = App::new("ws://localhost:8080", None);

        assert_eq!(type_line(&mut app, "/create"), [
            AppAction::Submit(Intent::Create),
            AppAction::Render
        ]);
        assert_eq!(type_line(&mut app, "/connect"), [AppAction::Connect, AppAction::Render]);
        assert_eq!(type_line(&mut app, "/quit"), [AppAction::Quit, AppAction::Render]);
    }

    #[test]
    fn join_uses_defaults() {
        let mut app = App::new("ws://localhost:8080", Some("alice".into()));
        app.on_snapshot(&joined_session("AB12").snapshot());

        assert_eq!(type_line(&mut app, "/join"), [
            AppAction::Submit(Intent::Join { room_id: "AB12".into(), username: "alice".into() }),
            AppAction::Render
        ]);
    }

    #[test]
    fn join_remembers_explicit_username() {
        let mut app = App::new("ws://localhost:8080", None);
        type_line(&mut app, "/join ZZ99 bob");
        assert_eq!(app.username(), Some("bob"));

        assert_eq!(type_line(&mut app, "/join QQ11"), [
            AppAction::Submit(Intent::Join { room_id: "QQ11".into(), username: "bob".into() }),
            AppAction::Render
        ]);
    }

    #[test]
    fn join_without_defaults_leaves_validation_to_session() {
        let mut app = App::new("ws://localhost:8080", None);

        assert_eq!(type_line(&mut app, "/join"), [
            AppAction::Submit(Intent::Join { room_id: String::new(), username: String::new() }),
            AppAction::Render
        ]);
    }

    #[test]
    fn help_and_unknown_set_notice() {
        let mut app = App::new("ws://localhost:8080", None);

        assert_eq!(type_line(&mut app, "/help"), [AppAction::Render]);
        assert_eq!(app.view().notice.as_deref(), Some(command::HELP));
        assert!(!app.view().notice_is_error);

        assert_eq!(type_line(&mut app, "/nope"), [AppAction::Render]);
        assert!(app.view().notice_is_error);
    }

    #[test]
    fn esc_quits() {
        let mut app = App::new("ws://localhost:8080", None);
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), [AppAction::Quit]);
    }

    #[test]
    fn resize_renders() {
        let mut app = App::new("ws://localhost:8080", None);
        assert_eq!(app.handle(AppEvent::Resize(120, 40)), [AppAction::Render]);
        assert_eq!(app.terminal_size(), (120, 40));
        assert!(app.handle(AppEvent::Tick).is_empty());
    }

    #[test]
    fn scroll_is_bounded_by_history() {
        let mut app = App::new("ws://localhost:8080", None);
        let mut session = joined_session("AB12");
        for text in ["a", "b", "c"] {
            session.handle_event(InboundEvent::Chat { username: "bob".into(), text: text.into() });
        }
        app.on_snapshot(&session.snapshot());

        assert!(app.handle(AppEvent::Key(KeyInput::Down)).is_empty());
        app.handle(AppEvent::Key(KeyInput::Up));
        app.handle(AppEvent::Key(KeyInput::Up));
        assert!(app.handle(AppEvent::Key(KeyInput::Up)).is_empty());
        assert_eq!(app.scroll(), 2);

        // Sending jumps back to the tail
        type_line(&mut app, "hi");
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn notices_are_shown() {
        let mut app = App::new("ws://localhost:8080", None);
        app.on_notice(&Notice::Rejected(SessionError::EmptyMessage));

        assert!(app.view().notice_is_error);
        assert_eq!(app.view().notice.as_deref(), Some(SessionError::EmptyMessage.to_string().as_str()));
    }

    #[test]
    fn last_room_survives_disconnect() {
        let mut app = App::new("ws://localhost:8080", None);
        let mut session = joined_session("AB12");
        app.on_snapshot(&session.snapshot());

        session.on_close("gone");
        app.on_snapshot(&session.snapshot());

        assert_eq!(app.view().status, ConnectionState::Disconnected);
        assert_eq!(app.last_room(), Some("AB12"));
    }
}
