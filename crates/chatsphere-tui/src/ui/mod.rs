//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into a frame.

mod chat;
mod input;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::App;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const CHAT_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(CHAT_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [chat_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, app, *chat_area);
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
}

#[cfg(test)]
mod tests {
    use chatsphere_app::{AppEvent, KeyInput, Notice, Observer};
    use chatsphere_core::{Session, SessionError};
    use chatsphere_proto::{InboundEvent, Intent};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn joined(chats: &[(&str, &str)]) -> App {
        let mut session = Session::default();
        session.on_open();
        session
            .handle_intent(Intent::Join { room_id: "AB12".into(), username: "alice".into() })
            .unwrap();
        session.handle_event(InboundEvent::Joined);
        for (username, text) in chats {
            session.handle_event(InboundEvent::Chat { username: (*username).into(), text: (*text).into() });
        }

        let mut app = App::new("mem://local", None);
        app.on_snapshot(&session.snapshot());
        app
    }

    #[test]
    fn disconnected_shows_hint() {
        let screen = draw(&App::new("mem://local", None));

        assert!(screen.contains("No Room"));
        assert!(screen.contains("/connect"));
        assert!(screen.contains("Disconnected"));
    }

    #[test]
    fn joined_shows_messages_in_order() {
        let screen = draw(&joined(&[("bob", "first"), ("alice", "second")]));

        assert!(screen.contains("Room AB12"));
        let first = screen.find("bob: first").unwrap();
        let second = screen.find("alice: second").unwrap();
        assert!(first < second);
        assert!(screen.contains("Joined | Room: AB12 | User: alice | Messages: 2"));
    }

    #[test]
    fn chat_follows_tail() {
        let chats: Vec<(String, String)> = (0..20).map(|i| ("bob".to_string(), format!("line {i:02}"))).collect();
        let chats: Vec<(&str, &str)> = chats.iter().map(|(u, t)| (u.as_str(), t.as_str())).collect();

        let screen = draw(&joined(&chats));

        assert!(screen.contains("line 19"));
        assert!(!screen.contains("line 00"));
    }

    #[test]
    fn scrolled_view_shows_older_lines() {
        let chats: Vec<(String, String)> = (0..20).map(|i| ("bob".to_string(), format!("line {i:02}"))).collect();
        let chats: Vec<(&str, &str)> = chats.iter().map(|(u, t)| (u.as_str(), t.as_str())).collect();
        let mut app = joined(&chats);
        for _ in 0..10 {
            app.handle(AppEvent::Key(KeyInput::Up));
        }

        let screen = draw(&app);

        assert!(screen.contains("line 09"));
        assert!(!screen.contains("line 19"));
    }

    #[test]
    fn input_and_notice_are_drawn() {
        let mut app = joined(&[]);
        for c in "typing".chars() {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
        app.on_notice(&Notice::Rejected(SessionError::EmptyMessage));

        let screen = draw(&app);

        assert!(screen.contains("> typing"));
        assert!(screen.contains("message must not be empty"));
    }
}
