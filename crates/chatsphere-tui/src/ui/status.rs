//! Status bar
//!
//! Displays connection state, room, username, message count and the latest
//! notice.

use chatsphere_core::ConnectionState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();

    let connection_status = match view.status {
        ConnectionState::Disconnected => Span::styled("Disconnected", Style::default().fg(Color::Red)),
        ConnectionState::ConnectedUnjoined => Span::styled("Connected", Style::default().fg(Color::Yellow)),
        ConnectionState::Joining => Span::styled("Joining...", Style::default().fg(Color::Yellow)),
        ConnectionState::Joined => Span::styled(
            "Joined",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mut info = String::new();
    if let Some(room) = &view.room_id {
        info.push_str(&format!(" | Room: {room}"));
    }
    if let Some(username) = &view.username {
        info.push_str(&format!(" | User: {username}"));
    }
    if view.show_chat() {
        info.push_str(&format!(" | Messages: {}", view.lines.len()));
    }

    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::styled(info, Style::default().fg(Color::Gray)),
    ];

    if let Some(notice) = &view.notice {
        let color = if view.notice_is_error { Color::LightRed } else { Color::Cyan };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(notice.clone(), Style::default().fg(color)));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
