//! Chat area
//!
//! Displays messages of the joined room, newest at the bottom. Outside a
//! room it shows what to do next instead.

use chatsphere_core::ConnectionState;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::App;

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();

    let title = match (&view.room_id, view.show_chat()) {
        (Some(room), true) => format!(" Room {room} "),
        _ => " No Room ".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if !view.show_chat() {
        let hint = match view.status {
            ConnectionState::Disconnected => "Disconnected. Type /connect to reconnect.".to_string(),
            ConnectionState::ConnectedUnjoined => match &view.room_id {
                Some(room) => format!("Room {room} is ready. Type /join to enter it."),
                None => "Type /create for a new room or /join <room> <name>.".to_string(),
            },
            ConnectionState::Joining => {
                format!("Joining {}...", view.pending_room.as_deref().unwrap_or_default())
            },
            ConnectionState::Joined => String::new(),
        };

        let item = ListItem::new(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
        frame.render_widget(List::new(vec![item]).block(block), area);
        return;
    }

    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let end = view.lines.len().saturating_sub(app.scroll());
    let start = end.saturating_sub(visible_height);

    let items: Vec<ListItem> = view
        .lines
        .range(start..end)
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}:", line.username),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::raw(line.text.clone()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
