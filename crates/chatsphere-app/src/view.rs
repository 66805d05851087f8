//! Renderable view state.
//!
//! [`ViewState`] is what a renderer draws. It is updated from session
//! snapshots incrementally: only messages the view has not seen are copied,
//! using the log's sequence numbers.

use std::collections::VecDeque;

use chatsphere_core::{ConnectionState, SessionSnapshot};

/// One rendered chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Sequence number in the session's log
    pub seq: u64,
    /// Sender
    pub username: String,
    /// Text
    pub text: String,
}

/// State a renderer needs to draw the session.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Connection state
    pub status: ConnectionState,
    /// Room shown to the user
    pub room_id: Option<String>,
    /// Username of the last join
    pub username: Option<String>,
    /// Room the join in flight targets
    pub pending_room: Option<String>,
    /// Chat lines in arrival order
    pub lines: VecDeque<ChatLine>,
    /// Most recent notice, rendered in the status bar
    pub notice: Option<String>,
    /// True if the latest notice reports a failure
    pub notice_is_error: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            status: ConnectionState::Disconnected,
            room_id: None,
            username: None,
            pending_room: None,
            lines: VecDeque::new(),
            notice: None,
            notice_is_error: false,
        }
    }
}

impl ViewState {
    /// Bring the view up to date with a snapshot.
    pub fn apply(&mut self, snapshot: &SessionSnapshot<'_>) {
        self.status = snapshot.state;
        self.room_id = snapshot.room_id.map(str::to_string);
        self.username = snapshot.username.map(str::to_string);
        self.pending_room = snapshot.pending_room.map(str::to_string);

        let messages = snapshot.messages;
        let first = messages.first_seq();
        while self.lines.front().is_some_and(|line| line.seq < first) {
            self.lines.pop_front();
        }

        let from = self.lines.back().map_or(first, |line| line.seq + 1);
        for (seq, message) in messages.since(from) {
            self.lines.push_back(ChatLine {
                seq,
                username: message.username.clone(),
                text: message.text.clone(),
            });
        }
    }

    /// True if the chat panel should be shown. Only a joined session has a
    /// room to show.
    pub fn show_chat(&self) -> bool {
        self.status == ConnectionState::Joined
    }
}
