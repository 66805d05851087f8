//! Read-only views of session state for observers.

use crate::{
    log::{LogView, Message},
    session::ConnectionState,
};

/// Borrowed view of a [`crate::Session`] after a transition.
///
/// Cheap to take and to copy. Observers that need to keep state past the
/// current notification copy what they need, or call
/// [`SessionSnapshot::to_owned`].
#[derive(Debug, Clone, Copy)]
pub struct SessionSnapshot<'a> {
    /// Connection state
    pub state: ConnectionState,
    /// Room shown to the user
    pub room_id: Option<&'a str>,
    /// Username of the last join
    pub username: Option<&'a str>,
    /// Target of the join in flight
    pub pending_room: Option<&'a str>,
    /// Messages of the active room
    pub messages: LogView<'a>,
}

impl SessionSnapshot<'_> {
    /// Deep copy, detached from the session.
    #[allow(clippy::wrong_self_convention, reason = "Shadows ToOwned::to_owned on borrowed snapshots")]
    pub fn to_owned(&self) -> OwnedSnapshot {
        OwnedSnapshot {
            state: self.state,
            room_id: self.room_id.map(str::to_string),
            username: self.username.map(str::to_string),
            pending_room: self.pending_room.map(str::to_string),
            messages: self.messages.iter().cloned().collect(),
            next_seq: self.messages.next_seq(),
        }
    }
}

/// Owned copy of a [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedSnapshot {
    /// Connection state
    pub state: ConnectionState,
    /// Room shown to the user
    pub room_id: Option<String>,
    /// Username of the last join
    pub username: Option<String>,
    /// Target of the join in flight
    pub pending_room: Option<String>,
    /// Messages of the active room, in arrival order
    pub messages: Vec<Message>,
    /// Sequence number the next appended message will receive
    pub next_seq: u64,
}
