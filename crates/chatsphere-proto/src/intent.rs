//! Outbound user intents.

/// A user action destined for the coordination service.
///
/// Intents are transient: they are validated by the session, encoded, sent,
/// and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ask the service to allocate a new room code.
    ///
    /// Creating a room does not join it.
    Create,

    /// Join an existing room under a display name.
    Join {
        /// Room code to join.
        room_id: String,
        /// Display name shown to other members.
        username: String,
    },

    /// Send a chat message to the joined room.
    Send {
        /// Message text.
        text: String,
    },
}

impl Intent {
    /// Wire tag of this intent.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Send { .. } => "chat",
        }
    }
}
