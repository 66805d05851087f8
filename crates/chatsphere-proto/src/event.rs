//! Inbound service events.

/// An event decoded from a service frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The service allocated a room in response to a create request.
    RoomCreated {
        /// Code other clients use to join.
        room_code: String,
    },

    /// The pending join was accepted.
    Joined,

    /// A chat message relayed to every member of the room, sender included.
    Chat {
        /// Display name of the sender.
        username: String,
        /// Message text.
        text: String,
    },

    /// The service rejected a request or is dropping the session.
    Error {
        /// Human-readable reason. May be empty.
        message: String,
    },
}

impl InboundEvent {
    /// Wire tag of this event.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "roomCreated",
            Self::Joined => "joined",
            Self::Chat { .. } => "chat",
            Self::Error { .. } => "error",
        }
    }
}
