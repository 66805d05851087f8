//! Session state machine.
//!
//! Tracks the connection lifecycle, room membership, and the message log of
//! the active room. Uses the action pattern: methods take channel lifecycle
//! notifications, user intents, and inbound frames, and return actions for
//! the owner to execute.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  open   ┌───────────────────┐  Join   ┌─────────┐  joined  ┌────────┐
//! │ Disconnected │────────>│ ConnectedUnjoined │────────>│ Joining │─────────>│ Joined │
//! └──────────────┘         └───────────────────┘         └─────────┘          └────────┘
//!        ↑                          │                        │                    │
//!        └──────────────────────────┴────────────────────────┴────────────────────┘
//!                               close / server error
//! ```
//!
//! # Invariants
//!
//! - Chat messages are appended only while `Joined`, in arrival order.
//! - Sending a message never appends to the log. The log grows only when the
//!   service relays the message back.
//! - Leaving for `Disconnected` clears room id, username, and messages.
//! - Rejected intents and broken inbound frames leave the state unchanged.

use std::{fmt, num::NonZeroUsize};

use chatsphere_proto::{Frame, InboundEvent, Intent, decode_event, encode_intent};

use crate::{
    error::{Anomaly, SessionError},
    log::{LogView, Message, MessageLog},
    snapshot::SessionSnapshot,
};

/// Actions returned by the session state machine.
///
/// The owner executes these:
/// - `Send`: hand the frame to the channel manager
/// - `Close`: tear down the channel with the given reason
/// - `Anomaly`: report to observers, nothing to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this frame to the service
    Send(Frame),

    /// Close the channel
    Close {
        /// Reason for closing
        reason: String,
    },

    /// Non-fatal problem with inbound traffic
    Anomaly(Anomaly),
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No channel. Initial state.
    Disconnected,
    /// Channel open, not in a room
    ConnectedUnjoined,
    /// Join sent, waiting for confirmation
    Joining,
    /// Member of the active room
    Joined,
}

impl ConnectionState {
    /// True if a channel is open in this state.
    pub fn is_connected(self) -> bool {
        self != Self::Disconnected
    }

    /// True if `next` is reachable from `self` in a single step.
    ///
    /// Forward steps are `Disconnected → ConnectedUnjoined → Joining → Joined`.
    /// Staying put is always legal, and any state may fall back to
    /// `Disconnected`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (_, Self::Disconnected)
                | (Self::Disconnected, Self::ConnectedUnjoined)
                | (Self::ConnectedUnjoined, Self::ConnectedUnjoined | Self::Joining)
                | (Self::Joining, Self::Joining | Self::Joined)
                | (Self::Joined, Self::Joined)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::ConnectedUnjoined => "connected",
            Self::Joining => "joining",
            Self::Joined => "joined",
        })
    }
}

/// Session configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Maximum number of retained messages. `None` keeps every message.
    pub log_capacity: Option<NonZeroUsize>,
}

/// Session state machine
///
/// One per client process. Owns every piece of session state; other
/// components only read [`SessionSnapshot`]s.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current state
    state: ConnectionState,
    /// Room shown to the user (last created or joined)
    room_id: Option<String>,
    /// Display name of the last join
    username: Option<String>,
    /// Room targeted by the join in flight
    pending_room: Option<String>,
    /// Messages of the active room
    log: MessageLog,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    /// Create a session in [`ConnectionState::Disconnected`]
    pub fn new(config: SessionConfig) -> Self {
        let log = match config.log_capacity {
            Some(capacity) => MessageLog::bounded(capacity),
            None => MessageLog::new(),
        };

        Self { state: ConnectionState::Disconnected, room_id: None, username: None, pending_room: None, log }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Room shown to the user. Set by `RoomCreated` and by a completed join.
    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Username of the last join attempt.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Room the join in flight targets. `None` unless `Joining`.
    pub fn pending_room(&self) -> Option<&str> {
        self.pending_room.as_deref()
    }

    /// Messages of the active room.
    pub fn messages(&self) -> LogView<'_> {
        self.log.view()
    }

    /// Read-only view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            state: self.state,
            room_id: self.room_id(),
            username: self.username(),
            pending_room: self.pending_room(),
            messages: self.log.view(),
        }
    }

    /// Channel opened.
    ///
    /// Transitions `Disconnected → ConnectedUnjoined`. In any other state the
    /// notification is stale and reported as an anomaly.
    pub fn on_open(&mut self) -> Vec<SessionAction> {
        if self.state != ConnectionState::Disconnected {
            return vec![self.unexpected("open")];
        }

        tracing::info!("channel open");
        self.state = ConnectionState::ConnectedUnjoined;
        vec![]
    }

    /// Channel closed, for whatever reason.
    ///
    /// Resets the session to `Disconnected`. Rejoining afterwards is a fresh
    /// join.
    pub fn on_close(&mut self, reason: &str) {
        if self.state != ConnectionState::Disconnected {
            tracing::info!(%reason, state = %self.state, "channel closed");
        }
        self.reset();
    }

    /// Apply a user intent.
    ///
    /// Input is validated before the state is checked, so empty fields are
    /// always reported as such. Fields are sent as given, whitespace included.
    ///
    /// # Errors
    ///
    /// - `SessionError::EmptyRoomId`, `EmptyUsername`, `EmptyMessage` if a
    ///   required field is empty
    /// - `SessionError::InvalidState` if the intent is not valid in the current
    ///   state
    pub fn handle_intent(&mut self, intent: Intent) -> Result<Vec<SessionAction>, SessionError> {
        match intent {
            Intent::Create => {
                self.require(&[ConnectionState::ConnectedUnjoined, ConnectionState::Joining], "create")?;

                Ok(vec![SessionAction::Send(encode_intent(&Intent::Create))])
            },

            Intent::Join { room_id, username } => {
                if room_id.is_empty() {
                    return Err(SessionError::EmptyRoomId);
                }
                if username.is_empty() {
                    return Err(SessionError::EmptyUsername);
                }

                // `joined` names no room, so at most one join is in flight
                self.require(&[ConnectionState::ConnectedUnjoined], "join")?;

                let frame = encode_intent(&Intent::Join { room_id: room_id.clone(), username: username.clone() });

                self.pending_room = Some(room_id);
                self.username = Some(username);
                self.state = ConnectionState::Joining;

                Ok(vec![SessionAction::Send(frame)])
            },

            Intent::Send { text } => {
                if text.is_empty() {
                    return Err(SessionError::EmptyMessage);
                }

                self.require(&[ConnectionState::Joined], "send")?;

                Ok(vec![SessionAction::Send(encode_intent(&Intent::Send { text }))])
            },
        }
    }

    /// Decode and apply an inbound frame.
    ///
    /// Frames of unknown type are skipped silently. Any other decode failure
    /// becomes an [`Anomaly::Decode`]. Neither changes the state.
    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<SessionAction> {
        match decode_event(frame) {
            Ok(event) => self.handle_event(event),
            Err(e) if e.is_ignorable() => {
                tracing::debug!(error = %e, "ignoring frame");
                vec![]
            },
            Err(e) => {
                tracing::warn!(error = %e, state = %self.state, "undecodable frame");
                vec![SessionAction::Anomaly(Anomaly::Decode(e))]
            },
        }
    }

    /// Apply a decoded inbound event.
    pub fn handle_event(&mut self, event: InboundEvent) -> Vec<SessionAction> {
        match (self.state, event) {
            (
                ConnectionState::ConnectedUnjoined | ConnectionState::Joining,
                InboundEvent::RoomCreated { room_code },
            ) => {
                tracing::info!(%room_code, "room created");
                self.room_id = Some(room_code);
                vec![]
            },

            (ConnectionState::Joining, InboundEvent::Joined) => {
                self.room_id = self.pending_room.take();
                self.state = ConnectionState::Joined;
                tracing::info!(room_id = ?self.room_id, username = ?self.username, "joined room");
                vec![]
            },

            (ConnectionState::Joined, InboundEvent::Chat { username, text }) => {
                self.log.append(Message { username, text });
                vec![]
            },

            (state, InboundEvent::Chat { username, .. }) => {
                tracing::debug!(%state, %username, "dropping chat received outside a room");
                vec![]
            },

            (ConnectionState::Disconnected, event @ InboundEvent::Error { .. }) => {
                vec![self.unexpected(event.kind())]
            },

            (state, InboundEvent::Error { message }) => {
                tracing::warn!(%state, %message, "server error, disconnecting");
                self.reset();

                let reason = if message.is_empty() {
                    "server error".to_string()
                } else {
                    format!("server error: {message}")
                };

                vec![SessionAction::Anomaly(Anomaly::ServerError { message }), SessionAction::Close {
                    reason,
                }]
            },

            (_, event) => vec![self.unexpected(event.kind())],
        }
    }

    fn require(&self, allowed: &[ConnectionState], operation: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState { state: self.state, operation })
        }
    }

    fn unexpected(&self, event: &'static str) -> SessionAction {
        tracing::warn!(event, state = %self.state, "unexpected event");
        SessionAction::Anomaly(Anomaly::UnexpectedEvent { event, state: self.state })
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.room_id = None;
        self.username = None;
        self.pending_room = None;
        self.log.clear();
    }
}
