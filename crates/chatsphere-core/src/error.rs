//! Error types for the session layer.
//!
//! Two kinds of failure leave the session: [`SessionError`] is returned
//! synchronously when a local intent is rejected, and [`Anomaly`] is emitted
//! as an action when inbound traffic is broken or out of place. Neither is
//! fatal to the session.

use chatsphere_proto::DecodeError;
use thiserror::Error;

use crate::session::ConnectionState;

/// A local intent was rejected before anything was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Join requested with an empty room id
    #[error("room id must not be empty")]
    EmptyRoomId,

    /// Join requested with an empty username
    #[error("username must not be empty")]
    EmptyUsername,

    /// Send requested with an empty message
    #[error("message must not be empty")]
    EmptyMessage,

    /// Intent not valid in the current state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        /// State when the intent arrived
        state: ConnectionState,
        /// Operation that was attempted
        operation: &'static str,
    },
}

impl SessionError {
    /// True if the intent carried invalid input, as opposed to arriving in the
    /// wrong state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyRoomId | Self::EmptyUsername | Self::EmptyMessage)
    }
}

/// Non-fatal problem with inbound traffic.
///
/// Anomalies are reported to observers. The session state is unchanged except
/// for [`Anomaly::ServerError`], which accompanies a forced disconnect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// Inbound frame could not be decoded
    #[error("undecodable frame: {0}")]
    Decode(DecodeError),

    /// Event arrived in a state where it has no meaning
    #[error("unexpected `{event}` event while {state}")]
    UnexpectedEvent {
        /// Wire tag of the event
        event: &'static str,
        /// State when the event arrived
        state: ConnectionState,
    },

    /// The service reported an error
    #[error("server error: {message}")]
    ServerError {
        /// Message from the service. May be empty.
        message: String,
    },
}
