//! Observers of session snapshots.
//!
//! The runtime notifies every subscribed [`Observer`] after each applied
//! input. Renderers are one kind of observer; test recorders are another.

use std::fmt;

use chatsphere_client::ChannelError;
use chatsphere_core::{Anomaly, SessionError, SessionSnapshot};

/// Out-of-band report for the user, alongside snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A local intent was rejected
    Rejected(SessionError),
    /// Inbound traffic was broken or out of place
    Anomaly(Anomaly),
    /// A channel operation failed
    Channel(ChannelError),
    /// The session lost its channel
    Disconnected {
        /// Why the channel closed
        reason: String,
    },
    /// Informational message
    Info(String),
}

impl Notice {
    /// True for notices that report a failure.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Info(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "{e}"),
            Self::Anomaly(a) => write!(f, "{a}"),
            Self::Channel(e) => write!(f, "{e}"),
            Self::Disconnected { reason } => write!(f, "disconnected: {reason}"),
            Self::Info(text) => f.write_str(text),
        }
    }
}

/// Receives session snapshots and notices.
///
/// Observers only read. They must not block: they run on the event loop.
pub trait Observer: Send {
    /// Called once per applied input with the session's current state.
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot<'_>);

    /// Called for each notice, before the snapshot of the same input.
    fn on_notice(&mut self, notice: &Notice) {
        let _ = notice;
    }
}
