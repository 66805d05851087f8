//! Transport seam.
//!
//! A [`Connector`] turns an endpoint into a [`Link`]: a pair of frame queues
//! with a transport task behind them. The manager never sees sockets.

use std::{fmt, future::Future};

use chatsphere_proto::Frame;
use tokio::{sync::mpsc, task::AbortHandle};

use crate::ChannelError;

/// Identity of one link, unique per manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// Raw duplex frame pipe to the service.
///
/// The inbound queue yields `Err` once if the transport fails, and ends when
/// the peer closes cleanly.
pub struct Link {
    /// Frames to the service
    pub outbound: mpsc::Sender<Frame>,
    /// Frames from the service
    pub inbound: mpsc::Receiver<Result<Frame, ChannelError>>,
    /// Transport task, aborted when the link is released
    pub task: Option<AbortHandle>,
}

/// Service-side end of a [`Link`] created with [`Link::pair`].
pub struct LinkPeer {
    /// Frames to the client
    pub to_client: mpsc::Sender<Result<Frame, ChannelError>>,
    /// Frames from the client
    pub from_client: mpsc::Receiver<Frame>,
}

impl Link {
    /// In-memory link with both ends in this process.
    pub fn pair(capacity: usize) -> (Self, LinkPeer) {
        let (outbound, from_client) = mpsc::channel(capacity);
        let (to_client, inbound) = mpsc::channel(capacity);

        (Self { outbound, inbound, task: None }, LinkPeer { to_client, from_client })
    }

    /// Attach the task that drives this link.
    #[must_use]
    pub fn with_task(mut self, task: AbortHandle) -> Self {
        self.task = Some(task);
        self
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("has_task", &self.task.is_some()).finish_non_exhaustive()
    }
}

/// Establishes links to an endpoint.
///
/// # Implementations
///
/// - **WebSocket**: `transport::WsConnector` (feature `transport`)
/// - **Simulation**: in-process connectors from the harness
pub trait Connector: Send {
    /// Connect to `endpoint`.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Connect` if the endpoint is invalid or unreachable
    fn connect(&mut self, endpoint: &str) -> impl Future<Output = Result<Link, ChannelError>> + Send;
}
