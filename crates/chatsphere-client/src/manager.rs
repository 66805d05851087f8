//! Channel manager.
//!
//! Owns at most one open link at a time. The open link is held in a guard
//! whose `Drop` aborts the pump and transport tasks, so the link is released
//! on every exit path: explicit close, remote failure, or the manager being
//! dropped.
//!
//! # Event flow
//!
//! ```text
//!  transport task ──> Link.inbound ──> pump task ──> event queue ──> owner
//!                                                        ↑
//!                                    open() / close() ───┘
//! ```
//!
//! The manager never reconnects on its own. A lost link is reported as
//! [`ChannelEvent::Closed`] and the owner decides what to do next.
//!
//! # Invariants
//!
//! - Exactly one `Closed` passes [`ChannelManager::accept`] per opened link.
//! - Nothing from a released link passes `accept` except that `Closed`.
//! - No frames are carried over from one link to the next.

use chatsphere_proto::Frame;
use tokio::{sync::mpsc, task::AbortHandle};

use crate::{ChannelError, ChannelEvent, Connector, Link, LinkId};

/// Reason reported when the owner closes the channel.
pub const CLOSED_BY_CLIENT: &str = "closed by client";

/// Reason reported when the service ends the stream without an error.
pub const CLOSED_BY_PEER: &str = "connection closed by server";

/// Guard for the open link.
struct OpenChannel {
    id: LinkId,
    outbound: mpsc::Sender<Frame>,
    pump: AbortHandle,
    transport: Option<AbortHandle>,
}

impl Drop for OpenChannel {
    fn drop(&mut self) {
        self.pump.abort();
        if let Some(transport) = &self.transport {
            transport.abort();
        }
    }
}

/// Manages the single persistent channel to the coordination service.
pub struct ChannelManager<C> {
    connector: C,
    endpoint: String,
    events: mpsc::UnboundedSender<ChannelEvent>,
    open: Option<OpenChannel>,
    /// Link closed by `close()` whose `Closed` event is still in the queue
    closing: Option<LinkId>,
    next_link: u64,
}

impl<C: Connector> ChannelManager<C> {
    /// Create a manager for `endpoint`.
    ///
    /// Returns the manager and the receiving end of its event queue.
    pub fn new(
        connector: C,
        endpoint: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            connector,
            endpoint: endpoint.into(),
            events,
            open: None,
            closing: None,
            next_link: 0,
        };
        (manager, rx)
    }

    /// Endpoint this manager connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// True if a link is open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Identity of the open link.
    pub fn current_link(&self) -> Option<LinkId> {
        self.open.as_ref().map(|open| open.id)
    }

    /// Establish the channel.
    ///
    /// On success, queues [`ChannelEvent::Opened`] and starts pumping inbound
    /// frames onto the event queue.
    ///
    /// # Errors
    ///
    /// - `ChannelError::AlreadyOpen` if a link is open
    /// - `ChannelError::Connect` if the connector fails
    pub async fn open(&mut self) -> Result<LinkId, ChannelError> {
        if self.open.is_some() {
            return Err(ChannelError::AlreadyOpen);
        }

        let Link { outbound, inbound, task } = self.connector.connect(&self.endpoint).await?;

        let id = LinkId(self.next_link);
        self.next_link += 1;

        tracing::info!(link = %id, endpoint = %self.endpoint, "channel opened");

        // Opened is queued before the pump starts so it precedes every message.
        let _ = self.events.send(ChannelEvent::Opened { link: id });
        let pump = tokio::spawn(pump(id, inbound, self.events.clone()));

        self.open = Some(OpenChannel { id, outbound, pump: pump.abort_handle(), transport: task });
        Ok(id)
    }

    /// Enqueue a frame for transmission.
    ///
    /// # Errors
    ///
    /// - `ChannelError::NotOpen` before `open` or after `close`
    /// - `ChannelError::Send` if the transport has gone away
    pub async fn send(&mut self, frame: Frame) -> Result<(), ChannelError> {
        let Some(open) = &self.open else {
            return Err(ChannelError::NotOpen);
        };

        open.outbound.send(frame).await.map_err(|_| ChannelError::Send(format!("{} is gone", open.id)))
    }

    /// Tear down the channel. Idempotent.
    ///
    /// Releases the link immediately and queues [`ChannelEvent::Closed`] with
    /// [`CLOSED_BY_CLIENT`] as the reason.
    pub fn close(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        let id = open.id;
        drop(open);

        tracing::info!(link = %id, "channel closed by client");
        self.closing = Some(id);
        let _ = self.events.send(ChannelEvent::Closed { link: id, reason: CLOSED_BY_CLIENT.to_string() });
    }

    /// Filter an event taken from the queue.
    ///
    /// Returns the event if it belongs to the current link, `None` if it is
    /// stale. A `Closed` event for the current link releases it.
    pub fn accept(&mut self, event: ChannelEvent) -> Option<ChannelEvent> {
        let link = event.link();
        let current = self.current_link() == Some(link);

        match &event {
            ChannelEvent::Opened { .. } | ChannelEvent::Message { .. } if current => Some(event),

            ChannelEvent::Closed { reason, .. } if current => {
                tracing::warn!(%link, %reason, "channel lost");
                self.open = None;
                Some(event)
            },

            ChannelEvent::Closed { .. } if self.closing == Some(link) => {
                self.closing = None;
                Some(event)
            },

            _ => {
                tracing::debug!(%link, "dropping stale channel event");
                None
            },
        }
    }
}

impl<C> Drop for ChannelManager<C> {
    fn drop(&mut self) {
        if let Some(open) = &self.open {
            tracing::debug!(link = %open.id, "releasing channel on shutdown");
        }
    }
}

/// Move inbound frames onto the event queue until the link ends.
async fn pump(
    link: LinkId,
    mut inbound: mpsc::Receiver<Result<Frame, ChannelError>>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    let reason = loop {
        match inbound.recv().await {
            Some(Ok(frame)) => {
                if events.send(ChannelEvent::Message { link, frame }).is_err() {
                    return;
                }
            },
            Some(Err(e)) => break e.to_string(),
            None => break CLOSED_BY_PEER.to_string(),
        }
    };

    let _ = events.send(ChannelEvent::Closed { link, reason });
}
