//! Channel callbacks.

use chatsphere_proto::Frame;

use crate::LinkId;

/// Callback from the channel, delivered on the manager's event queue.
///
/// Every event names the link that produced it. Pass events through
/// [`crate::ChannelManager::accept`] before acting on them so events from a
/// link that has since been replaced are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The link is established
    Opened {
        /// Link that opened
        link: LinkId,
    },

    /// A frame arrived
    Message {
        /// Link the frame arrived on
        link: LinkId,
        /// Received frame
        frame: Frame,
    },

    /// The link is gone, by request or by failure
    Closed {
        /// Link that closed
        link: LinkId,
        /// Why it closed
        reason: String,
    },
}

impl ChannelEvent {
    /// Link that produced this event.
    pub fn link(&self) -> LinkId {
        match self {
            Self::Opened { link } | Self::Message { link, .. } | Self::Closed { link, .. } => *link,
        }
    }
}
