//! Channel errors.

use thiserror::Error;

/// Errors from channel operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// `send` without an open channel
    #[error("channel not open")]
    NotOpen,

    /// `open` while a channel is already open
    #[error("channel already open")]
    AlreadyOpen,

    /// The connector could not establish a link
    #[error("connection failed: {0}")]
    Connect(String),

    /// The frame could not be handed to the transport
    #[error("send failed: {0}")]
    Send(String),

    /// The transport failed after the link was established
    #[error("connection lost: {0}")]
    Closed(String),
}
