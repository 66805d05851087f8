//! Channel management for Chatsphere clients.
//!
//! The [`ChannelManager`] owns the single persistent channel to the
//! coordination service. It exposes `open`/`send`/`close` and delivers the
//! channel's callbacks (opened, message, closed) as [`ChannelEvent`]s on one
//! queue, so the owner can serialize them with user input on a single event
//! loop.
//!
//! # Components
//!
//! - [`ChannelManager`]: Lifecycle of the one open channel
//! - [`Connector`]: Seam between the manager and a concrete transport
//! - [`Link`]: Raw duplex frame pipe returned by a connector
//! - [`ChannelEvent`]: Callbacks, tagged with the [`LinkId`] that produced them
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::WsConnector`]: WebSocket connector for `ws://` endpoints

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod link;
mod manager;

#[cfg(feature = "transport")]
pub mod transport;

pub use error::ChannelError;
pub use event::ChannelEvent;
pub use link::{Connector, Link, LinkId, LinkPeer};
pub use manager::{CLOSED_BY_CLIENT, CLOSED_BY_PEER, ChannelManager};
