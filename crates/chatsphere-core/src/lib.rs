//! Session state machine for Chatsphere rooms.
//!
//! The [`Session`] owns the connection state, room identity, and the
//! [`MessageLog`] of the active room. It is a pure state machine: methods take
//! inputs (channel lifecycle, user intents, inbound frames) and return
//! [`SessionAction`]s for the owner to execute. No I/O happens here.
//!
//! # Architecture
//!
//! ```text
//!   user intent ──> Session::handle_intent ──> [Send(frame)]
//!                                                   │
//!                                          channel manager sends
//!
//!   channel frame ─> Session::handle_frame ──> [Anomaly | Close]
//!                          │
//!                    decode + transition, may append to MessageLog
//! ```
//!
//! After every call the owner takes a [`SessionSnapshot`] and hands it to
//! observers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod log;
pub mod session;
pub mod snapshot;

pub use error::{Anomaly, SessionError};
pub use log::{LogView, Message, MessageLog};
pub use session::{ConnectionState, Session, SessionAction, SessionConfig};
pub use snapshot::{OwnedSnapshot, SessionSnapshot};
