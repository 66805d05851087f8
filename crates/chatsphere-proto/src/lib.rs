//! Wire format for the Chatsphere room protocol.
//!
//! Every frame is a single JSON object with a `type` tag and an optional
//! `payload` object:
//!
//! ```text
//! client -> service   {"type":"create"}
//!                     {"type":"join","payload":{"roomId":"AB12","username":"alice"}}
//!                     {"type":"chat","payload":{"message":"hi"}}
//!
//! service -> client   {"type":"roomCreated","payload":{"roomCode":"AB12"}}
//!                     {"type":"joined"}
//!                     {"type":"chat","payload":{"username":"bob","message":"hi"}}
//!                     {"type":"error","payload":{"message":"room not found"}}
//! ```
//!
//! The codec is pure: no I/O and no state. Decoding never panics; every input
//! yields either a typed value or a [`DecodeError`] so the caller can decide
//! whether to ignore or surface the failure.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod event;
pub mod frame;
pub mod intent;

pub use codec::{decode_event, decode_intent, encode_event, encode_intent};
pub use errors::{DecodeError, Result};
pub use event::InboundEvent;
pub use frame::Frame;
pub use intent::Intent;
