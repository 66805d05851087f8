//! Deterministic simulation harness for Chatsphere.
//!
//! An in-process model of the coordination service plus the pieces needed to
//! run the real client stack against it: a [`MemoryConnector`] for the
//! channel manager, a [`ScriptedDriver`] for the runtime and a [`Recorder`]
//! that keeps every snapshot.
//!
//! # Synchronous World
//!
//! [`SimWorld`] connects several sessions to one [`SimServer`] without tasks
//! or channels, so tests choose the exact delivery order.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks recorded snapshot histories. Use
//! [`InvariantRegistry::standard()`] for the session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod recorder;
pub mod server;
pub mod sim_driver;
pub mod sim_server;
pub mod world;

pub use invariants::{
    IdentityMatchesState, Invariant, InvariantRegistry, InvariantResult, LegalTransitions,
    LogAppendOnly, MonotonicSequence, Violation,
};
pub use recorder::Recorder;
pub use server::{DROPPED_BY_SERVER, MemoryConnector, ServerHandle, spawn_server};
pub use sim_driver::{DriverProbe, ScriptedDriver};
pub use sim_server::{ConnId, Outbound, ROOM_CODE_LEN, SimServer};
pub use world::{ClientId, SimWorld};
