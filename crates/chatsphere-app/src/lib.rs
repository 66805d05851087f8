//! Application layer for Chatsphere
//!
//! Pure state machines and generic runtime for UI and protocol orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: Presentation Adapter (input handling, commands, view state)
//! - [`Observer`]: Receives session snapshots after every applied input
//! - [`Driver`]: Trait for platform-specific UI I/O
//! - [`Runtime`]: Generic event loop tying channel, session and app together

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
pub mod command;
mod driver;
mod event;
mod input;
mod observer;
mod runtime;
mod view;

pub use action::AppAction;
pub use app::App;
pub use command::Command;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{Edit, InputState, KeyInput};
pub use observer::{Notice, Observer};
pub use runtime::{Runtime, RuntimeConfig};
pub use view::{ChatLine, ViewState};
