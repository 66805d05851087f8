//! Terminal UI for Chatsphere
//!
//! A thin shell over [`chatsphere_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`chatsphere_app::Runtime`].
//!
//! This crate only handles terminal rendering, command-line configuration
//! and picking a transport.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod connector;
pub mod logging;
pub mod terminal;
pub mod ui;

pub use chatsphere_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use config::Args;
pub use connector::AnyConnector;
pub use terminal::{TerminalDriver, TerminalError};
