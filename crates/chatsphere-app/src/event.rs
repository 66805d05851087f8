//! Application input events.
//!
//! This module defines [`AppEvent`], the user-side inputs that drive the
//! [`crate::App`] state machine. Channel traffic does not pass through here:
//! it goes to the session, and the app sees its effect as a snapshot.

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}
