//! Driver trait for abstracting UI I/O.
//!
//! The [`Driver`] trait decouples the application runtime from a specific
//! frontend. Each frontend implements the trait, while the generic
//! [`crate::Runtime`] handles all orchestration. Network I/O is not the
//! driver's concern: it goes through the channel manager's `Connector`.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts UI I/O operations for the application runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm event stream and a ratatui terminal
/// - **Simulation**: scripted key input from the harness
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input event.
    ///
    /// Returns `None` if the input source is exhausted, which the runtime
    /// treats as a request to quit. The future must be cancel-safe: the
    /// runtime drops it whenever a channel event arrives first.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release frontend resources.
    fn stop(&mut self);
}
