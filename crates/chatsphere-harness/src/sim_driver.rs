//! Scripted driver implementing the Driver trait.
//!
//! `ScriptedDriver` stands in for the terminal in end-to-end tests. It feeds
//! a fixed script of input events to [`chatsphere_app::Runtime`] and reports
//! an exhausted input source once the script ends, which quits the runtime.
//!
//! Waits in the script give the in-process service time to answer. Run the
//! tests on a paused tokio clock so waits are instant and deterministic.

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chatsphere_app::{App, AppEvent, Driver, KeyInput};
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Step {
    Event(AppEvent),
    Wait(Duration),
}

/// Counters shared between a [`ScriptedDriver`] and the test that owns it.
#[derive(Debug, Clone, Default)]
pub struct DriverProbe {
    renders: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
}

impl DriverProbe {
    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// True once the runtime has stopped the driver.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Driver that replays a fixed input script.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    script: VecDeque<Step>,
    /// Deadline of the wait in progress, kept across cancelled polls
    waking_at: Option<Instant>,
    probe: DriverProbe,
}

impl ScriptedDriver {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one input event.
    #[must_use]
    pub fn event(mut self, event: AppEvent) -> Self {
        self.script.push_back(Step::Event(event));
        self
    }

    /// Append one key press.
    #[must_use]
    pub fn key(self, key: KeyInput) -> Self {
        self.event(AppEvent::Key(key))
    }

    /// Append the keys of `line` followed by Enter.
    #[must_use]
    pub fn type_line(self, line: &str) -> Self {
        line.chars().fold(self, |driver, c| driver.key(KeyInput::Char(c))).key(KeyInput::Enter)
    }

    /// Append a pause.
    #[must_use]
    pub fn wait(mut self, duration: Duration) -> Self {
        self.script.push_back(Step::Wait(duration));
        self
    }

    /// Handle for observing the driver after it moves into the runtime.
    pub fn probe(&self) -> DriverProbe {
        self.probe.clone()
    }
}

impl Driver for ScriptedDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            match self.script.front() {
                None => return Ok(None),
                Some(Step::Event(_)) => {
                    if let Some(Step::Event(event)) = self.script.pop_front() {
                        return Ok(Some(event));
                    }
                },
                Some(Step::Wait(duration)) => {
                    let deadline = *self.waking_at.get_or_insert_with(|| Instant::now() + *duration);
                    tokio::time::sleep_until(deadline).await;

                    self.waking_at = None;
                    self.script.pop_front();
                },
            }
        }
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.probe.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.probe.stopped.store(true, Ordering::SeqCst);
    }
}
