//! Observer that records everything it is shown.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatsphere_app::{Notice, Observer};
use chatsphere_core::{OwnedSnapshot, SessionSnapshot};

#[derive(Debug, Default)]
struct Recording {
    snapshots: Vec<OwnedSnapshot>,
    notices: Vec<Notice>,
}

/// Records owned snapshots and notices.
///
/// Clones share one recording: subscribe one clone to the runtime and keep
/// another to inspect the history afterwards.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Recording>>,
}

impl Recorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every snapshot seen, oldest first.
    pub fn snapshots(&self) -> Vec<OwnedSnapshot> {
        self.lock().snapshots.clone()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<OwnedSnapshot> {
        self.lock().snapshots.last().cloned()
    }

    /// Every notice seen, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }
}

impl Observer for Recorder {
    fn on_snapshot(&mut self, snapshot: &SessionSnapshot<'_>) {
        self.lock().snapshots.push(snapshot.to_owned());
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.lock().notices.push(notice.clone());
    }
}
