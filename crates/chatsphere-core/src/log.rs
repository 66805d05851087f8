//! Ordered log of chat messages for the active room.
//!
//! Messages are kept in arrival order. Each append is assigned a sequence
//! number from a counter that never goes backwards, not even across
//! [`MessageLog::clear`]. Observers that keep their own copy of the log use
//! [`LogView::since`] to pick up only messages they have not seen yet.
//!
//! # Invariants
//!
//! - Retained messages are in append order.
//! - Sequence numbers of retained messages are contiguous:
//!   `first_seq..next_seq`.
//! - With a capacity, the oldest message is evicted first.

use std::{
    collections::{VecDeque, vec_deque},
    num::NonZeroUsize,
};

/// A chat message as received from the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name of the sender
    pub username: String,
    /// Message text
    pub text: String,
}

impl Message {
    /// Create a message.
    pub fn new(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self { username: username.into(), text: text.into() }
    }
}

/// Append-only message log, optionally bounded.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: VecDeque<Message>,
    capacity: Option<NonZeroUsize>,
    next_seq: u64,
}

impl MessageLog {
    /// Unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that retains at most `capacity` messages.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.get()), capacity: Some(capacity), next_seq: 0 }
    }

    /// Append a message, evicting the oldest one if the log is full.
    ///
    /// Returns the sequence number assigned to the message.
    pub fn append(&mut self, message: Message) -> u64 {
        if let Some(capacity) = self.capacity
            && self.entries.len() == capacity.get()
        {
            self.entries.pop_front();
        }

        let seq = self.next_seq;
        self.entries.push_back(message);
        self.next_seq += 1;
        seq
    }

    /// Drop every message. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no messages are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained messages. `None` if unbounded.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Read-only view for rendering.
    pub fn view(&self) -> LogView<'_> {
        LogView { entries: &self.entries, next_seq: self.next_seq }
    }
}

/// Borrowed, restartable view of a [`MessageLog`].
///
/// Iterating never consumes the view; iterate as often as needed.
#[derive(Debug, Clone, Copy)]
pub struct LogView<'a> {
    entries: &'a VecDeque<Message>,
    next_seq: u64,
}

impl<'a> LogView<'a> {
    /// Messages in arrival order.
    pub fn iter(self) -> vec_deque::Iter<'a, Message> {
        self.entries.iter()
    }

    /// Messages paired with their sequence numbers.
    pub fn entries(self) -> impl Iterator<Item = (u64, &'a Message)> + 'a {
        (self.first_seq()..).zip(self.entries.iter())
    }

    /// Messages with a sequence number of at least `seq`.
    pub fn since(self, seq: u64) -> impl Iterator<Item = (u64, &'a Message)> + 'a {
        let skip = seq.saturating_sub(self.first_seq()) as usize;
        self.entries().skip(skip)
    }

    /// Sequence number of the oldest retained message, or of the next append
    /// if the view is empty.
    pub fn first_seq(&self) -> u64 {
        self.next_seq - self.entries.len() as u64
    }

    /// Sequence number the next append will receive.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Number of messages in the view.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the view holds no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&'a Message> {
        self.entries.back()
    }
}

impl<'a> IntoIterator for LogView<'a> {
    type IntoIter = vec_deque::Iter<'a, Message>;
    type Item = &'a Message;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
