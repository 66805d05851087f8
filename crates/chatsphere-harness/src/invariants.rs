//! Invariant checking over recorded snapshot histories.
//!
//! Invariants are properties that must hold across every execution path,
//! not in one scenario. Each check looks at the whole history an observer
//! recorded, so it can judge transitions as well as individual states.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.check_all(&recorder.snapshots())?;
//! ```

use std::fmt;

use chatsphere_core::{ConnectionState, OwnedSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Index of the offending snapshot in the history.
    pub index: usize,
    /// Description of what went wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at snapshot {}: {}", self.invariant, self.index, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of a snapshot history.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a history, oldest snapshot first.
    fn check(&self, history: &[OwnedSnapshot]) -> InvariantResult;
}

fn violation(invariant: &dyn Invariant, index: usize, message: String) -> Violation {
    Violation { invariant: invariant.name(), index, message }
}

/// Every state change is one the session allows.
pub struct LegalTransitions;

impl Invariant for LegalTransitions {
    fn name(&self) -> &'static str {
        "legal_transitions"
    }

    fn check(&self, history: &[OwnedSnapshot]) -> InvariantResult {
        for (i, pair) in history.windows(2).enumerate() {
            let (from, to) = (pair[0].state, pair[1].state);
            if !from.can_transition_to(to) {
                return Err(violation(self, i + 1, format!("{from} -> {to}")));
            }
        }
        Ok(())
    }
}

/// Identity fields match the connection state.
///
/// Disconnected sessions hold nothing. A joined session has a room and a
/// username and no join in flight. A joining session has a join target.
/// Messages exist only while joined.
pub struct IdentityMatchesState;

impl Invariant for IdentityMatchesState {
    fn name(&self) -> &'static str {
        "identity_matches_state"
    }

    fn check(&self, history: &[OwnedSnapshot]) -> InvariantResult {
        for (i, s) in history.iter().enumerate() {
            let ok = match s.state {
                ConnectionState::Disconnected => {
                    s.room_id.is_none() && s.username.is_none() && s.pending_room.is_none()
                },
                ConnectionState::ConnectedUnjoined => s.pending_room.is_none(),
                ConnectionState::Joining => s.pending_room.is_some() && s.username.is_some(),
                ConnectionState::Joined => {
                    s.room_id.is_some() && s.username.is_some() && s.pending_room.is_none()
                },
            };
            if !ok {
                return Err(violation(self, i, format!("inconsistent identity while {}: {s:?}", s.state)));
            }

            if s.state != ConnectionState::Joined && !s.messages.is_empty() {
                return Err(violation(self, i, format!("{} messages while {}", s.messages.len(), s.state)));
            }
        }
        Ok(())
    }
}

/// Sequence numbers never go backwards, even across disconnects.
pub struct MonotonicSequence;

impl Invariant for MonotonicSequence {
    fn name(&self) -> &'static str {
        "monotonic_sequence"
    }

    fn check(&self, history: &[OwnedSnapshot]) -> InvariantResult {
        for (i, pair) in history.windows(2).enumerate() {
            if pair[1].next_seq < pair[0].next_seq {
                return Err(violation(
                    self,
                    i + 1,
                    format!("next_seq went from {} to {}", pair[0].next_seq, pair[1].next_seq),
                ));
            }
        }
        Ok(())
    }
}

/// While joined, the log only grows at the tail. Old messages may be evicted
/// from the head but are never reordered or rewritten.
pub struct LogAppendOnly;

impl Invariant for LogAppendOnly {
    fn name(&self) -> &'static str {
        "log_append_only"
    }

    fn check(&self, history: &[OwnedSnapshot]) -> InvariantResult {
        for (i, pair) in history.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.state != ConnectionState::Joined || next.state != ConnectionState::Joined {
                continue;
            }

            let appended = usize::try_from(next.next_seq.saturating_sub(prev.next_seq)).unwrap_or(usize::MAX);
            let evicted = (prev.messages.len().saturating_add(appended)).saturating_sub(next.messages.len());
            let kept = prev.messages.get(evicted..).unwrap_or_default();

            if next.messages.get(..kept.len()) != Some(kept) {
                return Err(violation(self, i + 1, "existing messages changed".to_string()));
            }
        }
        Ok(())
    }
}

/// Registry of invariants to check.
///
/// Use [`InvariantRegistry::standard()`] for the session invariants.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every session invariant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(LegalTransitions);
        registry.add(IdentityMatchesState);
        registry.add(MonotonicSequence);
        registry.add(LogAppendOnly);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against a history.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, history: &[OwnedSnapshot]) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> = self.invariants.iter().filter_map(|inv| inv.check(history).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
