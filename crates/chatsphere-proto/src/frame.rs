//! Frame type.
//!
//! A `Frame` is the unit the channel moves: the raw bytes of exactly one JSON
//! object. It is a pure data holder. For typed access see
//! [`crate::decode_event`] and [`crate::encode_intent`].

use std::fmt;

use bytes::Bytes;

/// One wire frame.
///
/// # Invariants
///
/// - Frames produced by the encoders are valid UTF-8 JSON.
/// - Inbound frames may be arbitrary bytes. Validation happens at decode time,
///   where frames larger than [`Frame::MAX_SIZE`] are rejected before any
///   parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Maximum accepted inbound frame size (1 MiB).
    pub const MAX_SIZE: usize = 1024 * 1024;

    /// Wrap raw bytes as a frame.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self { payload: payload.into() }
    }

    /// Raw frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Frame bytes as UTF-8 text. `None` if the bytes are not valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the frame carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consume the frame, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Self::new(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<Vec<u8>> for Frame {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_access() {
        let frame = Frame::from(r#"{"type":"joined"}"#);
        assert_eq!(frame.as_text(), Some(r#"{"type":"joined"}"#));
        assert_eq!(frame.len(), 17);
        assert!(!frame.is_empty());
    }

    #[test]
    fn invalid_utf8_has_no_text() {
        let frame = Frame::from(vec![0xff, 0xfe, 0x00]);
        assert_eq!(frame.as_text(), None);
        assert_eq!(frame.to_string(), "\u{fffd}\u{fffd}\u{0}");
    }
}
