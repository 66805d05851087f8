//! Codec errors.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Reasons a frame could not be decoded.
///
/// Decoding is total: every byte sequence maps to a value or to one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame exceeds [`crate::Frame::MAX_SIZE`]. Checked before parsing.
    #[error("frame too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual frame size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Not a well-formed JSON object, or a field has the wrong type.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// A field required by the declared kind is absent.
    #[error("missing field `{field}` for `{kind}` frame")]
    MissingField {
        /// Declared frame kind
        kind: &'static str,
        /// Name of the missing field on the wire
        field: &'static str,
    },

    /// The `type` tag names no known frame kind.
    #[error("unknown frame type: {0:?}")]
    UnknownKind(String),
}

impl DecodeError {
    /// True if the frame should be skipped silently.
    ///
    /// Unknown kinds come from newer peers and never terminate the channel.
    /// Every other variant indicates a broken frame.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::UnknownKind(_))
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unknown_kind_is_ignorable() {
        assert!(DecodeError::UnknownKind("typing".into()).is_ignorable());
        assert!(!DecodeError::Malformed("eof".into()).is_ignorable());
        assert!(!DecodeError::MissingField { kind: "chat", field: "message" }.is_ignorable());
        assert!(!DecodeError::TooLarge { size: 2, max: 1 }.is_ignorable());
    }

    #[test]
    fn messages() {
        insta::assert_snapshot!(
            DecodeError::MissingField { kind: "roomCreated", field: "roomCode" },
            @"missing field `roomCode` for `roomCreated` frame"
        );
        insta::assert_snapshot!(
            DecodeError::UnknownKind("typing".into()),
            @r#"unknown frame type: "typing""#
        );
        insta::assert_snapshot!(
            DecodeError::TooLarge { size: 70000, max: 65536 },
            @"frame too large: 70000 bytes (max 65536)"
        );
    }
}
