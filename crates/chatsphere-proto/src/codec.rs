//! JSON codec between typed values and frames.
//!
//! Decoding runs in two steps: the envelope (`type` + optional `payload`) is
//! parsed first, then the payload is read into a per-kind field struct whose
//! fields are all optional. Required fields are checked afterwards so a
//! missing field is reported as [`DecodeError::MissingField`] rather than as a
//! generic parse failure.
//!
//! # Invariants
//!
//! - Encoding is total and deterministic: the same value always produces the
//!   same bytes.
//! - Decoding is total: any byte input yields `Ok` or a [`DecodeError`].
//! - The size check happens before JSON parsing begins.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{DecodeError, Frame, InboundEvent, Intent, errors::Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomCreatedFields {
    room_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatEventFields {
    username: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorFields {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinFields {
    room_id: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatIntentFields {
    message: Option<String>,
}

/// Encode an intent into a client frame.
pub fn encode_intent(intent: &Intent) -> Frame {
    let value = match intent {
        Intent::Create => json!({ "type": "create" }),
        Intent::Join { room_id, username } => json!({
            "type": "join",
            "payload": { "roomId": room_id, "username": username },
        }),
        Intent::Send { text } => json!({
            "type": "chat",
            "payload": { "message": text },
        }),
    };
    Frame::from(value.to_string())
}

/// Decode a service frame into an event.
///
/// # Errors
///
/// - `DecodeError::TooLarge` if the frame exceeds [`Frame::MAX_SIZE`]
/// - `DecodeError::Malformed` if the frame is not a JSON object or a field has
///   the wrong type
/// - `DecodeError::MissingField` if a required field is absent
/// - `DecodeError::UnknownKind` if the `type` tag is not recognized
pub fn decode_event(frame: &Frame) -> Result<InboundEvent> {
    let (kind, payload) = envelope(frame)?;

    match kind.as_str() {
        "roomCreated" => {
            let fields: RoomCreatedFields = fields(payload)?;
            Ok(InboundEvent::RoomCreated {
                room_code: required("roomCreated", "roomCode", fields.room_code)?,
            })
        },
        "joined" => Ok(InboundEvent::Joined),
        "chat" => {
            let fields: ChatEventFields = fields(payload)?;
            Ok(InboundEvent::Chat {
                username: required("chat", "username", fields.username)?,
                text: required("chat", "message", fields.message)?,
            })
        },
        "error" => {
            let fields: ErrorFields = fields(payload)?;
            Ok(InboundEvent::Error { message: fields.message.unwrap_or_default() })
        },
        _ => Err(DecodeError::UnknownKind(kind)),
    }
}

/// Decode a client frame into an intent (service side).
///
/// # Errors
///
/// Same conditions as [`decode_event`].
pub fn decode_intent(frame: &Frame) -> Result<Intent> {
    let (kind, payload) = envelope(frame)?;

    match kind.as_str() {
        "create" => Ok(Intent::Create),
        "join" => {
            let fields: JoinFields = fields(payload)?;
            Ok(Intent::Join {
                room_id: required("join", "roomId", fields.room_id)?,
                username: required("join", "username", fields.username)?,
            })
        },
        "chat" => {
            let fields: ChatIntentFields = fields(payload)?;
            Ok(Intent::Send { text: required("chat", "message", fields.message)? })
        },
        _ => Err(DecodeError::UnknownKind(kind)),
    }
}

/// Encode an event into a service frame (service side).
pub fn encode_event(event: &InboundEvent) -> Frame {
    let value = match event {
        InboundEvent::RoomCreated { room_code } => json!({
            "type": "roomCreated",
            "payload": { "roomCode": room_code },
        }),
        InboundEvent::Joined => json!({ "type": "joined" }),
        InboundEvent::Chat { username, text } => json!({
            "type": "chat",
            "payload": { "username": username, "message": text },
        }),
        InboundEvent::Error { message } => json!({
            "type": "error",
            "payload": { "message": message },
        }),
    };
    Frame::from(value.to_string())
}

/// Split a frame into its `type` tag and optional payload.
fn envelope(frame: &Frame) -> Result<(String, Option<Value>)> {
    if frame.len() > Frame::MAX_SIZE {
        return Err(DecodeError::TooLarge { size: frame.len(), max: Frame::MAX_SIZE });
    }

    let value: Value = serde_json::from_slice(frame.as_bytes())?;
    let Value::Object(mut object) = value else {
        return Err(DecodeError::Malformed("expected a JSON object".to_string()));
    };

    let kind = match object.remove("type") {
        Some(Value::String(kind)) => kind,
        Some(_) => return Err(DecodeError::Malformed("`type` must be a string".to_string())),
        None => return Err(DecodeError::MissingField { kind: "frame", field: "type" }),
    };

    Ok((kind, object.remove("payload")))
}

/// Read the payload into a field struct. An absent or null payload yields
/// all-`None` fields.
fn fields<T: DeserializeOwned + Default>(payload: Option<Value>) -> Result<T> {
    match payload {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value @ Value::Object(_)) => Ok(serde_json::from_value(value)?),
        Some(_) => Err(DecodeError::Malformed("`payload` must be an object".to_string())),
    }
}

fn required(kind: &'static str, field: &'static str, value: Option<String>) -> Result<String> {
    value.ok_or(DecodeError::MissingField { kind, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: &Value) -> Frame {
        Frame::from(value.to_string())
    }

    fn parse(frame: &Frame) -> Value {
        serde_json::from_slice(frame.as_bytes()).unwrap()
    }

    #[test]
    fn encode_create() {
        let value = parse(&encode_intent(&Intent::Create));
        assert_eq!(value, json!({ "type": "create" }));
    }

    #[test]
    fn encode_join() {
        let intent = Intent::Join { room_id: "AB12".into(), username: "alice".into() };
        let value = parse(&encode_intent(&intent));
        assert_eq!(
            value,
            json!({ "type": "join", "payload": { "roomId": "AB12", "username": "alice" } })
        );
    }

    #[test]
    fn encode_send() {
        let value = parse(&encode_intent(&Intent::Send { text: "hi".into() }));
        assert_eq!(value, json!({ "type": "chat", "payload": { "message": "hi" } }));
    }

    #[test]
    fn encoding_is_deterministic() {
        let intent = Intent::Join { room_id: "AB12".into(), username: "alice".into() };
        assert_eq!(encode_intent(&intent), encode_intent(&intent));
    }

    #[test]
    fn decode_room_created() {
        let event = decode_event(&frame(&json!({
            "type": "roomCreated",
            "payload": { "roomCode": "AB12" },
        })));
        assert_eq!(event, Ok(InboundEvent::RoomCreated { room_code: "AB12".into() }));
    }

    #[test]
    fn decode_joined_without_payload() {
        assert_eq!(decode_event(&frame(&json!({ "type": "joined" }))), Ok(InboundEvent::Joined));
        assert_eq!(
            decode_event(&frame(&json!({ "type": "joined", "payload": null }))),
            Ok(InboundEvent::Joined)
        );
    }

    #[test]
    fn decode_chat() {
        let event = decode_event(&frame(&json!({
            "type": "chat",
            "payload": { "username": "bob", "message": "hi" },
        })));
        assert_eq!(event, Ok(InboundEvent::Chat { username: "bob".into(), text: "hi".into() }));
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let event = decode_event(&frame(&json!({
            "type": "chat",
            "payload": { "username": "bob", "message": "hi", "ts": 12 },
            "id": 7,
        })));
        assert_eq!(event, Ok(InboundEvent::Chat { username: "bob".into(), text: "hi".into() }));
    }

    #[test]
    fn decode_error_event_tolerates_missing_message() {
        assert_eq!(
            decode_event(&frame(&json!({ "type": "error" }))),
            Ok(InboundEvent::Error { message: String::new() })
        );
    }

    #[test]
    fn missing_required_field() {
        let result = decode_event(&frame(&json!({ "type": "chat", "payload": { "username": "bob" } })));
        assert_eq!(result, Err(DecodeError::MissingField { kind: "chat", field: "message" }));

        let result = decode_event(&frame(&json!({ "type": "roomCreated" })));
        assert_eq!(result, Err(DecodeError::MissingField { kind: "roomCreated", field: "roomCode" }));
    }

    #[test]
    fn missing_type_tag() {
        let result = decode_event(&frame(&json!({ "payload": {} })));
        assert_eq!(result, Err(DecodeError::MissingField { kind: "frame", field: "type" }));
    }

    #[test]
    fn unknown_kind_is_reported() {
        let result = decode_event(&frame(&json!({ "type": "typing" })));
        assert_eq!(result, Err(DecodeError::UnknownKind("typing".into())));
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let result = decode_event(&frame(&json!({ "type": "roomCreated", "payload": { "roomCode": 12 } })));
        assert!(matches!(result, Err(DecodeError::Malformed(_))));

        let result = decode_event(&frame(&json!({ "type": 3 })));
        assert!(matches!(result, Err(DecodeError::Malformed(_))));

        let result = decode_event(&frame(&json!({ "type": "chat", "payload": "hi" })));
        assert!(matches!(result, Err(DecodeError::Malformed(_))));

        let result = decode_event(&frame(&json!({ "type": "chat", "payload": ["bob", "hi"] })));
        assert!(matches!(result, Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn non_object_is_malformed() {
        for input in ["", "not json", "[\"joined\"]", "42", "null", "{\"type\":"] {
            let result = decode_event(&Frame::from(input));
            assert!(matches!(result, Err(DecodeError::Malformed(_))), "input {input:?}");
        }
    }

    #[test]
    fn long_chat_decodes() {
        let text = "x".repeat(200 * 1024);
        let event = InboundEvent::Chat { username: "bob".into(), text };
        assert_eq!(decode_event(&encode_event(&event)), Ok(event));
    }

    #[test]
    fn oversized_frame_rejected_before_parsing() {
        let frame = Frame::from(vec![b' '; Frame::MAX_SIZE + 1]);
        assert_eq!(
            decode_event(&frame),
            Err(DecodeError::TooLarge { size: Frame::MAX_SIZE + 1, max: Frame::MAX_SIZE })
        );
    }

    #[test]
    fn decode_intents() {
        assert_eq!(decode_intent(&encode_intent(&Intent::Create)), Ok(Intent::Create));

        let join = Intent::Join { room_id: "AB12".into(), username: "alice".into() };
        assert_eq!(decode_intent(&encode_intent(&join)), Ok(join));

        let result = decode_intent(&frame(&json!({ "type": "join", "payload": { "roomId": "AB12" } })));
        assert_eq!(result, Err(DecodeError::MissingField { kind: "join", field: "username" }));
    }

    #[test]
    fn encode_events() {
        let value = parse(&encode_event(&InboundEvent::Joined));
        assert_eq!(value, json!({ "type": "joined" }));

        let event = InboundEvent::Chat { username: "bob".into(), text: "hi".into() };
        let value = parse(&encode_event(&event));
        assert_eq!(
            value,
            json!({ "type": "chat", "payload": { "username": "bob", "message": "hi" } })
        );
    }
}
