//! Property-based tests for the session state machine.
//!
//! These tests drive a session with arbitrary interleavings of channel
//! lifecycle, user intents, and inbound frames, and verify:
//! - Every state change is a legal single step
//! - Chats while joined are appended in order, chats outside a room are dropped
//! - Sending never grows the log
//! - Rejected intents and broken frames never change the state

use chatsphere_core::{ConnectionState, Session, SessionAction};
use chatsphere_proto::{Frame, InboundEvent, Intent, encode_event};
use proptest::prelude::*;

/// One input to the session.
#[derive(Debug, Clone)]
enum Input {
    Open,
    Close,
    Intent(Intent),
    Event(InboundEvent),
    Raw(Vec<u8>),
}

fn short_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,8}",
        1 => Just(String::new()),
        1 => Just("  ".to_string()),
    ]
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        1 => Just(Intent::Create),
        2 => (short_text(), short_text()).prop_map(|(room_id, username)| Intent::Join { room_id, username }),
        2 => short_text().prop_map(|text| Intent::Send { text }),
    ]
}

fn event_strategy() -> impl Strategy<Value = InboundEvent> {
    prop_oneof![
        1 => "[A-Z0-9]{4}".prop_map(|room_code| InboundEvent::RoomCreated { room_code }),
        2 => Just(InboundEvent::Joined),
        4 => ("[a-z]{1,8}", "[a-z ]{1,16}").prop_map(|(username, text)| InboundEvent::Chat { username, text }),
        1 => "[a-z ]{0,12}".prop_map(|message| InboundEvent::Error { message }),
    ]
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        2 => Just(Input::Open),
        1 => Just(Input::Close),
        4 => intent_strategy().prop_map(Input::Intent),
        6 => event_strategy().prop_map(Input::Event),
        1 => prop::collection::vec(any::<u8>(), 0..32).prop_map(Input::Raw),
    ]
}

fn apply(session: &mut Session, input: Input) -> Vec<SessionAction> {
    match input {
        Input::Open => session.on_open(),
        Input::Close => {
            session.on_close("test");
            vec![]
        },
        Input::Intent(intent) => session.handle_intent(intent).unwrap_or_default(),
        Input::Event(event) => session.handle_frame(&encode_event(&event)),
        Input::Raw(bytes) => session.handle_frame(&Frame::from(bytes)),
    }
}

#[test]
fn prop_transitions_are_legal() {
    proptest!(|(inputs in prop::collection::vec(input_strategy(), 0..64))| {
        let mut session = Session::default();

        for input in inputs {
            let before = session.state();
            apply(&mut session, input.clone());
            let after = session.state();

            // PROPERTY: only single forward steps, self-loops, or resets
            prop_assert!(
                before.can_transition_to(after),
                "illegal transition {:?} -> {:?} on {:?}", before, after, input
            );
        }
    });
}

#[test]
fn prop_log_growth_follows_chat_events() {
    proptest!(|(inputs in prop::collection::vec(input_strategy(), 0..64))| {
        let mut session = Session::default();

        for input in inputs {
            let state = session.state();
            let before: Vec<_> = session.messages().iter().cloned().collect();

            let chat = match &input {
                Input::Event(InboundEvent::Chat { username, text }) => Some((username.clone(), text.clone())),
                _ => None,
            };
            apply(&mut session, input);

            let after: Vec<_> = session.messages().iter().cloned().collect();
            if session.state() == ConnectionState::Disconnected {
                prop_assert!(after.is_empty());
                continue;
            }

            match chat {
                // PROPERTY: chat while joined appends exactly one message at the end
                Some((username, text)) if state == ConnectionState::Joined => {
                    prop_assert_eq!(after.len(), before.len() + 1);
                    prop_assert_eq!(&after[..before.len()], &before[..]);
                    let last = &after[before.len()];
                    prop_assert_eq!(&last.username, &username);
                    prop_assert_eq!(&last.text, &text);
                },
                // PROPERTY: every other input leaves the log alone
                _ => prop_assert_eq!(after, before),
            }
        }
    });
}

#[test]
fn prop_rejected_input_keeps_state() {
    proptest!(|(
        inputs in prop::collection::vec(input_strategy(), 0..32),
        intent in intent_strategy(),
        garbage in prop::collection::vec(any::<u8>(), 0..64),
    )| {
        let mut session = Session::default();
        for input in inputs {
            apply(&mut session, input);
        }

        let state = session.state();
        let room_id = session.room_id().map(str::to_string);
        let len = session.messages().len();

        if session.handle_intent(intent).is_err() {
            prop_assert_eq!(session.state(), state);
            prop_assert_eq!(session.room_id().map(str::to_string), room_id);
        }

        // Garbage either fails to decode or happens to be a valid frame; only
        // the former is checked here.
        let frame = Frame::from(garbage);
        if chatsphere_proto::decode_event(&frame).is_err() {
            let state = session.state();
            session.handle_frame(&frame);
            prop_assert_eq!(session.state(), state);
            prop_assert_eq!(session.messages().len(), len);
        }
    });
}

#[test]
fn prop_send_has_no_local_echo() {
    proptest!(|(texts in prop::collection::vec("[a-z]{1,16}", 1..16))| {
        let mut session = Session::default();
        session.on_open();
        session.handle_intent(Intent::Join { room_id: "AB12".into(), username: "alice".into() }).unwrap();
        session.handle_event(InboundEvent::Joined);

        for text in &texts {
            let actions = session.handle_intent(Intent::Send { text: text.clone() }).unwrap();
            prop_assert_eq!(actions.len(), 1);
            prop_assert!(session.messages().is_empty());
        }

        for text in &texts {
            session.handle_event(InboundEvent::Chat { username: "alice".into(), text: text.clone() });
        }

        // PROPERTY: the log holds exactly the relayed messages in relay order
        let logged: Vec<_> = session.messages().iter().map(|m| m.text.clone()).collect();
        prop_assert_eq!(logged, texts);
    });
}

#[test]
fn scenario_create_join_chat() {
    let mut session = Session::default();
    session.on_open();

    session.handle_intent(Intent::Create).unwrap();
    session.handle_frame(&Frame::from(r#"{"type":"roomCreated","payload":{"roomCode":"AB12"}}"#));
    assert_eq!(session.room_id(), Some("AB12"));
    assert_eq!(session.state(), ConnectionState::ConnectedUnjoined);

    session.handle_intent(Intent::Join { room_id: "AB12".into(), username: "alice".into() }).unwrap();
    session.handle_frame(&Frame::from(r#"{"type":"joined"}"#));
    session.handle_frame(&Frame::from(r#"{"type":"chat","payload":{"username":"bob","message":"hi"}}"#));

    let snapshot = session.snapshot().to_owned();
    assert_eq!(snapshot.state, ConnectionState::Joined);
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].username, "bob");
    assert_eq!(snapshot.messages[0].text, "hi");
}
