//! Fuzz target for the Session state machine
//!
//! # Strategy
//!
//! - Channel lifecycle: open and close in any order, duplicates included
//! - Intents: create, join, and send with arbitrary strings
//! - Inbound: well-formed events and raw frame bytes
//! - Bounded and unbounded logs
//!
//! # Invariants
//!
//! - Every step is a legal state transition
//! - Rejected intents leave the session unchanged
//! - Disconnected sessions hold no identity and no messages
//! - Messages exist only while joined
//! - Sequence numbers never decrease
//! - The log never exceeds its capacity

#![no_main]

use std::num::NonZeroUsize;

use arbitrary::Arbitrary;
use chatsphere_core::{ConnectionState, Session, SessionConfig};
use chatsphere_proto::{encode_event, Frame, InboundEvent, Intent};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    capacity: Option<u8>,
    ops: Vec<SessionOp>,
}

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    Open,
    Close(String),
    Create,
    Join { room_id: String, username: String },
    Send(String),
    RoomCreated(String),
    Joined,
    Chat { username: String, text: String },
    ServerError(String),
    RawFrame(Vec<u8>),
}

fn step(session: &mut Session, op: SessionOp) {
    match op {
        SessionOp::Open => {
            session.on_open();
        }
        SessionOp::Close(reason) => session.on_close(&reason),
        SessionOp::Create => submit(session, Intent::Create),
        SessionOp::Join { room_id, username } => submit(session, Intent::Join { room_id, username }),
        SessionOp::Send(text) => submit(session, Intent::Send { text }),
        SessionOp::RoomCreated(room_code) => inbound(session, InboundEvent::RoomCreated { room_code }),
        SessionOp::Joined => inbound(session, InboundEvent::Joined),
        SessionOp::Chat { username, text } => inbound(session, InboundEvent::Chat { username, text }),
        SessionOp::ServerError(message) => inbound(session, InboundEvent::Error { message }),
        SessionOp::RawFrame(bytes) => {
            session.handle_frame(&Frame::new(bytes));
        }
    }
}

fn submit(session: &mut Session, intent: Intent) {
    let before = session.snapshot().to_owned();
    if session.handle_intent(intent).is_err() {
        assert_eq!(session.snapshot().to_owned(), before, "rejected intent changed the session");
    }
}

// Half the events go through the codec, half straight in
fn inbound(session: &mut Session, event: InboundEvent) {
    let frame = encode_event(&event);
    if frame.len() % 2 == 0 {
        session.handle_frame(&frame);
    } else {
        session.handle_event(event);
    }
}

fn check(session: &Session, previous: ConnectionState, previous_seq: u64, capacity: Option<NonZeroUsize>) {
    let snapshot = session.snapshot();

    assert!(
        previous.can_transition_to(snapshot.state),
        "illegal transition {previous} -> {}",
        snapshot.state
    );
    assert!(snapshot.messages.next_seq() >= previous_seq, "sequence went backwards");

    if snapshot.state == ConnectionState::Disconnected {
        assert!(snapshot.room_id.is_none());
        assert!(snapshot.username.is_none());
        assert!(snapshot.pending_room.is_none());
    }
    if snapshot.state != ConnectionState::Joined {
        assert!(snapshot.messages.is_empty(), "messages while {}", snapshot.state);
    }
    if let Some(capacity) = capacity {
        assert!(snapshot.messages.len() <= capacity.get());
    }
}

fuzz_target!(|input: Input| {
    let capacity = input.capacity.and_then(|c| NonZeroUsize::new(usize::from(c)));
    let mut session = Session::new(SessionConfig { log_capacity: capacity });

    for op in input.ops {
        let state = session.state();
        let seq = session.messages().next_seq();
        step(&mut session, op);
        check(&session, state, seq, capacity);
    }
});
