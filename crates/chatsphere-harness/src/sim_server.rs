//! Sans-IO model of the coordination service.
//!
//! `SimServer` holds rooms and memberships and turns client frames into
//! [`Outbound`] frames. It never touches a socket: the async wrapper in
//! [`crate::server`] and the synchronous [`crate::SimWorld`] both drive it.
//!
//! # Behavior
//!
//! - `create` allocates a fresh 4-character room code and replies
//!   `roomCreated` to the requester only. The requester is not joined.
//! - `join` replies `joined` if the room exists and `error` otherwise. A
//!   connection is in at most one room; joining another room leaves the first.
//! - `chat` fans out to every member of the sender's room, sender included.
//!   Chat from a connection outside any room is answered with `error`.
//! - Unknown intent types are ignored. Other undecodable frames are answered
//!   with `error`.

use std::collections::{BTreeSet, HashMap, HashSet};

use chatsphere_proto::{Frame, InboundEvent, Intent, decode_intent, encode_event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Connection identity on the service side.
pub type ConnId = u64;

/// Room code length.
pub const ROOM_CODE_LEN: usize = 4;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Frame addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Recipient
    pub conn: ConnId,
    /// Encoded event
    pub frame: Frame,
}

#[derive(Debug, Clone)]
struct Membership {
    room: String,
    username: String,
}

/// Deterministic coordination service.
#[derive(Debug, Clone)]
pub struct SimServer {
    rng: ChaCha8Rng,
    /// Room code → member connections, ordered for deterministic fan-out
    rooms: HashMap<String, BTreeSet<ConnId>>,
    members: HashMap<ConnId, Membership>,
    connections: HashSet<ConnId>,
}

impl SimServer {
    /// Create a service whose room codes are derived from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            rooms: HashMap::new(),
            members: HashMap::new(),
            connections: HashSet::new(),
        }
    }

    /// Register a new connection.
    pub fn connect(&mut self, conn: ConnId) {
        tracing::debug!(conn, "client connected");
        self.connections.insert(conn);
    }

    /// Forget a connection and its membership.
    pub fn disconnect(&mut self, conn: ConnId) {
        if self.connections.remove(&conn) {
            tracing::debug!(conn, "client disconnected");
        }
        self.leave(conn);
    }

    /// Decode and apply one client frame.
    pub fn handle_frame(&mut self, conn: ConnId, frame: &Frame) -> Vec<Outbound> {
        if !self.connections.contains(&conn) {
            tracing::debug!(conn, "frame from unknown connection");
            return vec![];
        }

        match decode_intent(frame) {
            Ok(intent) => self.handle_intent(conn, intent),
            Err(e) if e.is_ignorable() => {
                tracing::debug!(conn, error = %e, "ignoring frame");
                vec![]
            },
            Err(e) => vec![error(conn, format!("invalid request: {e}"))],
        }
    }

    /// Apply one decoded intent.
    pub fn handle_intent(&mut self, conn: ConnId, intent: Intent) -> Vec<Outbound> {
        match intent {
            Intent::Create => {
                let room_code = self.allocate_code();
                self.rooms.insert(room_code.clone(), BTreeSet::new());
                tracing::debug!(conn, %room_code, "room created");

                vec![reply(conn, &InboundEvent::RoomCreated { room_code })]
            },

            Intent::Join { room_id, username } => {
                if username.is_empty() {
                    return vec![error(conn, "username required".to_string())];
                }
                if !self.rooms.contains_key(&room_id) {
                    return vec![error(conn, format!("room {room_id} not found"))];
                }

                self.leave(conn);
                if let Some(room) = self.rooms.get_mut(&room_id) {
                    room.insert(conn);
                }
                tracing::debug!(conn, %room_id, %username, "joined");
                self.members.insert(conn, Membership { room: room_id, username });

                vec![reply(conn, &InboundEvent::Joined)]
            },

            Intent::Send { text } => {
                let Some(Membership { room, username }) = self.members.get(&conn) else {
                    return vec![error(conn, "not in a room".to_string())];
                };

                let frame = encode_event(&InboundEvent::Chat { username: username.clone(), text });
                self.rooms
                    .get(room)
                    .into_iter()
                    .flatten()
                    .map(|&member| Outbound { conn: member, frame: frame.clone() })
                    .collect()
            },
        }
    }

    /// Codes of all rooms created so far.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    /// Members of `room` in ascending order. Empty if the room is unknown.
    pub fn members(&self, room: &str) -> Vec<ConnId> {
        self.rooms.get(room).map(|m| m.iter().copied().collect()).unwrap_or_default()
    }

    /// Room `conn` is a member of.
    pub fn room_of(&self, conn: ConnId) -> Option<&str> {
        self.members.get(&conn).map(|m| m.room.as_str())
    }

    /// True if `conn` is registered.
    pub fn is_connected(&self, conn: ConnId) -> bool {
        self.connections.contains(&conn)
    }

    fn leave(&mut self, conn: ConnId) {
        if let Some(Membership { room, .. }) = self.members.remove(&conn)
            && let Some(members) = self.rooms.get_mut(&room)
        {
            members.remove(&conn);
        }
    }

    fn allocate_code(&mut self) -> String {
        loop {
            let code: String = (0..ROOM_CODE_LEN)
                .map(|_| char::from(ROOM_CODE_ALPHABET[self.rng.gen_range(0..ROOM_CODE_ALPHABET.len())]))
                .collect();

            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

fn reply(conn: ConnId, event: &InboundEvent) -> Outbound {
    Outbound { conn, frame: encode_event(event) }
}

fn error(conn: ConnId, message: String) -> Outbound {
    tracing::debug!(conn, %message, "rejecting request");
    reply(conn, &InboundEvent::Error { message })
}
