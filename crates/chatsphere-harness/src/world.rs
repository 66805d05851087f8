//! Synchronous multi-client world.
//!
//! `SimWorld` wires several [`Session`]s to one [`SimServer`] without any
//! async machinery. Frames are queued per client and delivered in FIFO order
//! when the test calls [`SimWorld::deliver`]. This gives model-style tests
//! full control over interleavings.

use std::collections::{HashMap, VecDeque};

use chatsphere_core::{Anomaly, Session, SessionAction, SessionConfig, SessionError};
use chatsphere_proto::{Frame, Intent};

use crate::{ConnId, Outbound, SimServer};

/// Index of a client in the world.
pub type ClientId = usize;

/// Reason recorded when the world severs a client.
pub const DISCONNECTED: &str = "disconnected";

#[derive(Debug)]
struct SimClient {
    session: Session,
    conn: Option<ConnId>,
    inbox: VecDeque<Frame>,
    anomalies: Vec<Anomaly>,
}

/// Deterministic world of one service and several clients.
#[derive(Debug)]
pub struct SimWorld {
    server: SimServer,
    clients: Vec<SimClient>,
    /// Open connection → client
    routes: HashMap<ConnId, ClientId>,
    next_conn: ConnId,
}

impl SimWorld {
    /// Create a world with `clients` disconnected clients.
    pub fn new(seed: u64, clients: usize, config: &SessionConfig) -> Self {
        let clients = (0..clients)
            .map(|_| SimClient {
                session: Session::new(config.clone()),
                conn: None,
                inbox: VecDeque::new(),
                anomalies: Vec::new(),
            })
            .collect();

        Self { server: SimServer::new(seed), clients, routes: HashMap::new(), next_conn: 1 }
    }

    /// Number of clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// True if the world has no clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// The service.
    pub fn server(&self) -> &SimServer {
        &self.server
    }

    /// Session of `client`.
    pub fn session(&self, client: ClientId) -> Option<&Session> {
        self.clients.get(client).map(|c| &c.session)
    }

    /// Anomalies reported to `client` so far.
    pub fn anomalies(&self, client: ClientId) -> &[Anomaly] {
        self.clients.get(client).map_or(&[], |c| c.anomalies.as_slice())
    }

    /// Open a channel for `client`. No-op if it is already open.
    pub fn connect(&mut self, client: ClientId) {
        let Some(c) = self.clients.get_mut(client) else {
            return;
        };
        if c.conn.is_some() {
            return;
        }

        let conn = self.next_conn;
        self.next_conn += 1;
        c.conn = Some(conn);
        self.routes.insert(conn, client);
        self.server.connect(conn);

        let actions = c.session.on_open();
        self.execute(client, actions);
    }

    /// Close the channel of `client` from the client side.
    pub fn disconnect(&mut self, client: ClientId) {
        self.sever(client, DISCONNECTED);
    }

    /// Apply an intent on `client` and forward whatever it sends.
    ///
    /// # Errors
    ///
    /// Whatever the session rejects the intent with.
    pub fn submit(&mut self, client: ClientId, intent: Intent) -> Result<(), SessionError> {
        let Some(c) = self.clients.get_mut(client) else {
            return Ok(());
        };

        let actions = c.session.handle_intent(intent)?;
        self.execute(client, actions);
        Ok(())
    }

    /// Frames queued for `client`.
    pub fn pending(&self, client: ClientId) -> usize {
        self.clients.get(client).map_or(0, |c| c.inbox.len())
    }

    /// Deliver one queued frame to `client`. Returns `false` if none was
    /// queued.
    pub fn deliver(&mut self, client: ClientId) -> bool {
        let Some(c) = self.clients.get_mut(client) else {
            return false;
        };
        let Some(frame) = c.inbox.pop_front() else {
            return false;
        };

        let actions = c.session.handle_frame(&frame);
        self.execute(client, actions);
        true
    }

    /// Deliver queued frames, lowest client first, until every inbox is
    /// empty.
    pub fn deliver_all(&mut self) {
        while let Some(client) = self.clients.iter().position(|c| !c.inbox.is_empty()) {
            self.deliver(client);
        }
    }

    fn execute(&mut self, client: ClientId, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Send(frame) => {
                    let Some(conn) = self.clients.get(client).and_then(|c| c.conn) else {
                        continue;
                    };
                    let out = self.server.handle_frame(conn, &frame);
                    self.route(out);
                },
                SessionAction::Close { reason } => self.sever(client, &reason),
                SessionAction::Anomaly(anomaly) => {
                    if let Some(c) = self.clients.get_mut(client) {
                        c.anomalies.push(anomaly);
                    }
                },
            }
        }
    }

    fn route(&mut self, out: Vec<Outbound>) {
        for Outbound { conn, frame } in out {
            if let Some(c) = self.routes.get(&conn).and_then(|&id| self.clients.get_mut(id)) {
                c.inbox.push_back(frame);
            }
        }
    }

    /// Tear down the connection. Frames still queued for it are lost.
    fn sever(&mut self, client: ClientId, reason: &str) {
        let Some(c) = self.clients.get_mut(client) else {
            return;
        };

        if let Some(conn) = c.conn.take() {
            self.routes.remove(&conn);
            self.server.disconnect(conn);
        }
        c.inbox.clear();
        c.session.on_close(reason);
    }
}

#[cfg(test)]
mod tests {
    use chatsphere_core::{ConnectionState, Message};

    use super::*;

    fn room_of(world: &SimWorld, client: ClientId) -> String {
        world.session(client).and_then(|s| s.room_id()).unwrap().to_string()
    }

    fn join(room: &str, username: &str) -> Intent {
        Intent::Join { room_id: room.into(), username: username.into() }
    }

    #[test]
    fn two_clients_chat() {
        let mut world = SimWorld::new(3, 2, &SessionConfig::default());
        world.connect(0);
        world.connect(1);

        world.submit(0, Intent::Create).unwrap();
        world.deliver_all();
        let room = room_of(&world, 0);

        world.submit(0, join(&room, "alice")).unwrap();
        world.submit(1, join(&room, "bob")).unwrap();
        world.deliver_all();

        world.submit(1, Intent::Send { text: "hello".into() }).unwrap();
        world.deliver_all();

        for client in 0..2 {
            let session = world.session(client).unwrap();
            assert_eq!(session.state(), ConnectionState::Joined);
            let messages: Vec<_> = session.messages().iter().cloned().collect();
            assert_eq!(messages, vec![Message::new("bob", "hello")]);
        }
    }

    #[test]
    fn join_unknown_room_disconnects() {
        let mut world = SimWorld::new(3, 1, &SessionConfig::default());
        world.connect(0);

        world.submit(0, join("ZZZZ", "alice")).unwrap();
        world.deliver_all();

        assert_eq!(world.session(0).unwrap().state(), ConnectionState::Disconnected);
        assert!(matches!(world.anomalies(0), [Anomaly::ServerError { .. }]));
        assert!(!world.server().is_connected(1));
    }

    #[test]
    fn join_in_flight_keeps_its_room() {
        let mut world = SimWorld::new(3, 2, &SessionConfig::default());
        world.connect(0);
        world.connect(1);

        world.submit(0, Intent::Create).unwrap();
        world.deliver_all();
        let room_a = room_of(&world, 0);
        world.submit(1, Intent::Create).unwrap();
        world.deliver_all();
        let room_b = room_of(&world, 1);
        world.submit(0, join(&room_a, "bob")).unwrap();
        world.deliver_all();

        // alice's `joined` for A and bob's chat are both queued before she
        // tries to switch to B
        world.submit(1, join(&room_a, "alice")).unwrap();
        world.submit(0, Intent::Send { text: "msg in A".into() }).unwrap();
        assert_eq!(
            world.submit(1, join(&room_b, "alice")),
            Err(SessionError::InvalidState { state: ConnectionState::Joining, operation: "join" })
        );
        world.deliver_all();

        let alice = world.session(1).unwrap();
        assert_eq!(alice.state(), ConnectionState::Joined);
        assert_eq!(alice.room_id(), Some(room_a.as_str()));
        let messages: Vec<_> = alice.messages().iter().cloned().collect();
        assert_eq!(messages, vec![Message::new("bob", "msg in A")]);
        assert!(world.anomalies(1).is_empty());
        // alice holds the second connection
        assert_eq!(world.server().room_of(2), Some(room_a.as_str()));
    }

    #[test]
    fn disconnect_drops_pending_frames() {
        let mut world = SimWorld::new(3, 1, &SessionConfig::default());
        world.connect(0);
        world.submit(0, Intent::Create).unwrap();
        assert_eq!(world.pending(0), 1);

        world.disconnect(0);

        assert_eq!(world.pending(0), 0);
        assert!(!world.deliver(0));
    }
}
