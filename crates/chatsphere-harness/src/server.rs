//! In-process coordination service.
//!
//! [`spawn_server`] runs a [`SimServer`] on a tokio task. Clients reach it
//! through [`MemoryConnector`], which hands the service the far end of an
//! in-memory [`Link`]. The same [`chatsphere_client::ChannelManager`] code
//! that drives a WebSocket in production drives these links in tests and in
//! the binary's local mode.

use std::collections::HashMap;

use chatsphere_client::{ChannelError, Connector, Link, LinkPeer};
use chatsphere_proto::Frame;
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinHandle},
};

use crate::{ConnId, SimServer};

/// Depth of each in-memory link queue.
pub const LINK_BUFFER: usize = 32;

/// Reason given to clients when [`ServerHandle::drop_all`] severs them.
pub const DROPPED_BY_SERVER: &str = "connection reset by server";

enum Command {
    Attach(LinkPeer),
    DropAll,
    Stop,
}

enum Traffic {
    Frame(ConnId, Frame),
    Gone(ConnId),
}

struct Connection {
    to_client: mpsc::Sender<Result<Frame, ChannelError>>,
    reader: AbortHandle,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Control handle for a running in-process service.
#[derive(Debug)]
pub struct ServerHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Connector whose links attach to this service.
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector { commands: self.commands.clone() }
    }

    /// Sever every open connection, as if the service restarted.
    pub fn drop_all(&self) {
        let _ = self.commands.send(Command::DropAll);
    }

    /// Stop the service and wait for it to finish. Later connects fail.
    pub async fn stop(self) {
        let _ = self.commands.send(Command::Stop);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "server task failed");
        }
    }
}

/// Connects to an in-process service started with [`spawn_server`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    commands: mpsc::UnboundedSender<Command>,
}

impl Connector for MemoryConnector {
    async fn connect(&mut self, endpoint: &str) -> Result<Link, ChannelError> {
        let (link, peer) = Link::pair(LINK_BUFFER);

        self.commands
            .send(Command::Attach(peer))
            .map_err(|_| ChannelError::Connect(format!("{endpoint}: service is not running")))?;

        Ok(link)
    }
}

/// Start a [`SimServer`] seeded with `seed` on the current runtime.
pub fn spawn_server(seed: u64) -> ServerHandle {
    let (commands, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(serve(SimServer::new(seed), rx));
    ServerHandle { commands, task }
}

async fn serve(mut server: SimServer, mut commands: mpsc::UnboundedReceiver<Command>) {
    let (traffic_tx, mut traffic) = mpsc::unbounded_channel();
    let mut connections: HashMap<ConnId, Connection> = HashMap::new();
    let mut next_conn: ConnId = 1;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Attach(peer)) => {
                    let conn = next_conn;
                    next_conn += 1;

                    let reader = tokio::spawn(read_client(conn, peer.from_client, traffic_tx.clone()));
                    connections.insert(conn, Connection {
                        to_client: peer.to_client,
                        reader: reader.abort_handle(),
                    });
                    server.connect(conn);
                },
                Some(Command::DropAll) => {
                    tracing::info!(count = connections.len(), "dropping all connections");
                    for (conn, connection) in connections.drain() {
                        server.disconnect(conn);
                        let _ = connection
                            .to_client
                            .send(Err(ChannelError::Closed(DROPPED_BY_SERVER.to_string())))
                            .await;
                    }
                },
                Some(Command::Stop) | None => break,
            },

            Some(input) = traffic.recv() => match input {
                Traffic::Frame(conn, frame) => {
                    for out in server.handle_frame(conn, &frame) {
                        let Some(connection) = connections.get(&out.conn) else {
                            continue;
                        };
                        if connection.to_client.send(Ok(out.frame)).await.is_err() {
                            server.disconnect(out.conn);
                            connections.remove(&out.conn);
                        }
                    }
                },
                Traffic::Gone(conn) => {
                    server.disconnect(conn);
                    connections.remove(&conn);
                },
            },
        }
    }

    tracing::info!("server stopped");
}

async fn read_client(
    conn: ConnId,
    mut from_client: mpsc::Receiver<Frame>,
    traffic: mpsc::UnboundedSender<Traffic>,
) {
    while let Some(frame) = from_client.recv().await {
        if traffic.send(Traffic::Frame(conn, frame)).is_err() {
            return;
        }
    }
    let _ = traffic.send(Traffic::Gone(conn));
}
