//! WebSocket transport for the client.
//!
//! Provides [`WsConnector`], which opens a WebSocket and bridges it to a
//! [`Link`]. This is a thin layer that just moves frames; protocol logic
//! remains in the Sans-IO session.
//!
//! Frames go out as text messages. Text and binary messages are both accepted
//! inbound. Only `ws://` endpoints are supported.

use chatsphere_proto::Frame;
use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::{ChannelError, Connector, Link};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default depth of the frame queues on each side of the socket.
pub const DEFAULT_BUFFER: usize = 32;

/// Connects to the coordination service over WebSocket.
#[derive(Debug, Clone)]
pub struct WsConnector {
    buffer: usize,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self { buffer: DEFAULT_BUFFER }
    }
}

impl WsConnector {
    /// Connector with the default queue depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector with a custom queue depth.
    pub fn with_buffer(buffer: usize) -> Self {
        Self { buffer: buffer.max(1) }
    }
}

impl Connector for WsConnector {
    async fn connect(&mut self, endpoint: &str) -> Result<Link, ChannelError> {
        if !endpoint.starts_with("ws://") {
            return Err(ChannelError::Connect(format!(
                "unsupported endpoint {endpoint:?}: expected ws://"
            )));
        }

        let (socket, _response) =
            connect_async(endpoint).await.map_err(|e| ChannelError::Connect(e.to_string()))?;

        let (outbound, to_socket) = mpsc::channel(self.buffer);
        let (from_socket, inbound) = mpsc::channel(self.buffer);

        let task = tokio::spawn(run_socket(socket, to_socket, from_socket));

        Ok(Link { outbound, inbound, task: Some(task.abort_handle()) })
    }
}

/// Run the socket, bridging between the link queues and the WebSocket.
async fn run_socket(
    socket: Socket,
    mut outbound: mpsc::Receiver<Frame>,
    inbound: mpsc::Sender<Result<Frame, ChannelError>>,
) {
    let (mut sink, mut source) = socket.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // Manager released the link
                    let _ = sink.close().await;
                    return;
                };

                let Some(text) = frame.as_text() else {
                    tracing::warn!(len = frame.len(), "dropping non-UTF-8 outbound frame");
                    continue;
                };

                if let Err(e) = sink.send(Message::text(text.to_string())).await {
                    let _ = inbound.send(Err(ChannelError::Closed(e.to_string()))).await;
                    return;
                }
            }

            message = source.next() => {
                let frame = match message {
                    Some(Ok(Message::Text(text))) => Frame::from(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => Frame::new(bytes),
                    Some(Ok(Message::Close(close))) => {
                        if let Some(close) = close.filter(|c| !c.reason.as_str().is_empty()) {
                            let reason = close.reason.as_str().to_string();
                            let _ = inbound.send(Err(ChannelError::Closed(reason))).await;
                        }
                        return;
                    },
                    // Ping/pong are answered by tungstenite
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        let _ = inbound.send(Err(ChannelError::Closed(e.to_string()))).await;
                        return;
                    },
                    None => return,
                };

                if inbound.send(Ok(frame)).await.is_err() {
                    return;
                }
            }
        }
    }
}
