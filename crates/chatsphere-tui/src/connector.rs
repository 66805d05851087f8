//! Transport selection.
//!
//! The binary talks either to a remote service over WebSocket or to an
//! in-process service. [`AnyConnector`] lets one runtime type serve both.

use chatsphere_client::{ChannelError, Connector, Link, transport::WsConnector};
use chatsphere_harness::MemoryConnector;

/// Either transport.
#[derive(Debug, Clone)]
pub enum AnyConnector {
    /// WebSocket to a remote service
    Remote(WsConnector),
    /// In-process service
    Local(MemoryConnector),
}

impl Connector for AnyConnector {
    async fn connect(&mut self, endpoint: &str) -> Result<Link, ChannelError> {
        match self {
            Self::Remote(connector) => connector.connect(endpoint).await,
            Self::Local(connector) => connector.connect(endpoint).await,
        }
    }
}
