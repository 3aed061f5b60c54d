//! Transport-level abstraction over a charge point's duplex connection.

mod mock;
mod ws;

pub use mock::MockChannel;
pub use ws::WsChannelAdapter;

use async_trait::async_trait;

/// One message received off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    Text(String),
    /// The remote end closed the connection (as opposed to us closing it).
    Closed,
}

/// Duplex text-message channel to a single charge point.
///
/// This is the seam that lets `Session` drive either a real WebSocket or an
/// in-memory test double without knowing which. `close()` is idempotent:
/// calling it after the remote already disconnected, or calling it twice, is
/// not an error.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    async fn recv(&self) -> Option<IncomingMessage>;
    async fn send(&self, text: String) -> Result<(), ChannelError>;
    async fn close(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel closed")]
    Closed,
    #[error("send failed: {0}")]
    Send(String),
}
