use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use super::{ChannelAdapter, ChannelError, IncomingMessage};

/// In-memory charge point stand-in for integration tests.
///
/// `outbound` lets the test harness inspect what the gateway sent; `inbound`
/// lets it feed frames as if the charge point had sent them.
pub struct MockChannel {
    inbound: Mutex<mpsc::UnboundedReceiver<IncomingMessage>>,
    outbound_tx: mpsc::UnboundedSender<String>,
    closed: AtomicBool,
}

impl MockChannel {
    /// Returns the adapter plus the two ends the test harness drives:
    /// a sender to push inbound frames, and a receiver to observe what
    /// the gateway sent out.
    pub fn new() -> (Self, mpsc::UnboundedSender<IncomingMessage>, mpsc::UnboundedReceiver<String>) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let channel = Self {
            inbound: Mutex::new(in_rx),
            outbound_tx: out_tx,
            closed: AtomicBool::new(false),
        };
        (channel, in_tx, out_rx)
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn recv(&self) -> Option<IncomingMessage> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        let mut rx = self.inbound.lock().await;
        let msg = rx.recv().await;
        if matches!(msg, Some(IncomingMessage::Closed) | None) {
            self.closed.store(true, Ordering::SeqCst);
        }
        msg
    }

    async fn send(&self, text: String) -> Result<(), ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        self.outbound_tx
            .send(text)
            .map_err(|e| ChannelError::Send(e.to_string()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
