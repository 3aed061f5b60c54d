use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use super::{ChannelAdapter, ChannelError, IncomingMessage};

/// `ChannelAdapter` backed by an axum WebSocket, split into independently
/// lockable halves so `send`/`recv`/`close` can all take `&self` (the
/// `Session` that owns this adapter is shared behind an `Arc`).
pub struct WsChannelAdapter {
    sink: Mutex<futures_util::stream::SplitSink<WebSocket, Message>>,
    stream: Mutex<futures_util::stream::SplitStream<WebSocket>>,
    closed: AtomicBool,
}

impl WsChannelAdapter {
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ChannelAdapter for WsChannelAdapter {
    async fn recv(&self) -> Option<IncomingMessage> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(IncomingMessage::Text(text.to_string())),
                Some(Ok(Message::Close(_))) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Some(IncomingMessage::Closed);
                }
                Some(Ok(_)) => continue, // ping/pong/binary: not part of the OCPP-J wire format
                Some(Err(_)) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return Some(IncomingMessage::Closed);
                }
                None => {
                    self.closed.store(true, Ordering::SeqCst);
                    return None;
                }
            }
        }
    }

    async fn send(&self, text: String) -> Result<(), ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| ChannelError::Send(e.to_string()))
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut sink = self.sink.lock().await;
        let _ = sink.close().await;
    }
}
