//! Fan-out bridge from the event bus to connected dashboard sockets.
//!
//! Every event on every topic is serialized once and pushed to each
//! connected dashboard. A socket that fails to receive is deregistered
//! immediately — no retry, no buffering for a slow or dead dashboard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;

use crate::bus::EventSubscriber;
use crate::domain::Event;
use crate::transport::ChannelAdapter;

pub struct DashboardHub {
    sockets: DashMap<u64, Arc<dyn ChannelAdapter>>,
    next_id: AtomicU64,
}

pub type SharedDashboardHub = Arc<DashboardHub>;

impl DashboardHub {
    pub fn new() -> Self {
        Self {
            sockets: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a newly connected dashboard socket; returns a handle used to
    /// deregister it when that connection's read loop ends.
    pub fn register(&self, socket: Arc<dyn ChannelAdapter>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sockets.insert(id, socket);
        id
    }

    pub fn unregister(&self, id: u64) {
        self.sockets.remove(&id);
    }

    pub fn connection_count(&self) -> usize {
        self.sockets.len()
    }
}

impl Default for DashboardHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSubscriber for DashboardHub {
    async fn handle(&self, event: &Event) -> Result<(), String> {
        let envelope = json!({
            "event": event.topic,
            "charge_point_id": event.charge_point_id,
            "ocpp_version": event.ocpp_version.map(|v| v.version_string()),
            "payload": event.payload,
        })
        .to_string();

        let ids: Vec<u64> = self.sockets.iter().map(|e| *e.key()).collect();
        for id in ids {
            let Some(socket) = self.sockets.get(&id).map(|e| e.clone()) else { continue };
            if socket.send(envelope.clone()).await.is_err() {
                self.sockets.remove(&id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockChannel;
    use chrono::Utc;
    use serde_json::json as json_macro;

    #[tokio::test]
    async fn broadcasts_to_every_registered_socket() {
        let hub = DashboardHub::new();
        let (channel1, _in1, mut out1) = MockChannel::new();
        let (channel2, _in2, mut out2) = MockChannel::new();
        hub.register(Arc::new(channel1));
        hub.register(Arc::new(channel2));

        let event = Event::new("Heartbeat", "CP1", None, json_macro!({}), Utc::now());
        hub.handle(&event).await.unwrap();

        assert!(out1.recv().await.is_some());
        assert!(out2.recv().await.is_some());
    }

    #[tokio::test]
    async fn deregisters_socket_on_send_failure() {
        let hub = DashboardHub::new();
        let (channel, _in_tx, _out_rx) = MockChannel::new();
        channel.close().await;
        let id = hub.register(Arc::new(channel));

        let event = Event::new("Heartbeat", "CP1", None, json_macro!({}), Utc::now());
        hub.handle(&event).await.unwrap();

        assert_eq!(hub.connection_count(), 0);
        let _ = id;
    }
}
