//! In-process publish/subscribe event bus.
//!
//! `publish` awaits every subscriber of a topic, in registration order. A
//! subscriber that errors is logged and does not stop delivery to the rest —
//! the same shape as the handler-list bus this is grounded on, just typed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::Event;

#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle(&self, event: &Event) -> Result<(), String>;
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Vec<Arc<dyn EventSubscriber>>>>,
}

pub type SharedEventBus = Arc<EventBus>;

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, topic: impl Into<String>, subscriber: Arc<dyn EventSubscriber>) {
        let mut subs = self.subscribers.write().await;
        subs.entry(topic.into()).or_default().push(subscriber);
    }

    /// Deliver `event` to every subscriber of `event.topic`, in order.
    ///
    /// The subscriber list is cloned out from under the lock before any
    /// `.await` on a handler, so a slow handler never blocks `subscribe`.
    pub async fn publish(&self, event: Event) {
        let handlers = {
            let subs = self.subscribers.read().await;
            subs.get(&event.topic).cloned().unwrap_or_default()
        };

        for handler in handlers {
            if let Err(err) = handler.handle(&event).await {
                tracing::warn!(
                    topic = %event.topic,
                    charge_point_id = %event.charge_point_id,
                    error = %err,
                    "event subscriber failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSubscriber(Arc<AtomicUsize>);

    #[async_trait]
    impl EventSubscriber for CountingSubscriber {
        async fn handle(&self, _event: &Event) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSubscriber;

    #[async_trait]
    impl EventSubscriber for FailingSubscriber {
        async fn handle(&self, _event: &Event) -> Result<(), String> {
            Err("boom".into())
        }
    }

    fn test_event(topic: &str) -> Event {
        Event::new(topic, "CP1", None, json!({}), Utc::now())
    }

    #[tokio::test]
    async fn delivers_to_all_subscribers_in_order() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe("Heartbeat", Arc::new(CountingSubscriber(count.clone())))
            .await;
        bus.subscribe("Heartbeat", Arc::new(CountingSubscriber(count.clone())))
            .await;

        bus.publish(test_event("Heartbeat")).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_block_later_ones() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe("Heartbeat", Arc::new(FailingSubscriber)).await;
        bus.subscribe("Heartbeat", Arc::new(CountingSubscriber(count.clone())))
            .await;

        bus.publish(test_event("Heartbeat")).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unrelated_topic_receives_nothing() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe("Heartbeat", Arc::new(CountingSubscriber(count.clone())))
            .await;

        bus.publish(test_event("MeterValues")).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
