//! OCPP 1.6 inbound action handlers.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::bus::SharedEventBus;
use crate::domain::{
    Event, TOPIC_AUTHORIZE, TOPIC_BOOT_NOTIFICATION, TOPIC_HEARTBEAT, TOPIC_METER_VALUES,
    TOPIC_START_TRANSACTION, TOPIC_STATUS_NOTIFICATION, TOPIC_STOP_TRANSACTION,
};
use crate::session::Session;

use super::{HandlerError, HandlerSet};

pub struct V16Handlers {
    bus: SharedEventBus,
}

impl V16Handlers {
    pub fn new(bus: SharedEventBus) -> Self {
        Self { bus }
    }

    async fn publish(&self, topic: &str, session: &Session, payload: Value) {
        self.bus
            .publish(Event::new(
                topic,
                session.charge_point_id.clone(),
                Some(session.ocpp_version),
                payload,
                Utc::now(),
            ))
            .await;
    }
}

#[async_trait]
impl HandlerSet for V16Handlers {
    async fn handle_call(&self, session: &Session, action: &str, payload: Value) -> Result<Value, HandlerError> {
        match action {
            "BootNotification" => {
                self.publish(TOPIC_BOOT_NOTIFICATION, session, payload).await;
                Ok(json!({
                    "status": "Accepted",
                    "currentTime": Utc::now().to_rfc3339(),
                    "interval": 10,
                }))
            }
            "Heartbeat" => {
                self.publish(TOPIC_HEARTBEAT, session, payload).await;
                Ok(json!({ "currentTime": Utc::now().to_rfc3339() }))
            }
            "Authorize" => {
                self.publish(TOPIC_AUTHORIZE, session, payload).await;
                Ok(json!({ "idTagInfo": { "status": "Accepted" } }))
            }
            "StartTransaction" => {
                self.publish(TOPIC_START_TRANSACTION, session, payload).await;
                Ok(json!({
                    "transactionId": 1,
                    "idTagInfo": { "status": "Accepted" },
                }))
            }
            "StopTransaction" => {
                self.publish(TOPIC_STOP_TRANSACTION, session, payload).await;
                Ok(json!({ "idTagInfo": { "status": "Accepted" } }))
            }
            "StatusNotification" => {
                self.publish(TOPIC_STATUS_NOTIFICATION, session, payload).await;
                Ok(json!({}))
            }
            "MeterValues" => {
                self.publish(TOPIC_METER_VALUES, session, payload).await;
                Ok(json!({}))
            }
            _ => Err(HandlerError::NotImplemented),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::domain::{ChargePointSettings, OcppVersion};
    use crate::transport::MockChannel;
    use std::sync::Arc;

    fn test_session() -> std::sync::Arc<Session> {
        let (channel, _in_tx, _out_rx) = MockChannel::new();
        Session::new(
            "CP1",
            OcppVersion::V16,
            Arc::new(channel),
            ChargePointSettings::new(OcppVersion::V16),
            Arc::new(EventBus::new()),
        )
    }

    #[tokio::test]
    async fn boot_notification_accepts() {
        let handlers = V16Handlers::new(Arc::new(EventBus::new()));
        let session = test_session();
        let result = handlers
            .handle_call(&session, "BootNotification", json!({"chargePointModel": "X"}))
            .await
            .unwrap();
        assert_eq!(result["status"], "Accepted");
    }

    #[tokio::test]
    async fn unknown_action_is_not_implemented() {
        let handlers = V16Handlers::new(Arc::new(EventBus::new()));
        let session = test_session();
        let result = handlers.handle_call(&session, "DiagnosticsStatusNotification", json!({})).await;
        assert!(matches!(result, Err(HandlerError::NotImplemented)));
    }
}
