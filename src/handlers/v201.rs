//! OCPP 2.0.1 inbound action handlers.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::bus::SharedEventBus;
use crate::domain::{
    Event, TOPIC_AUTHORIZE, TOPIC_BOOT_NOTIFICATION, TOPIC_HEARTBEAT, TOPIC_METER_VALUES,
    TOPIC_NOTIFY_EVENT, TOPIC_NOTIFY_REPORT, TOPIC_START_TRANSACTION, TOPIC_STATUS_NOTIFICATION,
    TOPIC_STOP_TRANSACTION,
};
use crate::session::Session;

use super::{HandlerError, HandlerSet};

pub struct V201Handlers {
    bus: SharedEventBus,
}

impl V201Handlers {
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

    /// `TransactionEvent` carries Started/Updated/Ended in one message type;
    /// route to the closest 1.6-shaped topic so downstream subscribers don't
    /// need to care which dialect is talking.
    async fn handle_transaction_event(&self, session: &Session, payload: Value) -> Value {
        let event_type = payload.get("eventType").and_then(Value::as_str).unwrap_or("");

        match event_type {
            "Started" => self.publish(TOPIC_START_TRANSACTION, session, payload.clone()).await,
            "Ended" => self.publish(TOPIC_STOP_TRANSACTION, session, payload.clone()).await,
            _ => {}
        }

        if payload.get("meterValue").map(|v| !v.is_null()).unwrap_or(false) {
            self.publish(TOPIC_METER_VALUES, session, payload.clone()).await;
        }

        json!({ "idTokenInfo": { "status": "Accepted" } })
    }

    async fn handle_notify_report(&self, session: &Session, payload: Value) -> Value {
        let seq_no = payload.get("seqNo").and_then(Value::as_i64).unwrap_or(0);
        let tbc = payload.get("tbc").and_then(Value::as_bool).unwrap_or(false);
        let report_data = payload
            .get("reportData")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let rows = session.ingest_notify_report(seq_no, tbc, &report_data).await;

        self.publish(
            TOPIC_NOTIFY_REPORT,
            session,
            json!({ "seqNo": seq_no, "tbc": tbc, "rows": rows }),
        )
        .await;

        json!({})
    }
}

#[async_trait]
impl HandlerSet for V201Handlers {
    async fn handle_call(&self, session: &Session, action: &str, payload: Value) -> Result<Value, HandlerError> {
        match action {
            "BootNotification" => {
                self.publish(TOPIC_BOOT_NOTIFICATION, session, payload).await;
                Ok(json!({
                    "currentTime": Utc::now().to_rfc3339(),
                    "interval": 10,
                    "status": "Accepted",
                }))
            }
            "Heartbeat" => {
                self.publish(TOPIC_HEARTBEAT, session, payload).await;
                Ok(json!({ "currentTime": Utc::now().to_rfc3339() }))
            }
            "Authorize" => {
                self.publish(TOPIC_AUTHORIZE, session, payload).await;
                Ok(json!({ "idTokenInfo": { "status": "Accepted" } }))
            }
            "TransactionEvent" => Ok(self.handle_transaction_event(session, payload).await),
            "StatusNotification" => {
                self.publish(TOPIC_STATUS_NOTIFICATION, session, payload).await;
                Ok(json!({}))
            }
            "MeterValues" => {
                self.publish(TOPIC_METER_VALUES, session, payload).await;
                Ok(json!({}))
            }
            "NotifyReport" => Ok(self.handle_notify_report(session, payload).await),
            "NotifyEvent" => {
                self.publish(TOPIC_NOTIFY_EVENT, session, payload).await;
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

    fn test_session() -> Arc<Session> {
        let (channel, _in_tx, _out_rx) = MockChannel::new();
        Session::new(
            "CP1",
            OcppVersion::V201,
            Arc::new(channel),
            ChargePointSettings::new(OcppVersion::V201),
            Arc::new(EventBus::new()),
        )
    }

    #[tokio::test]
    async fn boot_notification_accepts() {
        let handlers = V201Handlers::new(Arc::new(EventBus::new()));
        let session = test_session();
        let result = handlers.handle_call(&session, "BootNotification", json!({})).await.unwrap();
        assert_eq!(result["status"], "Accepted");
    }

    #[tokio::test]
    async fn notify_report_completes_buffer() {
        let handlers = V201Handlers::new(Arc::new(EventBus::new()));
        let session = test_session();
        session.reset_report_buffer().await;

        handlers
            .handle_call(
                &session,
                "NotifyReport",
                json!({
                    "seqNo": 0,
                    "tbc": false,
                    "reportData": [{
                        "variable": {"name": "HeartbeatInterval"},
                        "component": {"name": "OCPPCommCtrlr"},
                        "variableAttribute": [{"value": "300"}],
                    }],
                }),
            )
            .await
            .unwrap();

        let rows = session.wait_for_report(std::time::Duration::from_millis(50)).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "HeartbeatInterval");
    }

    #[tokio::test]
    async fn transaction_event_started_maps_to_start_transaction_topic() {
        let handlers = V201Handlers::new(Arc::new(EventBus::new()));
        let session = test_session();
        let result = handlers
            .handle_call(&session, "TransactionEvent", json!({"eventType": "Started"}))
            .await
            .unwrap();
        assert_eq!(result["idTokenInfo"]["status"], "Accepted");
    }
}
