//! Bus event envelope and the closed set of topics
//!
//! Every handler, command outcome, and connection transition that the rest
//! of the system cares about is published as one of these. The topic list
//! is closed and small on purpose (§4.E): it's the contract dashboards and
//! the time-series sink are written against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OcppVersion;

pub const TOPIC_BOOT_NOTIFICATION: &str = "BootNotification";
pub const TOPIC_HEARTBEAT: &str = "Heartbeat";
pub const TOPIC_AUTHORIZE: &str = "Authorize";
pub const TOPIC_START_TRANSACTION: &str = "StartTransaction";
pub const TOPIC_STOP_TRANSACTION: &str = "StopTransaction";
pub const TOPIC_STATUS_NOTIFICATION: &str = "StatusNotification";
pub const TOPIC_METER_VALUES: &str = "MeterValues";
pub const TOPIC_NOTIFY_EVENT: &str = "NotifyEvent";
pub const TOPIC_NOTIFY_REPORT: &str = "NotifyReport";
pub const TOPIC_CHARGE_POINT_CONNECTED: &str = "ChargePointConnected";
pub const TOPIC_CHARGE_POINT_DISCONNECTED: &str = "ChargePointDisconnected";
pub const TOPIC_CONFIGURATION_CHANGED: &str = "ConfigurationChanged";

pub const ALL_TOPICS: &[&str] = &[
    TOPIC_BOOT_NOTIFICATION,
    TOPIC_HEARTBEAT,
    TOPIC_AUTHORIZE,
    TOPIC_START_TRANSACTION,
    TOPIC_STOP_TRANSACTION,
    TOPIC_STATUS_NOTIFICATION,
    TOPIC_METER_VALUES,
    TOPIC_NOTIFY_EVENT,
    TOPIC_NOTIFY_REPORT,
    TOPIC_CHARGE_POINT_CONNECTED,
    TOPIC_CHARGE_POINT_DISCONNECTED,
    TOPIC_CONFIGURATION_CHANGED,
];

/// A published occurrence, fanned out to every subscriber of `topic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub topic: String,
    pub charge_point_id: String,
    pub ocpp_version: Option<OcppVersion>,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        topic: impl Into<String>,
        charge_point_id: impl Into<String>,
        ocpp_version: Option<OcppVersion>,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            topic: topic.into(),
            charge_point_id: charge_point_id.into(),
            ocpp_version,
            payload,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_topics_is_exhaustive_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for topic in ALL_TOPICS {
            assert!(seen.insert(*topic), "duplicate topic: {topic}");
        }
        assert_eq!(ALL_TOPICS.len(), 12);
    }
}
