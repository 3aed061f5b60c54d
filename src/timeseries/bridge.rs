use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::bus::EventSubscriber;
use crate::domain::{Event, TOPIC_CONFIGURATION_CHANGED, TOPIC_METER_VALUES};

use super::{SharedTimeSeriesSink, TimeSeriesPoint};

/// Subscribes to the topics that carry numeric, time-series-worthy data and
/// forwards them to the configured sink, mapping each topic to a
/// measurement name of the same shape a dashboard would expect.
pub struct TimeSeriesBridge {
    sink: SharedTimeSeriesSink,
}

impl TimeSeriesBridge {
    pub fn new(sink: SharedTimeSeriesSink) -> Self {
        Self { sink }
    }

    fn to_point(&self, event: &Event) -> Option<TimeSeriesPoint> {
        let measurement = match event.topic.as_str() {
            TOPIC_METER_VALUES => "meter_values",
            TOPIC_CONFIGURATION_CHANGED => "configuration_changed",
            _ => return None,
        };

        let mut tags = HashMap::new();
        tags.insert("charge_point_id".to_string(), event.charge_point_id.clone());
        if let Some(version) = event.ocpp_version {
            tags.insert("ocpp_version".to_string(), version.version_string().to_string());
        }

        let mut fields = HashMap::new();
        if let Value::Object(map) = &event.payload {
            for (k, v) in map {
                fields.insert(k.clone(), v.clone());
            }
        } else {
            fields.insert("payload".to_string(), event.payload.clone());
        }

        Some(TimeSeriesPoint {
            measurement: measurement.to_string(),
            tags,
            fields,
            timestamp: event.timestamp,
        })
    }
}

#[async_trait]
impl EventSubscriber for TimeSeriesBridge {
    async fn handle(&self, event: &Event) -> Result<(), String> {
        match self.to_point(event) {
            Some(point) => self.sink.write_point(point).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::RecordingTimeSeriesSink;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn meter_values_become_a_point() {
        let sink = Arc::new(RecordingTimeSeriesSink::new());
        let bridge = TimeSeriesBridge::new(sink.clone());
        let event = Event::new(TOPIC_METER_VALUES, "CP1", None, json!({"energy": 42}), Utc::now());

        bridge.handle(&event).await.unwrap();

        let recorded = sink.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].measurement, "meter_values");
        assert_eq!(recorded[0].tags.get("charge_point_id").unwrap(), "CP1");
    }

    #[tokio::test]
    async fn unrelated_topic_is_ignored() {
        let sink = Arc::new(RecordingTimeSeriesSink::new());
        let bridge = TimeSeriesBridge::new(sink.clone());
        let event = Event::new("Heartbeat", "CP1", None, json!({}), Utc::now());

        bridge.handle(&event).await.unwrap();

        assert!(sink.recorded().is_empty());
    }
}
