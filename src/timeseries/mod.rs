//! Time-series sink boundary and the bridge that feeds it from the bus.
//!
//! A real InfluxDB client is out of scope for this gateway; the trait is
//! the contract a metering backend implements, with an in-memory recorder
//! for tests and a logging no-op for when nothing is configured.

mod bridge;

pub use bridge::TimeSeriesBridge;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct TimeSeriesPoint {
    pub measurement: String,
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait TimeSeriesSink: Send + Sync {
    async fn write_point(&self, point: TimeSeriesPoint) -> Result<(), String>;
}

pub type SharedTimeSeriesSink = Arc<dyn TimeSeriesSink>;

pub struct NullTimeSeriesSink;

#[async_trait]
impl TimeSeriesSink for NullTimeSeriesSink {
    async fn write_point(&self, point: TimeSeriesPoint) -> Result<(), String> {
        tracing::debug!(measurement = %point.measurement, "dropping time-series point, no sink configured");
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTimeSeriesSink {
    points: Mutex<Vec<TimeSeriesPoint>>,
}

impl RecordingTimeSeriesSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<TimeSeriesPoint> {
        self.points.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimeSeriesSink for RecordingTimeSeriesSink {
    async fn write_point(&self, point: TimeSeriesPoint) -> Result<(), String> {
        self.points.lock().unwrap().push(point);
        Ok(())
    }
}
