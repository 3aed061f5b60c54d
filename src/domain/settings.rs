//! Per-charge-point settings
//!
//! `ChargePointSettings` is the small piece of state that survives a single
//! session's lifetime: whether operators have enabled the station, what
//! alias they've given it, and which OCPP dialect it last negotiated.

use serde::{Deserialize, Serialize};

use super::OcppVersion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargePointSettings {
    pub alias: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    pub ocpp_version: OcppVersion,
}

impl ChargePointSettings {
    pub fn new(ocpp_version: OcppVersion) -> Self {
        Self {
            alias: None,
            enabled: false,
            ocpp_version,
        }
    }
}
