//! OCPP protocol version
//!
//! The gateway speaks two OCPP dialects on the charge-point-facing side.
//! Everything upstream of the session layer keys off this enum to pick the
//! right handler set and command strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported OCPP protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcppVersion {
    /// OCPP 1.6 (JSON / OCPP-J)
    V16,
    /// OCPP 2.0.1
    V201,
}

impl OcppVersion {
    /// WebSocket subprotocol identifier for this OCPP version.
    pub fn subprotocol(&self) -> &'static str {
        match self {
            Self::V16 => "ocpp1.6",
            Self::V201 => "ocpp2.0.1",
        }
    }

    /// Negotiate a version from the client's `Sec-WebSocket-Protocol` header value.
    ///
    /// `ocpp2.0.1` selects v2.0.1; `ocpp1.6` or anything containing `1.6`
    /// selects v1.6; anything else defaults to v1.6 (with a caller-side
    /// warning — this function just picks the default).
    pub fn negotiate(requested_protocols: &str) -> Self {
        for candidate in requested_protocols.split(',').map(|s| s.trim()) {
            if candidate == "ocpp2.0.1" {
                return Self::V201;
            }
        }
        Self::V16
    }

    /// Human-readable version string, as used in event payloads and settings.
    pub fn version_string(&self) -> &'static str {
        match self {
            Self::V16 => "1.6",
            Self::V201 => "2.0.1",
        }
    }

    pub fn from_version_string(s: &str) -> Self {
        if s.starts_with("2.") {
            Self::V201
        } else {
            Self::V16
        }
    }
}

impl fmt::Display for OcppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiate_v201() {
        assert_eq!(OcppVersion::negotiate("ocpp2.0.1"), OcppVersion::V201);
    }

    #[test]
    fn negotiate_v16_exact() {
        assert_eq!(OcppVersion::negotiate("ocpp1.6"), OcppVersion::V16);
    }

    #[test]
    fn negotiate_unknown_defaults_to_v16() {
        assert_eq!(OcppVersion::negotiate("soap1.2"), OcppVersion::V16);
        assert_eq!(OcppVersion::negotiate(""), OcppVersion::V16);
    }

    #[test]
    fn negotiate_prefers_201_when_both_present() {
        assert_eq!(
            OcppVersion::negotiate("ocpp1.6, ocpp2.0.1"),
            OcppVersion::V201
        );
    }
}
