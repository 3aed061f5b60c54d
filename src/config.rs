//! Environment-variable configuration. No file format: the gateway is
//! configured the way a container expects to be configured.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub call_timeout: Duration,
    pub report_deadline: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("OCPP_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("OCPP_GATEWAY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            call_timeout: Duration::from_secs(
                std::env::var("OCPP_CALL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            report_deadline: Duration::from_millis(
                std::env::var("OCPP_REPORT_DEADLINE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10_000),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        // SAFETY: single-threaded test, no other test touches these vars.
        std::env::remove_var("OCPP_GATEWAY_HOST");
        std::env::remove_var("OCPP_GATEWAY_PORT");
        std::env::remove_var("OCPP_CALL_TIMEOUT_SECS");
        std::env::remove_var("OCPP_REPORT_DEADLINE_MS");

        let config = Config::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.call_timeout, Duration::from_secs(30));
        assert_eq!(config.report_deadline, Duration::from_millis(10_000));
    }
}
