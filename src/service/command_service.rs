//! The command façade (§ command dispatch): resolves a charge point's
//! session, picks the version-appropriate strategy, sends the call, and is
//! the one place that publishes `ConfigurationChanged`.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::bus::SharedEventBus;
use crate::commands::v16::V16CommandStrategy;
use crate::commands::v201::V201CommandStrategy;
use crate::commands::{CommandError, CommandStrategy};
use crate::domain::{Event, OcppVersion, TOPIC_CONFIGURATION_CHANGED};
use crate::session::registry::SharedSessionRegistry;
use crate::session::SessionState;

const CONFIGURATION_ACTIONS: &[&str] = &["ChangeConfiguration", "SetVariables"];

pub struct CommandService {
    registry: SharedSessionRegistry,
    bus: SharedEventBus,
    v16: V16CommandStrategy,
    v201: V201CommandStrategy,
}

impl CommandService {
    pub fn new(registry: SharedSessionRegistry, bus: SharedEventBus) -> Self {
        Self {
            registry,
            bus,
            v16: V16CommandStrategy,
            v201: V201CommandStrategy,
        }
    }

    pub async fn send(
        &self,
        charge_point_id: &str,
        action: &str,
        parameters: &Value,
    ) -> Result<Value, CommandError> {
        let session = self
            .registry
            .get(charge_point_id)
            .ok_or(CommandError::NotConnected)?;

        // A session lingering in Closing/Closed after its read loop exited is
        // a zombie: evict it here rather than let the call fail downstream
        // (§4.J step 1).
        if session.state().await != SessionState::Running {
            self.registry.unregister(&session);
            return Err(CommandError::NotConnected);
        }

        let strategy: &dyn CommandStrategy = match session.ocpp_version {
            OcppVersion::V16 => &self.v16,
            OcppVersion::V201 => &self.v201,
        };

        let (wire_action, payload) = strategy.build(action, parameters)?;

        tracing::info!(charge_point_id, action = %wire_action, "dispatching command");

        let result = match session.send_call(&wire_action, payload, None).await {
            Ok(result) => result,
            Err(err) => {
                let command_err: CommandError = err.into();
                if matches!(command_err, CommandError::Disconnected) {
                    self.registry.unregister(&session);
                }
                return Err(command_err);
            }
        };

        if CONFIGURATION_ACTIONS.contains(&action) {
            self.bus
                .publish(Event::new(
                    TOPIC_CONFIGURATION_CHANGED,
                    charge_point_id.to_string(),
                    Some(session.ocpp_version),
                    json!({ "action": action, "parameters": parameters, "result": result }),
                    Utc::now(),
                ))
                .await;
        }

        Ok(result)
    }
}
