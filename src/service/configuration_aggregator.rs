//! Configuration report assembly: `GetBaseReport` → await `NotifyReport*` →
//! batched `GetVariables` fill for anything still missing a value →
//! batched writability determination pass.

use std::time::Duration;

use serde_json::{json, Value};

use crate::commands::v201::V201CommandStrategy;
use crate::commands::{CommandError, CommandStrategy};
use crate::domain::{OcppVersion, ReportItem};
use crate::session::registry::SharedSessionRegistry;

const REPORT_DEADLINE: Duration = Duration::from_secs(10);
const GET_VARIABLES_BATCH_SIZE: usize = 24;

pub struct ConfigurationAggregator {
    registry: SharedSessionRegistry,
    strategy: V201CommandStrategy,
}

impl ConfigurationAggregator {
    pub fn new(registry: SharedSessionRegistry) -> Self {
        Self {
            registry,
            strategy: V201CommandStrategy,
        }
    }

    /// Run the full report cycle for `charge_point_id` and return the
    /// assembled, sorted configuration.
    pub async fn collect(&self, charge_point_id: &str) -> Result<Vec<ReportItem>, CommandError> {
        let session = self.registry.get(charge_point_id).ok_or(CommandError::NotConnected)?;
        if session.ocpp_version != OcppVersion::V201 {
            return Err(CommandError::UnsupportedVersion);
        }

        session.reset_report_buffer().await;

        let (action, payload) = self.strategy.build("GetBaseReport", &json!({}))?;
        session.send_call(&action, payload, None).await?;

        let mut items = session.wait_for_report(REPORT_DEADLINE).await;

        self.fill_missing_values(&session, &mut items).await?;
        self.determine_writability(&session, &mut items).await?;

        for item in items.iter_mut() {
            if item.readonly.is_none() {
                item.readonly = Some(true);
            }
        }

        items.sort_by_key(|i| i.key.to_lowercase());
        Ok(items)
    }

    async fn fill_missing_values(
        &self,
        session: &crate::session::Session,
        items: &mut [ReportItem],
    ) -> Result<(), CommandError> {
        let missing: Vec<(String, Value)> = items
            .iter()
            .filter(|i| i.value.is_none())
            .map(|i| (i.key.clone(), i.component.clone()))
            .collect();

        for batch in missing.chunks(GET_VARIABLES_BATCH_SIZE) {
            let variables: Vec<Value> = batch
                .iter()
                .map(|(key, component)| json!({ "component": component, "variable": {"name": key} }))
                .collect();
            let (action, payload) = self.strategy.build("GetVariables", &json!({ "variables": variables }))?;
            let result = session.send_call(&action, payload, None).await?;

            apply_get_variable_results(items, &result);
        }

        Ok(())
    }

    async fn determine_writability(
        &self,
        session: &crate::session::Session,
        items: &mut [ReportItem],
    ) -> Result<(), CommandError> {
        let pending: Vec<(String, Value)> = items
            .iter()
            .filter(|i| i.readonly.is_none())
            .map(|i| (i.key.clone(), i.component.clone()))
            .collect();

        for batch in pending.chunks(GET_VARIABLES_BATCH_SIZE) {
            let variables: Vec<Value> = batch
                .iter()
                .map(|(key, component)| {
                    json!({
                        "component": component,
                        "variable": {"name": key},
                        "attributeType": "Target",
                    })
                })
                .collect();
            let (action, payload) = self.strategy.build("GetVariables", &json!({ "variables": variables }))?;
            let result = session.send_call(&action, payload, None).await?;

            apply_writability_results(items, &result);
        }

        Ok(())
    }
}

fn apply_get_variable_results(items: &mut [ReportItem], result: &Value) {
    let Some(rows) = result.get("getVariableResult").and_then(Value::as_array) else { return };
    for row in rows {
        let Some(key) = row
            .get("variable")
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let status = row.get("attributeStatus").and_then(Value::as_str).unwrap_or("");
        let Some(item) = items.iter_mut().find(|i| i.key == key) else { continue };

        if status == "Accepted" {
            if let Some(value) = row.get("attributeValue").and_then(Value::as_str) {
                item.value = Some(value.to_string());
            }
        } else if status == "Rejected" || status == "NotSupported" {
            item.readonly = Some(true);
        }
    }
}

fn apply_writability_results(items: &mut [ReportItem], result: &Value) {
    let Some(rows) = result.get("getVariableResult").and_then(Value::as_array) else { return };
    for row in rows {
        let Some(key) = row
            .get("variable")
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let status = row.get("attributeStatus").and_then(Value::as_str).unwrap_or("");
        let writable = status == "Accepted";
        if let Some(item) = items.iter_mut().find(|i| i.key == key) {
            item.readonly = Some(!writable);
        }
    }
}
