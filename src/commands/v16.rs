//! OCPP 1.6 command strategy.
//!
//! Call objects are built from whatever JSON the operator supplied: this
//! layer is deliberately permissive about optional fields, matching the
//! exact validation rules spec'd for each action, rather than relying on
//! `rust_ocpp`'s `Deserialize` impls to reject malformed input up front.

use rust_ocpp::v1_6::messages::get_configuration::GetConfigurationRequest;
use serde_json::{json, Value};

use super::{CommandError, CommandStrategy};

pub struct V16CommandStrategy;

impl CommandStrategy for V16CommandStrategy {
    fn build(&self, action: &str, parameters: &Value) -> Result<(String, Value), CommandError> {
        match action {
            "RemoteStartTransaction" => build_remote_start(parameters),
            "RemoteStopTransaction" => build_remote_stop(parameters),
            "ChangeConfiguration" => build_change_configuration(parameters),
            "GetConfiguration" => build_get_configuration(parameters),
            "SecurityBootNotification" => build_security_boot_notification(parameters),
            other => Err(CommandError::BadRequest(format!("unknown action `{other}`"))),
        }
    }
}

fn require_str(parameters: &Value, field: &str) -> Result<String, CommandError> {
    parameters
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CommandError::BadRequest(format!("missing required field `{field}`")))
}

fn build_remote_start(parameters: &Value) -> Result<(String, Value), CommandError> {
    let id_tag = require_str(parameters, "id_tag").or_else(|_| require_str(parameters, "idTag"))?;
    let connector_id = parameters
        .get("connector_id")
        .or_else(|| parameters.get("connectorId"))
        .and_then(Value::as_i64);

    let payload = json!({
        "idTag": id_tag,
        "connectorId": connector_id,
    });
    Ok(("RemoteStartTransaction".to_string(), payload))
}

fn build_remote_stop(parameters: &Value) -> Result<(String, Value), CommandError> {
    let transaction_id = parameters
        .get("transaction_id")
        .or_else(|| parameters.get("transactionId"))
        .and_then(Value::as_i64)
        .ok_or_else(|| CommandError::BadRequest("missing required field `transaction_id`".into()))?;

    Ok((
        "RemoteStopTransaction".to_string(),
        json!({ "transactionId": transaction_id }),
    ))
}

fn build_change_configuration(parameters: &Value) -> Result<(String, Value), CommandError> {
    let key = require_str(parameters, "key")?;
    let value = require_str(parameters, "value")?;
    Ok(("ChangeConfiguration".to_string(), json!({ "key": key, "value": value })))
}

fn build_get_configuration(parameters: &Value) -> Result<(String, Value), CommandError> {
    let keys: Option<Vec<String>> = parameters
        .get("keys")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect());

    let request = GetConfigurationRequest { key: keys };
    let payload =
        serde_json::to_value(&request).map_err(|e| CommandError::BadRequest(e.to_string()))?;
    Ok(("GetConfiguration".to_string(), payload))
}

fn build_security_boot_notification(parameters: &Value) -> Result<(String, Value), CommandError> {
    let charge_point_vendor = require_str(parameters, "charge_point_vendor")
        .or_else(|_| require_str(parameters, "chargePointVendor"))?;
    let charge_point_model = require_str(parameters, "charge_point_model")
        .or_else(|_| require_str(parameters, "chargePointModel"))?;

    Ok((
        "SecurityBootNotification".to_string(),
        json!({
            "chargePointVendor": charge_point_vendor,
            "chargePointModel": charge_point_model,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_start_accepts_snake_or_camel_case() {
        let strategy = V16CommandStrategy;
        let (action, payload) = strategy
            .build("RemoteStartTransaction", &json!({"id_tag": "TAG1", "connector_id": 1}))
            .unwrap();
        assert_eq!(action, "RemoteStartTransaction");
        assert_eq!(payload["idTag"], "TAG1");
        assert_eq!(payload["connectorId"], 1);
    }

    #[test]
    fn remote_stop_requires_transaction_id() {
        let strategy = V16CommandStrategy;
        let result = strategy.build("RemoteStopTransaction", &json!({}));
        assert!(matches!(result, Err(CommandError::BadRequest(_))));
    }

    #[test]
    fn get_configuration_with_no_keys_requests_all() {
        let strategy = V16CommandStrategy;
        let (_, payload) = strategy.build("GetConfiguration", &json!({})).unwrap();
        assert!(payload.get("key").map(Value::is_null).unwrap_or(true));
    }

    #[test]
    fn unknown_action_is_bad_request() {
        let strategy = V16CommandStrategy;
        let result = strategy.build("Reset", &json!({}));
        assert!(matches!(result, Err(CommandError::BadRequest(_))));
    }
}
