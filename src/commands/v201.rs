//! OCPP 2.0.1 command strategy.

use serde_json::{json, Value};

use super::{CommandError, CommandStrategy};

pub struct V201CommandStrategy;

impl CommandStrategy for V201CommandStrategy {
    fn build(&self, action: &str, parameters: &Value) -> Result<(String, Value), CommandError> {
        match action {
            "RequestStartTransaction" => build_request_start(parameters),
            "RequestStopTransaction" => build_request_stop(parameters),
            "GetBaseReport" => build_get_base_report(parameters),
            "GetVariables" => build_get_variables(parameters),
            "SetVariables" => build_set_variables(parameters),
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

fn build_request_start(parameters: &Value) -> Result<(String, Value), CommandError> {
    let id_token = require_str(parameters, "id_token").or_else(|_| require_str(parameters, "idToken"))?;
    let remote_start_id = parameters
        .get("remote_start_id")
        .or_else(|| parameters.get("remoteStartId"))
        .and_then(Value::as_i64)
        .unwrap_or(1234);
    let evse_id = parameters.get("evse_id").or_else(|| parameters.get("evseId")).and_then(Value::as_i64);

    let payload = json!({
        "remoteStartId": remote_start_id,
        "idToken": { "idToken": id_token, "type": "Central" },
        "evseId": evse_id,
    });
    Ok(("RequestStartTransaction".to_string(), payload))
}

fn build_request_stop(parameters: &Value) -> Result<(String, Value), CommandError> {
    let transaction_id =
        require_str(parameters, "transaction_id").or_else(|_| require_str(parameters, "transactionId"))?;
    Ok((
        "RequestStopTransaction".to_string(),
        json!({ "transactionId": transaction_id }),
    ))
}

fn build_get_base_report(parameters: &Value) -> Result<(String, Value), CommandError> {
    let request_id = parameters
        .get("request_id")
        .or_else(|| parameters.get("requestId"))
        .and_then(Value::as_i64)
        .unwrap_or(55);
    let report_base = parameters
        .get("report_base")
        .or_else(|| parameters.get("reportBase"))
        .and_then(Value::as_str)
        .unwrap_or("FullInventory");

    Ok((
        "GetBaseReport".to_string(),
        json!({ "requestId": request_id, "reportBase": report_base }),
    ))
}

fn build_get_variables(parameters: &Value) -> Result<(String, Value), CommandError> {
    let variables = parameters
        .get("variables")
        .and_then(Value::as_array)
        .ok_or_else(|| CommandError::BadRequest("missing required field `variables`".into()))?;

    if variables.is_empty() {
        return Err(CommandError::BadRequest("`variables` must be non-empty".into()));
    }

    let get_variable_data: Vec<Value> = variables
        .iter()
        .map(|v| {
            json!({
                "component": v.get("component").cloned().unwrap_or(json!({"name": ""})),
                "variable": v.get("variable").cloned().unwrap_or(json!({"name": ""})),
            })
        })
        .collect();

    Ok((
        "GetVariables".to_string(),
        json!({ "getVariableData": get_variable_data }),
    ))
}

/// `SetVariables` accepts two input shapes from the operator: the spec
/// shape `set_variable_data: [...]`, passed through as-is, and the
/// convenience shape `{key: {component, variable_name}, value}`, which is
/// expanded to the spec shape with `attributeType=Actual`.
fn build_set_variables(parameters: &Value) -> Result<(String, Value), CommandError> {
    if let Some(items) = parameters.get("set_variable_data").or_else(|| parameters.get("setVariableData")) {
        let items = items
            .as_array()
            .ok_or_else(|| CommandError::BadRequest("`set_variable_data` must be an array".into()))?;
        if items.is_empty() {
            return Err(CommandError::BadRequest("`set_variable_data` must be non-empty".into()));
        }
        return Ok(("SetVariables".to_string(), json!({ "setVariableData": items })));
    }

    let key = parameters
        .get("key")
        .cloned()
        .ok_or_else(|| CommandError::BadRequest("missing required field `key`".into()))?;
    let component = key
        .get("component")
        .cloned()
        .ok_or_else(|| CommandError::BadRequest("`key.component` is required".into()))?;
    let variable_name = key
        .get("variable_name")
        .or_else(|| key.get("variableName"))
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::BadRequest("`key.variable_name` is required".into()))?;
    let value = require_str(parameters, "value")?;

    Ok((
        "SetVariables".to_string(),
        json!({
            "setVariableData": [{
                "component": component,
                "variable": { "name": variable_name },
                "attributeType": "Actual",
                "attributeValue": value,
            }],
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_variables_requires_non_empty_list() {
        let strategy = V201CommandStrategy;
        let result = strategy.build("GetVariables", &json!({"variables": []}));
        assert!(matches!(result, Err(CommandError::BadRequest(_))));
    }

    #[test]
    fn set_variables_accepts_convenience_shape() {
        let strategy = V201CommandStrategy;
        let (_, payload) = strategy
            .build(
                "SetVariables",
                &json!({
                    "key": {"component": {"name": "OCPPCommCtrlr"}, "variable_name": "HeartbeatInterval"},
                    "value": "300",
                }),
            )
            .unwrap();
        let data = payload["setVariableData"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["attributeValue"], "300");
        assert_eq!(data[0]["attributeType"], "Actual");
    }

    #[test]
    fn set_variables_accepts_spec_shape() {
        let strategy = V201CommandStrategy;
        let (_, payload) = strategy
            .build(
                "SetVariables",
                &json!({
                    "set_variable_data": [
                        {"component": {"name": "A"}, "variable": {"name": "B"}, "attributeValue": "1"},
                    ],
                }),
            )
            .unwrap();
        assert_eq!(payload["setVariableData"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn request_start_defaults_remote_start_id() {
        let strategy = V201CommandStrategy;
        let (_, payload) = strategy.build("RequestStartTransaction", &json!({"id_token": "TAG1"})).unwrap();
        assert_eq!(payload["remoteStartId"], 1234);
    }

    #[test]
    fn get_base_report_defaults_request_id_55() {
        let strategy = V201CommandStrategy;
        let (_, payload) = strategy.build("GetBaseReport", &json!({})).unwrap();
        assert_eq!(payload["requestId"], 55);
        assert_eq!(payload["reportBase"], "FullInventory");
    }

    #[test]
    fn unknown_action_is_bad_request() {
        let strategy = V201CommandStrategy;
        let result = strategy.build("Reset", &json!({}));
        assert!(matches!(result, Err(CommandError::BadRequest(_))));
    }
}
