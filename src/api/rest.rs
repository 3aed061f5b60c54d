use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{ChargePointSettings, OcppVersion};
use crate::error::GatewayError;

use super::AppState;

const DEFAULT_TAG: &str = "DEFAULT_TAG";

#[derive(Deserialize)]
pub struct CommandRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

pub async fn send_command(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<Value>, GatewayError> {
    let result = state
        .command_service
        .send(&charge_point_id, &body.action, &body.parameters)
        .await?;
    Ok(Json(json!({ "result": result })))
}

#[derive(Deserialize, Default)]
pub struct ActiveFilter {
    pub active: Option<bool>,
}

pub async fn get_all_charge_points(
    State(state): State<AppState>,
    Query(filter): Query<ActiveFilter>,
) -> Json<Value> {
    let ids = state.registry.connected_ids();
    let mut connected = Vec::new();
    for id in ids {
        let Some(session) = state.registry.get(&id) else { continue };
        let settings = session.settings.read().await;
        if let Some(want_active) = filter.active {
            if settings.enabled != want_active {
                continue;
            }
        }
        connected.push(json!({
            "id": id,
            "ocpp_version": session.ocpp_version.version_string(),
            "active": settings.enabled,
            "alias": settings.alias,
        }));
    }
    Json(json!({ "connected": connected }))
}

async fn set_enabled(state: &AppState, charge_point_id: &str, enabled: bool) -> Result<(), GatewayError> {
    let session = state.registry.get(charge_point_id).ok_or(GatewayError::NotConnected)?;
    let mut settings = session.settings.write().await;
    settings.enabled = enabled;
    state.settings_repository.upsert(charge_point_id, settings.clone()).await;
    Ok(())
}

pub async fn enable(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    set_enabled(&state, &charge_point_id, true).await?;
    Ok(Json(json!({ "id": charge_point_id, "active": true })))
}

pub async fn disable(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    set_enabled(&state, &charge_point_id, false).await?;
    Ok(Json(json!({ "id": charge_point_id, "active": false })))
}

pub async fn start(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let session = state.registry.get(&charge_point_id).ok_or(GatewayError::NotConnected)?;
    let (action, parameters) = match session.ocpp_version {
        OcppVersion::V16 => (
            "RemoteStartTransaction",
            json!({ "id_tag": DEFAULT_TAG, "connector_id": 1 }),
        ),
        OcppVersion::V201 => (
            "RequestStartTransaction",
            json!({ "id_token": DEFAULT_TAG, "remote_start_id": 1234 }),
        ),
    };
    let result = state.command_service.send(&charge_point_id, action, &parameters).await?;
    Ok(Json(json!({ "result": result })))
}

pub async fn stop(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let session = state.registry.get(&charge_point_id).ok_or(GatewayError::NotConnected)?;
    let action = match session.ocpp_version {
        OcppVersion::V16 => "RemoteStopTransaction",
        OcppVersion::V201 => "RequestStopTransaction",
    };
    let result = state.command_service.send(&charge_point_id, action, &json!({})).await?;
    Ok(Json(json!({ "result": result })))
}

pub async fn set_charging_current(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
    Json(amps): Json<i64>,
) -> Result<Json<Value>, GatewayError> {
    if amps < 1 {
        return Err(GatewayError::BadRequest("charging current must be >= 1".to_string()));
    }

    let session = state.registry.get(&charge_point_id).ok_or(GatewayError::NotConnected)?;
    let (action, parameters) = match session.ocpp_version {
        OcppVersion::V16 => (
            "ChangeConfiguration",
            json!({ "key": "MaxChargingCurrent", "value": amps.to_string() }),
        ),
        OcppVersion::V201 => (
            "SetVariables",
            json!({
                "key": { "component": {"name": "SmartChargingCtrlr"}, "variable_name": "ChargingCurrent" },
                "value": amps.to_string(),
            }),
        ),
    };
    let result = state.command_service.send(&charge_point_id, action, &parameters).await?;
    Ok(Json(json!({ "result": result })))
}

pub async fn get_configuration(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let items = state
        .configuration_aggregator
        .collect(&charge_point_id)
        .await?;
    Ok(Json(json!({ "status": "Accepted", "configuration_key": items })))
}

#[derive(Deserialize)]
pub struct SetAliasRequest {
    pub alias: String,
}

pub async fn set_alias(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
    Json(body): Json<SetAliasRequest>,
) -> Result<Json<Value>, GatewayError> {
    state.registry.remember_alias(&charge_point_id, body.alias.clone());

    if let Some(session) = state.registry.get(&charge_point_id) {
        let mut settings = session.settings.write().await;
        settings.alias = Some(body.alias.clone());
        state.settings_repository.upsert(&charge_point_id, settings.clone()).await;
    } else {
        let all = state.settings_repository.load_all().await;
        let mut settings = all
            .get(&charge_point_id)
            .cloned()
            .unwrap_or_else(|| ChargePointSettings::new(OcppVersion::V16));
        settings.alias = Some(body.alias.clone());
        state.settings_repository.upsert(&charge_point_id, settings).await;
    }

    Ok(Json(json!({ "status": "ok" })))
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(charge_point_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    if let Some(session) = state.registry.get(&charge_point_id) {
        let settings = session.settings.read().await;
        return Ok(Json(json!({
            "id": charge_point_id,
            "ocpp_version": settings.ocpp_version.version_string(),
            "active": settings.enabled,
            "alias": settings.alias,
        })));
    }
    let all = state.settings_repository.load_all().await;
    match all.get(&charge_point_id) {
        Some(settings) => Ok(Json(json!({
            "id": charge_point_id,
            "ocpp_version": settings.ocpp_version.version_string(),
            "active": settings.enabled,
            "alias": settings.alias,
        }))),
        None => Err(GatewayError::NotConnected),
    }
}
