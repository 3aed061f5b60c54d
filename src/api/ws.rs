use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;

use crate::domain::{ChargePointSettings, Event, OcppVersion, TOPIC_CHARGE_POINT_CONNECTED};
use crate::handlers::v16::V16Handlers;
use crate::handlers::v201::V201Handlers;
use crate::handlers::HandlerSet;
use crate::session::registry::RegisterResult;
use crate::session::Session;
use crate::transport::WsChannelAdapter;

use super::AppState;

fn requested_protocols(headers: &HeaderMap) -> String {
    headers
        .get("sec-websocket-protocol")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn ocpp_upgrade(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let protocols = requested_protocols(&headers);
    let version = OcppVersion::negotiate(&protocols);
    let subprotocol = version.subprotocol();

    ws.protocols([subprotocol]).on_upgrade(move |socket| async move {
        let channel: Arc<WsChannelAdapter> = Arc::new(WsChannelAdapter::new(socket));

        let existing_alias = state.registry.alias_for(&identity);
        let persisted = state.settings_repository.load_all().await;
        let mut settings = persisted
            .get(&identity)
            .cloned()
            .unwrap_or_else(|| ChargePointSettings::new(version));
        settings.ocpp_version = version;
        if let Some(alias) = existing_alias {
            settings.alias = Some(alias);
        }

        let session = Session::new(identity.clone(), version, channel, settings, state.bus.clone());
        if let RegisterResult::Evicted(old) = state.registry.register(session.clone()) {
            tracing::info!(charge_point_id = %identity, "evicting stale session on reconnect");
            old.request_close().await;
        }

        state
            .bus
            .publish(Event::new(
                TOPIC_CHARGE_POINT_CONNECTED,
                identity.clone(),
                Some(version),
                serde_json::json!({}),
                Utc::now(),
            ))
            .await;

        let handlers: Arc<dyn HandlerSet> = match version {
            OcppVersion::V16 => Arc::new(V16Handlers::new(state.bus.clone())),
            OcppVersion::V201 => Arc::new(V201Handlers::new(state.bus.clone())),
        };

        session.run(handlers).await;

        let final_alias = session.settings.read().await.alias.clone();
        if let Some(alias) = final_alias {
            state.registry.remember_alias(&identity, alias);
        }
        state.registry.unregister(&session);
    })
}

pub async fn frontend_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        let channel: Arc<WsChannelAdapter> = Arc::new(WsChannelAdapter::new(socket));
        let id = state.dashboard_hub.register(channel.clone());

        loop {
            match channel.recv().await {
                Some(crate::transport::IncomingMessage::Text(_)) => continue,
                Some(crate::transport::IncomingMessage::Closed) | None => break,
            }
        }

        state.dashboard_hub.unregister(id);
    })
}
