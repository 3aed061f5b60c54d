use std::sync::Arc;

use csms_gateway::api::{build_router, AppState};
use csms_gateway::bus::EventBus;
use csms_gateway::config::Config;
use csms_gateway::dashboard::DashboardHub;
use csms_gateway::service::{CommandService, ConfigurationAggregator};
use csms_gateway::session::registry::SessionRegistry;
use csms_gateway::settings::InMemorySettingsRepository;
use csms_gateway::timeseries::{NullTimeSeriesSink, TimeSeriesBridge};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Arc::new(Config::from_env());
    let registry = Arc::new(SessionRegistry::new());
    let bus = Arc::new(EventBus::new());
    let settings_repository = Arc::new(InMemorySettingsRepository::new());
    let dashboard_hub = Arc::new(DashboardHub::new());

    let timeseries_bridge = Arc::new(TimeSeriesBridge::new(Arc::new(NullTimeSeriesSink)));
    for topic in csms_gateway::domain::ALL_TOPICS {
        bus.subscribe(*topic, timeseries_bridge.clone()).await;
        bus.subscribe(*topic, dashboard_hub.clone()).await;
    }

    let command_service = Arc::new(CommandService::new(registry.clone(), bus.clone()));
    let configuration_aggregator = Arc::new(ConfigurationAggregator::new(registry.clone()));

    let state = AppState {
        registry,
        bus,
        command_service,
        configuration_aggregator,
        settings_repository,
        dashboard_hub,
        config: config.clone(),
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(%addr, "starting ocpp gateway");

    let listener = tokio::net::TcpListener::bind(&addr).await.expect("failed to bind listener");
    axum::serve(listener, build_router(state)).await.expect("server error");
}
