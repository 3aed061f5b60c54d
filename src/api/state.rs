use std::sync::Arc;

use crate::bus::SharedEventBus;
use crate::config::Config;
use crate::dashboard::SharedDashboardHub;
use crate::service::{CommandService, ConfigurationAggregator};
use crate::session::registry::SharedSessionRegistry;
use crate::settings::SharedSettingsRepository;

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedSessionRegistry,
    pub bus: SharedEventBus,
    pub command_service: Arc<CommandService>,
    pub configuration_aggregator: Arc<ConfigurationAggregator>,
    pub settings_repository: SharedSettingsRepository,
    pub dashboard_hub: SharedDashboardHub,
    pub config: Arc<Config>,
}
