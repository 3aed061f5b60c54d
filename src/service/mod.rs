//! Application services sitting above sessions and command strategies.

pub mod command_service;
pub mod configuration_aggregator;

pub use command_service::CommandService;
pub use configuration_aggregator::ConfigurationAggregator;
