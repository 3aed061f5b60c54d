pub mod api;
pub mod bus;
pub mod codec;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod service;
pub mod session;
pub mod settings;
pub mod timeseries;
pub mod transport;
