//! Core domain types shared by every layer of the gateway.

mod event;
mod ocpp_version;
mod report;
mod settings;

pub use event::{Event, ALL_TOPICS, TOPIC_AUTHORIZE, TOPIC_BOOT_NOTIFICATION,
    TOPIC_CHARGE_POINT_CONNECTED, TOPIC_CHARGE_POINT_DISCONNECTED, TOPIC_CONFIGURATION_CHANGED,
    TOPIC_HEARTBEAT, TOPIC_METER_VALUES, TOPIC_NOTIFY_EVENT, TOPIC_NOTIFY_REPORT,
    TOPIC_START_TRANSACTION, TOPIC_STATUS_NOTIFICATION, TOPIC_STOP_TRANSACTION};
pub use ocpp_version::OcppVersion;
pub use report::{NotifyReportBuffer, ReportItem};
pub use settings::ChargePointSettings;
