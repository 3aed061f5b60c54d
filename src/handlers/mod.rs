//! Inbound CALL handling: turning a charge point's action into an
//! acknowledgement plus a bus event, per OCPP dialect.

pub mod v16;
pub mod v201;

use async_trait::async_trait;
use serde_json::Value;

use crate::session::Session;

#[derive(Debug, Clone)]
pub enum HandlerError {
    NotImplemented,
    FormationViolation(String),
}

#[async_trait]
pub trait HandlerSet: Send + Sync {
    async fn handle_call(&self, session: &Session, action: &str, payload: Value) -> Result<Value, HandlerError>;
}
